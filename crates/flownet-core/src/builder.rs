//! BuilderGraph: the mutable construction phase of a data-flow network.
//!
//! Nodes and sockets are allocated in per-kind arenas owned by the graph and
//! are never removed. Ids are handed out densely in creation order: node ids
//! count both operation and dummy nodes, socket ids count both inputs and
//! outputs. Internally, entities refer to each other through arena
//! [`Slot`]s; callers only ever see graph-scoped handles.
//!
//! A link is stored twice, as the origin of the input socket and as an entry
//! in the output socket's target list. [`BuilderGraph::add_link`] is the only
//! way to create one, so both sides always agree.
//!
//! Once every input is linked, [`BuilderGraph::finalize`] consumes the builder
//! and produces an immutable [`Network`](crate::network::Network).

use std::sync::Arc;

use smallvec::SmallVec;

use crate::analysis;
use crate::arena::{Arena, Slot};
use crate::descriptor::OperationDescriptor;
use crate::dot::{DotGraph, DotLink, DotNode};
use crate::error::NetworkError;
use crate::id::{GraphId, InputRef, NodeId, NodeRef, OutputRef, SocketId};
use crate::node::{DummyNode, NodeKind, OperationNode};
use crate::types::{DataType, SocketDirection};

#[derive(Debug)]
pub(crate) struct BuilderNode {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) inputs: SmallVec<[Slot<BuilderSocket>; 4]>,
    pub(crate) outputs: SmallVec<[Slot<BuilderSocket>; 4]>,
}

#[derive(Debug)]
pub(crate) struct BuilderSocket {
    pub(crate) id: SocketId,
    /// Position among the owning node's sockets of the same direction.
    pub(crate) index: u32,
    pub(crate) data_type: DataType,
    pub(crate) node: Slot<BuilderNode>,
    pub(crate) link: BuilderLink,
}

#[derive(Debug)]
pub(crate) enum BuilderLink {
    Input {
        origin: Option<Slot<BuilderSocket>>,
    },
    Output {
        targets: SmallVec<[Slot<BuilderSocket>; 4]>,
    },
}

impl BuilderSocket {
    pub(crate) fn direction(&self) -> SocketDirection {
        match self.link {
            BuilderLink::Input { .. } => SocketDirection::Input,
            BuilderLink::Output { .. } => SocketDirection::Output,
        }
    }

    pub(crate) fn origin(&self) -> Option<Slot<BuilderSocket>> {
        match self.link {
            BuilderLink::Input { origin } => origin,
            BuilderLink::Output { .. } => None,
        }
    }

    pub(crate) fn targets(&self) -> &[Slot<BuilderSocket>] {
        match &self.link {
            BuilderLink::Output { targets } => targets.as_slice(),
            BuilderLink::Input { .. } => &[],
        }
    }
}

/// The mutable data-flow graph.
///
/// All mutation goes through `&mut self`; the graph is meant to be built by
/// one writer. Handles returned by the `add_*` methods stay valid for the
/// graph's lifetime and for the [`Network`](crate::network::Network) it is
/// finalized into.
#[derive(Debug)]
pub struct BuilderGraph {
    pub(crate) graph: GraphId,
    // Teardown follows field order: nodes, then sockets.
    pub(crate) nodes: Arena<BuilderNode>,
    pub(crate) sockets: Arena<BuilderSocket>,
    pub(crate) node_by_id: Vec<Slot<BuilderNode>>,
    pub(crate) socket_by_id: Vec<Slot<BuilderSocket>>,
    pub(crate) operation_nodes: Vec<Slot<BuilderNode>>,
    pub(crate) dummy_nodes: Vec<Slot<BuilderNode>>,
    pub(crate) input_sockets: Vec<Slot<BuilderSocket>>,
    pub(crate) output_sockets: Vec<Slot<BuilderSocket>>,
    pub(crate) link_count: usize,
}

impl BuilderGraph {
    /// Creates an empty graph with a process-unique [`GraphId`].
    pub fn new() -> Self {
        BuilderGraph {
            graph: GraphId::fresh(),
            nodes: Arena::new(),
            sockets: Arena::new(),
            node_by_id: Vec::new(),
            socket_by_id: Vec::new(),
            operation_nodes: Vec::new(),
            dummy_nodes: Vec::new(),
            input_sockets: Vec::new(),
            output_sockets: Vec::new(),
            link_count: 0,
        }
    }

    pub fn graph_id(&self) -> GraphId {
        self.graph
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Adds a node wrapping `descriptor`.
    ///
    /// `input_param_indices[i]` names the parameter behind input socket `i`,
    /// `output_param_indices[i]` the one behind output socket `i`. Every
    /// input-or-mutable parameter must appear in the input list and every
    /// output-or-mutable parameter in the output list, each at most once.
    /// Mutable parameters therefore appear in both. On error nothing is
    /// allocated.
    pub fn add_operation(
        &mut self,
        descriptor: Arc<dyn OperationDescriptor>,
        input_param_indices: &[usize],
        output_param_indices: &[usize],
    ) -> Result<NodeRef, NetworkError> {
        check_param_mapping(
            descriptor.as_ref(),
            input_param_indices,
            output_param_indices,
        )?;

        let input_types: Vec<DataType> = input_param_indices
            .iter()
            .map(|&param| descriptor.param_type(param).data_type)
            .collect();
        let output_types: Vec<DataType> = output_param_indices
            .iter()
            .map(|&param| descriptor.param_type(param).data_type)
            .collect();

        let kind = NodeKind::Operation(OperationNode {
            descriptor,
            input_param_indices: input_param_indices.to_vec(),
            output_param_indices: output_param_indices.to_vec(),
        });
        Ok(self.insert_node(kind, &input_types, &output_types))
    }

    /// Adds an interface stub with the given socket types.
    pub fn add_dummy(&mut self, input_types: &[DataType], output_types: &[DataType]) -> NodeRef {
        let dummy = DummyNode::unnamed(input_types, output_types);
        self.insert_node(NodeKind::Dummy(dummy), input_types, output_types)
    }

    /// Adds an interface stub with a display name and named sockets.
    pub fn add_dummy_named(
        &mut self,
        name: impl Into<String>,
        inputs: &[(&str, DataType)],
        outputs: &[(&str, DataType)],
    ) -> NodeRef {
        let dummy = DummyNode {
            name: name.into(),
            input_names: inputs.iter().map(|(name, _)| (*name).to_string()).collect(),
            output_names: outputs.iter().map(|(name, _)| (*name).to_string()).collect(),
        };
        let input_types: Vec<DataType> = inputs.iter().map(|(_, ty)| *ty).collect();
        let output_types: Vec<DataType> = outputs.iter().map(|(_, ty)| *ty).collect();
        self.insert_node(NodeKind::Dummy(dummy), &input_types, &output_types)
    }

    /// Links `from` to `to`.
    ///
    /// Both sockets must belong to this graph and `to` must not have an
    /// origin yet. Outputs may feed any number of inputs. No cycle or
    /// self-loop check is done here; see [`BuilderGraph::is_acyclic`].
    pub fn add_link(&mut self, from: OutputRef, to: InputRef) -> Result<(), NetworkError> {
        self.check_graph(from.graph())?;
        self.check_graph(to.graph())?;
        let from_slot = self.socket_slot(from.id())?;
        let to_slot = self.socket_slot(to.id())?;

        match self.sockets[to_slot].link {
            BuilderLink::Input { origin: None } => {}
            BuilderLink::Input {
                origin: Some(existing),
            } => {
                return Err(NetworkError::InputAlreadyLinked {
                    input: to.id(),
                    origin: self.sockets[existing].id,
                });
            }
            BuilderLink::Output { .. } => {
                return Err(NetworkError::GraphInconsistency {
                    reason: format!("socket {} is not an input", to.id()),
                });
            }
        }

        match &mut self.sockets[from_slot].link {
            BuilderLink::Output { targets } => targets.push(to_slot),
            BuilderLink::Input { .. } => {
                return Err(NetworkError::GraphInconsistency {
                    reason: format!("socket {} is not an output", from.id()),
                });
            }
        }
        self.sockets[to_slot].link = BuilderLink::Input {
            origin: Some(from_slot),
        };
        self.link_count += 1;

        tracing::trace!(from = %from.id(), to = %to.id(), "linked sockets");
        Ok(())
    }

    fn insert_node(
        &mut self,
        kind: NodeKind,
        input_types: &[DataType],
        output_types: &[DataType],
    ) -> NodeRef {
        let id = NodeId(self.node_by_id.len() as u32);
        let is_dummy = kind.is_dummy();
        let node = self.nodes.alloc(BuilderNode {
            id,
            kind,
            inputs: SmallVec::new(),
            outputs: SmallVec::new(),
        });

        for (index, &data_type) in input_types.iter().enumerate() {
            let socket = self.alloc_socket(node, index, data_type, BuilderLink::Input { origin: None });
            self.nodes[node].inputs.push(socket);
            self.input_sockets.push(socket);
        }
        for (index, &data_type) in output_types.iter().enumerate() {
            let link = BuilderLink::Output {
                targets: SmallVec::new(),
            };
            let socket = self.alloc_socket(node, index, data_type, link);
            self.nodes[node].outputs.push(socket);
            self.output_sockets.push(socket);
        }

        if is_dummy {
            self.dummy_nodes.push(node);
        } else {
            self.operation_nodes.push(node);
        }
        self.node_by_id.push(node);
        NodeRef::new(self.graph, id)
    }

    fn alloc_socket(
        &mut self,
        node: Slot<BuilderNode>,
        index: usize,
        data_type: DataType,
        link: BuilderLink,
    ) -> Slot<BuilderSocket> {
        let id = SocketId(self.socket_by_id.len() as u32);
        let slot = self.sockets.alloc(BuilderSocket {
            id,
            index: index as u32,
            data_type,
            node,
            link,
        });
        self.socket_by_id.push(slot);
        slot
    }

    // -----------------------------------------------------------------------
    // Handle resolution
    // -----------------------------------------------------------------------

    fn check_graph(&self, found: GraphId) -> Result<(), NetworkError> {
        if found == self.graph {
            Ok(())
        } else {
            Err(NetworkError::ForeignHandle {
                expected: self.graph,
                found,
            })
        }
    }

    fn socket_slot(&self, id: SocketId) -> Result<Slot<BuilderSocket>, NetworkError> {
        self.socket_by_id
            .get(id.index())
            .copied()
            .ok_or_else(|| NetworkError::GraphInconsistency {
                reason: format!("socket {id} is not registered"),
            })
    }

    fn node_data(&self, node: NodeRef) -> Option<&BuilderNode> {
        if node.graph() != self.graph {
            return None;
        }
        let slot = *self.node_by_id.get(node.id().index())?;
        self.nodes.get(slot)
    }

    fn socket_data(&self, graph: GraphId, id: SocketId) -> Option<&BuilderSocket> {
        if graph != self.graph {
            return None;
        }
        let slot = *self.socket_by_id.get(id.index())?;
        self.sockets.get(slot)
    }

    fn node_ref(&self, slot: Slot<BuilderNode>) -> NodeRef {
        NodeRef::new(self.graph, self.nodes[slot].id)
    }

    fn input_ref(&self, slot: Slot<BuilderSocket>) -> InputRef {
        InputRef::new(self.graph, self.sockets[slot].id)
    }

    fn output_ref(&self, slot: Slot<BuilderSocket>) -> OutputRef {
        OutputRef::new(self.graph, self.sockets[slot].id)
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    pub fn node_count(&self) -> usize {
        self.node_by_id.len()
    }

    pub fn socket_count(&self) -> usize {
        self.socket_by_id.len()
    }

    pub fn link_count(&self) -> usize {
        self.link_count
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.node_by_id.iter().map(|&slot| self.node_ref(slot))
    }

    /// Operation nodes in creation order.
    pub fn operation_nodes(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.operation_nodes.iter().map(|&slot| self.node_ref(slot))
    }

    /// Dummy nodes in creation order.
    pub fn dummy_nodes(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.dummy_nodes.iter().map(|&slot| self.node_ref(slot))
    }

    /// All input sockets in creation order.
    pub fn input_sockets(&self) -> impl Iterator<Item = InputRef> + '_ {
        self.input_sockets.iter().map(|&slot| self.input_ref(slot))
    }

    /// All output sockets in creation order.
    pub fn output_sockets(&self) -> impl Iterator<Item = OutputRef> + '_ {
        self.output_sockets.iter().map(|&slot| self.output_ref(slot))
    }

    /// Returns the node's payload, or `None` for a foreign handle.
    pub fn node_kind(&self, node: NodeRef) -> Option<&NodeKind> {
        self.node_data(node).map(|data| &data.kind)
    }

    /// Returns `true` if `node` is a dummy node of this graph.
    pub fn is_dummy(&self, node: NodeRef) -> bool {
        self.node_kind(node).is_some_and(NodeKind::is_dummy)
    }

    pub fn node_name(&self, node: NodeRef) -> Option<&str> {
        self.node_kind(node).map(NodeKind::name)
    }

    /// Input socket `index` of `node`.
    pub fn input(&self, node: NodeRef, index: usize) -> Option<InputRef> {
        let slot = *self.node_data(node)?.inputs.get(index)?;
        Some(self.input_ref(slot))
    }

    /// Output socket `index` of `node`.
    pub fn output(&self, node: NodeRef, index: usize) -> Option<OutputRef> {
        let slot = *self.node_data(node)?.outputs.get(index)?;
        Some(self.output_ref(slot))
    }

    /// The node's input sockets in order. Empty for a foreign handle.
    pub fn inputs(&self, node: NodeRef) -> impl Iterator<Item = InputRef> + '_ {
        self.node_data(node)
            .into_iter()
            .flat_map(|data| data.inputs.iter())
            .map(|&slot| self.input_ref(slot))
    }

    /// The node's output sockets in order. Empty for a foreign handle.
    pub fn outputs(&self, node: NodeRef) -> impl Iterator<Item = OutputRef> + '_ {
        self.node_data(node)
            .into_iter()
            .flat_map(|data| data.outputs.iter())
            .map(|&slot| self.output_ref(slot))
    }

    pub fn node_of_input(&self, input: InputRef) -> Option<NodeRef> {
        let socket = self.socket_data(input.graph(), input.id())?;
        Some(self.node_ref(socket.node))
    }

    pub fn node_of_output(&self, output: OutputRef) -> Option<NodeRef> {
        let socket = self.socket_data(output.graph(), output.id())?;
        Some(self.node_ref(socket.node))
    }

    pub fn input_type(&self, input: InputRef) -> Option<DataType> {
        self.socket_data(input.graph(), input.id())
            .map(|socket| socket.data_type)
    }

    pub fn output_type(&self, output: OutputRef) -> Option<DataType> {
        self.socket_data(output.graph(), output.id())
            .map(|socket| socket.data_type)
    }

    /// The output feeding `input`, if it is linked.
    pub fn origin(&self, input: InputRef) -> Option<OutputRef> {
        let origin = self.socket_data(input.graph(), input.id())?.origin()?;
        Some(self.output_ref(origin))
    }

    /// The inputs fed by `output`, in link order.
    pub fn targets(&self, output: OutputRef) -> impl Iterator<Item = InputRef> + '_ {
        self.socket_data(output.graph(), output.id())
            .into_iter()
            .flat_map(|socket| socket.targets().iter())
            .map(|&slot| self.input_ref(slot))
    }

    /// Inputs that have no origin yet, in id order.
    pub fn unlinked_inputs(&self) -> impl Iterator<Item = InputRef> + '_ {
        self.input_sockets
            .iter()
            .filter(|&&slot| self.sockets[slot].origin().is_none())
            .map(|&slot| self.input_ref(slot))
    }

    /// Node-to-node edges, one per link.
    pub(crate) fn node_links(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.input_sockets.iter().filter_map(|&input| {
            let socket = &self.sockets[input];
            let origin = socket.origin()?;
            Some((
                self.nodes[self.sockets[origin].node].id,
                self.nodes[socket.node].id,
            ))
        })
    }

    /// Returns `true` if the links form no cycle between nodes.
    pub fn is_acyclic(&self) -> bool {
        analysis::topological_order(self.node_count(), self.node_links()).is_ok()
    }

    /// Renders the current topology as Graphviz DOT text. Unlinked inputs are
    /// drawn without an incoming edge.
    pub fn to_dot(&self) -> String {
        let mut dot = DotGraph::default();
        for &slot in &self.node_by_id {
            let node = &self.nodes[slot];
            dot.nodes.push(DotNode {
                id: node.id,
                title: node.kind.name(),
                inputs: self.dot_sockets(node, &node.inputs, SocketDirection::Input),
                outputs: self.dot_sockets(node, &node.outputs, SocketDirection::Output),
            });
            for &input in &node.inputs {
                let socket = &self.sockets[input];
                if let Some(origin) = socket.origin() {
                    let origin = &self.sockets[origin];
                    dot.links.push(DotLink {
                        from: (self.nodes[origin.node].id, origin.id),
                        to: (node.id, socket.id),
                    });
                }
            }
        }
        dot.to_string()
    }

    fn dot_sockets<'a>(
        &'a self,
        node: &'a BuilderNode,
        sockets: &[Slot<BuilderSocket>],
        direction: SocketDirection,
    ) -> Vec<(SocketId, &'a str)> {
        sockets
            .iter()
            .map(|&slot| {
                let socket = &self.sockets[slot];
                (socket.id, node.kind.socket_name(direction, socket.index as usize))
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Invariant checking (debug builds only)
    // -----------------------------------------------------------------------

    /// Verifies dense ids, socket ownership and that both sides of every
    /// link agree.
    ///
    /// Only called in debug builds (via `cfg(debug_assertions)`).
    #[cfg(debug_assertions)]
    pub(crate) fn assert_consistency(&self) {
        for (position, &slot) in self.node_by_id.iter().enumerate() {
            let node = &self.nodes[slot];
            assert_eq!(node.id.index(), position, "node {} registered at position {}", node.id, position);
            for (sockets, direction) in [
                (&node.inputs, SocketDirection::Input),
                (&node.outputs, SocketDirection::Output),
            ] {
                for (index, &socket) in sockets.iter().enumerate() {
                    let socket = &self.sockets[socket];
                    assert_eq!(socket.node, slot, "socket {} not owned by node {}", socket.id, node.id);
                    assert_eq!(socket.index as usize, index, "socket {} has wrong index", socket.id);
                    assert_eq!(socket.direction(), direction, "socket {} has wrong direction", socket.id);
                }
            }
        }
        for (position, &slot) in self.socket_by_id.iter().enumerate() {
            assert_eq!(self.sockets[slot].id.index(), position, "socket id registered at wrong position");
        }
        for &input in &self.input_sockets {
            if let Some(origin) = self.sockets[input].origin() {
                assert!(
                    self.sockets[origin].targets().contains(&input),
                    "input {} is missing from the targets of its origin {}",
                    self.sockets[input].id,
                    self.sockets[origin].id
                );
            }
        }
        for &output in &self.output_sockets {
            for &target in self.sockets[output].targets() {
                assert_eq!(
                    self.sockets[target].origin(),
                    Some(output),
                    "target {} of output {} has a different origin",
                    self.sockets[target].id,
                    self.sockets[output].id
                );
            }
        }
    }
}

impl Default for BuilderGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks that the socket mappings of an operation node match its
/// descriptor exactly.
fn check_param_mapping(
    descriptor: &dyn OperationDescriptor,
    input_param_indices: &[usize],
    output_param_indices: &[usize],
) -> Result<(), NetworkError> {
    let count = descriptor.param_count();
    let mut mapped = [vec![false; count], vec![false; count]];

    for (list, direction, seen) in [
        (input_param_indices, SocketDirection::Input, 0),
        (output_param_indices, SocketDirection::Output, 1),
    ] {
        for &param in list {
            if param >= count {
                return Err(NetworkError::ParamOutOfRange { param, count });
            }
            if mapped[seen][param] {
                return Err(NetworkError::DuplicateParam { param, direction });
            }
            mapped[seen][param] = true;

            let kind = descriptor.param_type(param).kind;
            if !kind.has_socket(direction) {
                return Err(NetworkError::ParamDirectionMismatch {
                    param,
                    kind,
                    direction,
                });
            }
        }
    }

    for param in 0..count {
        let kind = descriptor.param_type(param).kind;
        for (direction, seen) in [(SocketDirection::Input, 0), (SocketDirection::Output, 1)] {
            if kind.has_socket(direction) && !mapped[seen][param] {
                return Err(NetworkError::MissingParam {
                    param,
                    kind,
                    direction,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{natural_param_indices, Signature};
    use crate::types::ScalarType;

    const FLOAT: DataType = DataType::Single(ScalarType::F32);
    const INT: DataType = DataType::Single(ScalarType::I32);

    fn add_signature() -> Arc<dyn OperationDescriptor> {
        Arc::new(
            Signature::new("add")
                .input("a", FLOAT)
                .input("b", FLOAT)
                .output("sum", FLOAT),
        )
    }

    fn scale_signature() -> Arc<dyn OperationDescriptor> {
        Arc::new(
            Signature::new("scale")
                .input("factor", FLOAT)
                .mutable("values", DataType::Vector(ScalarType::F32)),
        )
    }

    #[test]
    fn add_operation_allocates_typed_sockets() {
        let mut graph = BuilderGraph::new();
        let node = graph.add_operation(add_signature(), &[0, 1], &[2]).unwrap();

        assert_eq!(node.id(), NodeId(0));
        assert_eq!(graph.inputs(node).count(), 2);
        assert_eq!(graph.outputs(node).count(), 1);
        assert_eq!(graph.input_type(graph.input(node, 1).unwrap()), Some(FLOAT));
        assert_eq!(graph.node_name(node), Some("add"));
        assert!(!graph.is_dummy(node));
    }

    #[test]
    fn mutable_param_gets_input_and_output_socket() {
        let mut graph = BuilderGraph::new();
        let node = graph.add_operation(scale_signature(), &[0, 1], &[1]).unwrap();

        let output = graph.output(node, 0).unwrap();
        assert_eq!(graph.output_type(output), Some(DataType::Vector(ScalarType::F32)));
        match graph.node_kind(node) {
            Some(NodeKind::Operation(op)) => {
                assert_eq!(op.input_param_indices, vec![0, 1]);
                assert_eq!(op.output_param_indices, vec![1]);
            }
            other => panic!("expected operation node, got {other:?}"),
        }
    }

    #[test]
    fn mapping_may_reorder_params() {
        let mut graph = BuilderGraph::new();
        let node = graph.add_operation(add_signature(), &[1, 0], &[2]).unwrap();
        let first = graph.input(node, 0).unwrap();
        assert_eq!(
            graph.node_kind(node).unwrap().socket_name(SocketDirection::Input, 0),
            "b"
        );
        assert_eq!(first.id(), SocketId(0));
    }

    #[test]
    fn duplicate_param_is_rejected() {
        let mut graph = BuilderGraph::new();
        let result = graph.add_operation(add_signature(), &[0, 0, 1], &[2]);
        assert_eq!(
            result,
            Err(NetworkError::DuplicateParam {
                param: 0,
                direction: SocketDirection::Input,
            })
        );
    }

    #[test]
    fn missing_param_is_rejected() {
        let mut graph = BuilderGraph::new();
        let result = graph.add_operation(add_signature(), &[0], &[2]);
        assert!(matches!(
            result,
            Err(NetworkError::MissingParam {
                param: 1,
                direction: SocketDirection::Input,
                ..
            })
        ));
    }

    #[test]
    fn mutable_param_missing_from_outputs_is_rejected() {
        let mut graph = BuilderGraph::new();
        let result = graph.add_operation(scale_signature(), &[0, 1], &[]);
        assert!(matches!(
            result,
            Err(NetworkError::MissingParam {
                param: 1,
                direction: SocketDirection::Output,
                ..
            })
        ));
    }

    #[test]
    fn param_on_wrong_side_is_rejected() {
        let mut graph = BuilderGraph::new();
        let result = graph.add_operation(add_signature(), &[0, 1, 2], &[2]);
        assert!(matches!(
            result,
            Err(NetworkError::ParamDirectionMismatch { param: 2, .. })
        ));
    }

    #[test]
    fn out_of_range_param_is_rejected() {
        let mut graph = BuilderGraph::new();
        let result = graph.add_operation(add_signature(), &[0, 1], &[7]);
        assert_eq!(
            result,
            Err(NetworkError::ParamOutOfRange { param: 7, count: 3 })
        );
    }

    #[test]
    fn failed_add_operation_leaves_graph_unchanged() {
        let mut graph = BuilderGraph::new();
        graph.add_dummy(&[], &[FLOAT]);
        assert!(graph.add_operation(add_signature(), &[0], &[2]).is_err());

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.socket_count(), 1);

        // The next node still gets the next dense id.
        let node = graph.add_operation(add_signature(), &[0, 1], &[2]).unwrap();
        assert_eq!(node.id(), NodeId(1));
    }

    #[test]
    fn ids_are_dense_across_kinds_and_directions() {
        let mut graph = BuilderGraph::new();
        let source = graph.add_dummy(&[], &[FLOAT, FLOAT]);
        let add = graph.add_operation(add_signature(), &[0, 1], &[2]).unwrap();
        let sink = graph.add_dummy(&[FLOAT], &[]);

        let node_ids: Vec<u32> = graph.nodes().map(|n| n.id().0).collect();
        assert_eq!(node_ids, vec![0, 1, 2]);
        assert_eq!(
            [source.id(), add.id(), sink.id()],
            [NodeId(0), NodeId(1), NodeId(2)]
        );

        let mut socket_ids: Vec<u32> = graph
            .input_sockets()
            .map(|s| s.id().0)
            .chain(graph.output_sockets().map(|s| s.id().0))
            .collect();
        socket_ids.sort_unstable();
        assert_eq!(socket_ids, vec![0, 1, 2, 3, 4, 5]);

        assert_eq!(graph.dummy_nodes().count(), 2);
        assert_eq!(graph.operation_nodes().count(), 1);
    }

    #[test]
    fn add_link_sets_origin_and_target() {
        let mut graph = BuilderGraph::new();
        let source = graph.add_dummy(&[], &[FLOAT]);
        let sink = graph.add_dummy(&[FLOAT], &[]);
        let out = graph.output(source, 0).unwrap();
        let input = graph.input(sink, 0).unwrap();

        assert_eq!(graph.origin(input), None);
        graph.add_link(out, input).unwrap();

        assert_eq!(graph.origin(input), Some(out));
        assert_eq!(graph.targets(out).collect::<Vec<_>>(), vec![input]);
        assert_eq!(graph.link_count(), 1);
        assert_eq!(graph.node_of_input(input), Some(sink));
        assert_eq!(graph.node_of_output(out), Some(source));
    }

    #[test]
    fn second_link_into_input_is_rejected() {
        let mut graph = BuilderGraph::new();
        let a = graph.add_dummy(&[], &[FLOAT]);
        let b = graph.add_dummy(&[], &[FLOAT]);
        let sink = graph.add_dummy(&[FLOAT], &[]);
        let input = graph.input(sink, 0).unwrap();
        let first = graph.output(a, 0).unwrap();
        let second = graph.output(b, 0).unwrap();

        graph.add_link(first, input).unwrap();
        let result = graph.add_link(second, input);

        assert_eq!(
            result,
            Err(NetworkError::InputAlreadyLinked {
                input: input.id(),
                origin: first.id(),
            })
        );
        // The failed link left no trace.
        assert_eq!(graph.origin(input), Some(first));
        assert_eq!(graph.targets(second).count(), 0);
        assert_eq!(graph.link_count(), 1);
    }

    #[test]
    fn output_fans_out_in_link_order() {
        let mut graph = BuilderGraph::new();
        let source = graph.add_dummy(&[], &[FLOAT]);
        let sink = graph.add_dummy(&[FLOAT, FLOAT, FLOAT], &[]);
        let out = graph.output(source, 0).unwrap();
        let inputs: Vec<InputRef> = graph.inputs(sink).collect();

        for &input in inputs.iter().rev() {
            graph.add_link(out, input).unwrap();
        }

        let targets: Vec<InputRef> = graph.targets(out).collect();
        assert_eq!(targets, inputs.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    fn link_across_graphs_is_rejected() {
        let mut first = BuilderGraph::new();
        let mut second = BuilderGraph::new();
        let source = first.add_dummy(&[], &[FLOAT]);
        let sink = second.add_dummy(&[FLOAT], &[]);
        let out = first.output(source, 0).unwrap();
        let input = second.input(sink, 0).unwrap();

        let result = second.add_link(out, input);
        assert_eq!(
            result,
            Err(NetworkError::ForeignHandle {
                expected: second.graph_id(),
                found: first.graph_id(),
            })
        );
        assert_eq!(second.origin(input), None);
    }

    #[test]
    fn foreign_handles_resolve_to_nothing() {
        let mut first = BuilderGraph::new();
        let second = BuilderGraph::new();
        let node = first.add_dummy(&[FLOAT], &[FLOAT]);

        assert!(second.node_kind(node).is_none());
        assert_eq!(second.inputs(node).count(), 0);
        assert!(second.input(node, 0).is_none());
        assert!(!second.is_dummy(node));
    }

    #[test]
    fn unlinked_inputs_lists_open_sockets() {
        let mut graph = BuilderGraph::new();
        let source = graph.add_dummy(&[], &[INT]);
        let sink = graph.add_dummy(&[INT, INT], &[]);
        let first = graph.input(sink, 0).unwrap();
        let second = graph.input(sink, 1).unwrap();
        graph.add_link(graph.output(source, 0).unwrap(), first).unwrap();

        assert_eq!(graph.unlinked_inputs().collect::<Vec<_>>(), vec![second]);
    }

    #[test]
    fn cycles_are_constructible_and_detected() {
        let mut graph = BuilderGraph::new();
        let sig = add_signature();
        let (inputs, outputs) = natural_param_indices(sig.as_ref());
        let a = graph.add_operation(Arc::clone(&sig), &inputs, &outputs).unwrap();
        let b = graph.add_operation(sig, &inputs, &outputs).unwrap();
        assert!(graph.is_acyclic());

        graph.add_link(graph.output(a, 0).unwrap(), graph.input(b, 0).unwrap()).unwrap();
        assert!(graph.is_acyclic());
        graph.add_link(graph.output(b, 0).unwrap(), graph.input(a, 0).unwrap()).unwrap();
        assert!(!graph.is_acyclic());
    }

    #[test]
    fn to_dot_renders_nodes_and_links() {
        let mut graph = BuilderGraph::new();
        let source = graph.add_dummy_named("Inputs", &[], &[("x", FLOAT), ("y", FLOAT)]);
        let add = graph.add_operation(add_signature(), &[0, 1], &[2]).unwrap();
        graph
            .add_link(graph.output(source, 0).unwrap(), graph.input(add, 0).unwrap())
            .unwrap();

        let dot = graph.to_dot();
        assert!(dot.starts_with("digraph Network {\nrankdir=LR\n"));
        assert!(dot.contains("<b>Inputs</b>"));
        assert!(dot.contains("<b>add</b>"));
        assert!(dot.contains("port=\"s0\">x</td>"));
        assert!(dot.contains("port=\"s2\">a</td>"));
        assert!(dot.contains("\"n0\":\"s0\" -> \"n1\":\"s2\"\n"));
        // Only one link exists.
        assert_eq!(dot.matches(" -> ").count(), 1);
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn consistency_check_passes_on_linked_graph() {
        let mut graph = BuilderGraph::new();
        let source = graph.add_dummy(&[], &[FLOAT]);
        let add = graph.add_operation(add_signature(), &[0, 1], &[2]).unwrap();
        let out = graph.output(source, 0).unwrap();
        graph.add_link(out, graph.input(add, 0).unwrap()).unwrap();
        graph.add_link(out, graph.input(add, 1).unwrap()).unwrap();

        #[cfg(debug_assertions)]
        graph.assert_consistency();
        assert_eq!(graph.link_count(), 2);
    }
}
