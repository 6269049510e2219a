//! Network: the immutable, id-indexed result of finalization.
//!
//! A [`Network`] has the same node and socket ids as the
//! [`BuilderGraph`](crate::builder::BuilderGraph) it came from and an exact
//! copy of its links, but lives in its own arenas and exposes no way to
//! mutate it. Every input socket has an origin. All queries take `&self` and
//! the type is `Send + Sync`, so an execution engine may query one network
//! from several threads at once.
//!
//! Reads go through borrowed views ([`NodeView`], [`InputView`],
//! [`OutputView`]) that follow links without any lookups by the caller.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexSet;
use smallvec::SmallVec;

use crate::analysis;
use crate::arena::{Arena, Slot};
use crate::descriptor::OperationDescriptor;
use crate::dot::{DotGraph, DotLink, DotNode};
use crate::error::NetworkError;
use crate::id::{GraphId, InputRef, NodeId, NodeRef, OutputRef, SocketId};
use crate::node::NodeKind;
use crate::types::{DataType, SocketDirection};

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) inputs: SmallVec<[Slot<Socket>; 4]>,
    pub(crate) outputs: SmallVec<[Slot<Socket>; 4]>,
}

#[derive(Debug)]
pub(crate) struct Socket {
    pub(crate) id: SocketId,
    pub(crate) index: u32,
    pub(crate) data_type: DataType,
    pub(crate) node: Slot<Node>,
    pub(crate) link: Link,
}

#[derive(Debug)]
pub(crate) enum Link {
    /// `None` only between the shell and wiring passes of finalization.
    Input { origin: Option<Slot<Socket>> },
    Output { targets: SmallVec<[Slot<Socket>; 4]> },
}

impl Socket {
    fn direction(&self) -> SocketDirection {
        match self.link {
            Link::Input { .. } => SocketDirection::Input,
            Link::Output { .. } => SocketDirection::Output,
        }
    }

    fn origin(&self) -> Option<Slot<Socket>> {
        match self.link {
            Link::Input { origin } => origin,
            Link::Output { .. } => None,
        }
    }

    fn targets(&self) -> &[Slot<Socket>] {
        match &self.link {
            Link::Output { targets } => targets.as_slice(),
            Link::Input { .. } => &[],
        }
    }
}

/// The finalized, read-only data-flow network.
#[derive(Debug)]
pub struct Network {
    pub(crate) graph: GraphId,
    pub(crate) nodes: Arena<Node>,
    pub(crate) sockets: Arena<Socket>,
    pub(crate) node_by_id: Vec<Slot<Node>>,
    pub(crate) socket_by_id: Vec<Slot<Socket>>,
    pub(crate) operation_nodes: Vec<Slot<Node>>,
    pub(crate) dummy_nodes: Vec<Slot<Node>>,
    pub(crate) input_sockets: Vec<Slot<Socket>>,
    pub(crate) output_sockets: Vec<Slot<Socket>>,
    pub(crate) link_count: usize,
}

impl Network {
    /// The id of the builder graph this network was finalized from.
    pub fn graph_id(&self) -> GraphId {
        self.graph
    }

    pub fn node_count(&self) -> usize {
        self.node_by_id.len()
    }

    pub fn socket_count(&self) -> usize {
        self.socket_by_id.len()
    }

    pub fn link_count(&self) -> usize {
        self.link_count
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub fn node_by_id(&self, id: NodeId) -> Option<NodeView<'_>> {
        let slot = *self.node_by_id.get(id.index())?;
        Some(self.node_view(slot))
    }

    /// Resolves a handle taken from the builder graph (or from this network).
    pub fn node(&self, node: NodeRef) -> Option<NodeView<'_>> {
        if node.graph() != self.graph {
            return None;
        }
        self.node_by_id(node.id())
    }

    /// Returns the input socket with this id, or `None` if the id is unknown
    /// or names an output.
    pub fn input_by_id(&self, id: SocketId) -> Option<InputView<'_>> {
        let slot = *self.socket_by_id.get(id.index())?;
        let socket = &self.sockets[slot];
        (socket.direction() == SocketDirection::Input).then_some(InputView {
            network: self,
            socket,
        })
    }

    /// Returns the output socket with this id, or `None` if the id is unknown
    /// or names an input.
    pub fn output_by_id(&self, id: SocketId) -> Option<OutputView<'_>> {
        let slot = *self.socket_by_id.get(id.index())?;
        let socket = &self.sockets[slot];
        (socket.direction() == SocketDirection::Output).then_some(OutputView {
            network: self,
            socket,
        })
    }

    pub fn input(&self, input: InputRef) -> Option<InputView<'_>> {
        if input.graph() != self.graph {
            return None;
        }
        self.input_by_id(input.id())
    }

    pub fn output(&self, output: OutputRef) -> Option<OutputView<'_>> {
        if output.graph() != self.graph {
            return None;
        }
        self.output_by_id(output.id())
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeView<'_>> + '_ {
        self.node_by_id.iter().map(|&slot| self.node_view(slot))
    }

    pub fn operation_nodes(&self) -> impl Iterator<Item = NodeView<'_>> + '_ {
        self.operation_nodes.iter().map(|&slot| self.node_view(slot))
    }

    pub fn dummy_nodes(&self) -> impl Iterator<Item = NodeView<'_>> + '_ {
        self.dummy_nodes.iter().map(|&slot| self.node_view(slot))
    }

    /// All input sockets: those of operation nodes first, then those of
    /// dummy nodes.
    pub fn input_sockets(&self) -> impl Iterator<Item = InputView<'_>> + '_ {
        self.input_sockets.iter().map(|&slot| InputView {
            network: self,
            socket: &self.sockets[slot],
        })
    }

    /// All output sockets, in the same order as [`Network::input_sockets`].
    pub fn output_sockets(&self) -> impl Iterator<Item = OutputView<'_>> + '_ {
        self.output_sockets.iter().map(|&slot| OutputView {
            network: self,
            socket: &self.sockets[slot],
        })
    }

    fn node_view(&self, slot: Slot<Node>) -> NodeView<'_> {
        NodeView {
            network: self,
            node: &self.nodes[slot],
        }
    }

    // -----------------------------------------------------------------------
    // Dependency traversal
    // -----------------------------------------------------------------------

    /// Finds the dummy-node outputs that transitively feed `seeds`.
    ///
    /// Walks links backwards from the seed inputs. When an origin belongs to
    /// an operation node, all of that node's inputs are searched too; when it
    /// belongs to a dummy node, the origin is a dependency and the search
    /// stops there. Each output is visited at most once, so the walk
    /// terminates even on cyclic graphs.
    ///
    /// Results are in first-discovery order of a depth-first walk that pops
    /// the most recently pushed input first (the last seed is searched
    /// first). Fails only if a seed belongs to another graph or is not an
    /// input socket.
    pub fn find_dummy_dependencies(
        &self,
        seeds: &[InputRef],
    ) -> Result<IndexSet<OutputRef>, NetworkError> {
        let mut inputs_to_check: Vec<Slot<Socket>> = Vec::with_capacity(seeds.len());
        for &seed in seeds {
            inputs_to_check.push(self.input_slot(seed)?);
        }

        let mut found_outputs: HashSet<Slot<Socket>> = HashSet::new();
        let mut dependencies = IndexSet::new();

        while let Some(input) = inputs_to_check.pop() {
            let origin = self.sockets[input].origin().ok_or_else(|| {
                NetworkError::GraphInconsistency {
                    reason: format!("input socket {} has no origin", self.sockets[input].id),
                }
            })?;
            if !found_outputs.insert(origin) {
                continue;
            }

            let origin_socket = &self.sockets[origin];
            let node = &self.nodes[origin_socket.node];
            match node.kind {
                NodeKind::Dummy(_) => {
                    dependencies.insert(OutputRef::new(self.graph, origin_socket.id));
                }
                NodeKind::Operation(_) => inputs_to_check.extend(node.inputs.iter().copied()),
            }
        }

        Ok(dependencies)
    }

    fn input_slot(&self, input: InputRef) -> Result<Slot<Socket>, NetworkError> {
        if input.graph() != self.graph {
            return Err(NetworkError::ForeignHandle {
                expected: self.graph,
                found: input.graph(),
            });
        }
        let slot = self
            .socket_by_id
            .get(input.id().index())
            .copied()
            .ok_or_else(|| NetworkError::GraphInconsistency {
                reason: format!("socket {} is not registered", input.id()),
            })?;
        if self.sockets[slot].direction() != SocketDirection::Input {
            return Err(NetworkError::GraphInconsistency {
                reason: format!("socket {} is not an input", input.id()),
            });
        }
        Ok(slot)
    }

    // -----------------------------------------------------------------------
    // Analysis and export
    // -----------------------------------------------------------------------

    fn node_links(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.input_sockets.iter().filter_map(|&input| {
            let socket = &self.sockets[input];
            let origin = socket.origin()?;
            Some((
                self.nodes[self.sockets[origin].node].id,
                self.nodes[socket.node].id,
            ))
        })
    }

    /// Node ids ordered so every node comes after the nodes feeding it.
    ///
    /// Fails with [`NetworkError::Cycle`] if no such order exists.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, NetworkError> {
        analysis::topological_order(self.node_count(), self.node_links())
    }

    pub fn is_acyclic(&self) -> bool {
        self.topological_order().is_ok()
    }

    /// Renders the network as Graphviz DOT text.
    pub fn to_dot(&self) -> String {
        let mut dot = DotGraph::default();
        for node in self.nodes() {
            dot.nodes.push(DotNode {
                id: node.id(),
                title: node.name(),
                inputs: node.inputs().map(|s| (s.id(), s.name())).collect(),
                outputs: node.outputs().map(|s| (s.id(), s.name())).collect(),
            });
            for input in node.inputs() {
                let origin = input.origin();
                dot.links.push(DotLink {
                    from: (origin.node().id(), origin.id()),
                    to: (node.id(), input.id()),
                });
            }
        }
        dot.to_string()
    }

    /// Verifies dense ids and that both sides of every link agree.
    ///
    /// Only called in debug builds (via `cfg(debug_assertions)`).
    #[cfg(debug_assertions)]
    pub(crate) fn assert_consistency(&self) {
        for (position, &slot) in self.node_by_id.iter().enumerate() {
            assert_eq!(self.nodes[slot].id.index(), position, "node id registered at wrong position");
        }
        for (position, &slot) in self.socket_by_id.iter().enumerate() {
            assert_eq!(self.sockets[slot].id.index(), position, "socket id registered at wrong position");
        }
        for &input in &self.input_sockets {
            let origin = self.sockets[input].origin();
            assert!(origin.is_some(), "input {} has no origin", self.sockets[input].id);
            if let Some(origin) = origin {
                assert!(
                    self.sockets[origin].targets().contains(&input),
                    "input {} is missing from the targets of its origin",
                    self.sockets[input].id
                );
            }
        }
        for &output in &self.output_sockets {
            for &target in self.sockets[output].targets() {
                assert_eq!(self.sockets[target].origin(), Some(output), "target has a different origin");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Borrowed view of one node.
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    network: &'a Network,
    node: &'a Node,
}

/// Borrowed view of one input socket.
#[derive(Clone, Copy)]
pub struct InputView<'a> {
    network: &'a Network,
    socket: &'a Socket,
}

/// Borrowed view of one output socket.
#[derive(Clone, Copy)]
pub struct OutputView<'a> {
    network: &'a Network,
    socket: &'a Socket,
}

impl<'a> NodeView<'a> {
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    pub fn node_ref(&self) -> NodeRef {
        NodeRef::new(self.network.graph, self.node.id)
    }

    pub fn kind(&self) -> &'a NodeKind {
        &self.node.kind
    }

    pub fn is_dummy(&self) -> bool {
        self.node.kind.is_dummy()
    }

    pub fn is_operation(&self) -> bool {
        self.node.kind.is_operation()
    }

    pub fn name(&self) -> &'a str {
        self.node.kind.name()
    }

    pub fn descriptor(&self) -> Option<&'a Arc<dyn OperationDescriptor>> {
        self.node.kind.descriptor()
    }

    /// Parameter index behind each input socket. Empty for dummy nodes.
    pub fn input_param_indices(&self) -> &'a [usize] {
        match &self.node.kind {
            NodeKind::Operation(op) => op.input_param_indices.as_slice(),
            NodeKind::Dummy(_) => &[],
        }
    }

    /// Parameter index behind each output socket. Empty for dummy nodes.
    pub fn output_param_indices(&self) -> &'a [usize] {
        match &self.node.kind {
            NodeKind::Operation(op) => op.output_param_indices.as_slice(),
            NodeKind::Dummy(_) => &[],
        }
    }

    pub fn inputs(&self) -> impl Iterator<Item = InputView<'a>> + 'a {
        let network = self.network;
        self.node.inputs.iter().map(move |&slot| InputView {
            network,
            socket: &network.sockets[slot],
        })
    }

    pub fn outputs(&self) -> impl Iterator<Item = OutputView<'a>> + 'a {
        let network = self.network;
        self.node.outputs.iter().map(move |&slot| OutputView {
            network,
            socket: &network.sockets[slot],
        })
    }

    pub fn input(&self, index: usize) -> Option<InputView<'a>> {
        let slot = *self.node.inputs.get(index)?;
        Some(InputView {
            network: self.network,
            socket: &self.network.sockets[slot],
        })
    }

    pub fn output(&self, index: usize) -> Option<OutputView<'a>> {
        let slot = *self.node.outputs.get(index)?;
        Some(OutputView {
            network: self.network,
            socket: &self.network.sockets[slot],
        })
    }
}

impl<'a> InputView<'a> {
    pub fn id(&self) -> SocketId {
        self.socket.id
    }

    /// Position among the node's inputs.
    pub fn index(&self) -> usize {
        self.socket.index as usize
    }

    pub fn data_type(&self) -> DataType {
        self.socket.data_type
    }

    pub fn input_ref(&self) -> InputRef {
        InputRef::new(self.network.graph, self.socket.id)
    }

    pub fn node(&self) -> NodeView<'a> {
        self.network.node_view(self.socket.node)
    }

    pub fn name(&self) -> &'a str {
        let node = &self.network.nodes[self.socket.node];
        node.kind.socket_name(SocketDirection::Input, self.index())
    }

    /// Descriptor parameter behind this socket, for operation nodes.
    pub fn param_index(&self) -> Option<usize> {
        let node = &self.network.nodes[self.socket.node];
        node.kind.param_index(SocketDirection::Input, self.index())
    }

    /// The output socket feeding this input.
    pub fn origin(&self) -> OutputView<'a> {
        match self.socket.origin() {
            Some(origin) => OutputView {
                network: self.network,
                socket: &self.network.sockets[origin],
            },
            // Finalization refuses to produce a network with unlinked inputs.
            None => unreachable!("finalized input socket {} has no origin", self.socket.id),
        }
    }
}

impl<'a> OutputView<'a> {
    pub fn id(&self) -> SocketId {
        self.socket.id
    }

    /// Position among the node's outputs.
    pub fn index(&self) -> usize {
        self.socket.index as usize
    }

    pub fn data_type(&self) -> DataType {
        self.socket.data_type
    }

    pub fn output_ref(&self) -> OutputRef {
        OutputRef::new(self.network.graph, self.socket.id)
    }

    pub fn node(&self) -> NodeView<'a> {
        self.network.node_view(self.socket.node)
    }

    pub fn name(&self) -> &'a str {
        let node = &self.network.nodes[self.socket.node];
        node.kind.socket_name(SocketDirection::Output, self.index())
    }

    pub fn param_index(&self) -> Option<usize> {
        let node = &self.network.nodes[self.socket.node];
        node.kind.param_index(SocketDirection::Output, self.index())
    }

    /// The inputs this output feeds, in link order.
    pub fn targets(&self) -> impl Iterator<Item = InputView<'a>> + 'a {
        let network = self.network;
        self.socket.targets().iter().map(move |&slot| InputView {
            network,
            socket: &network.sockets[slot],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BuilderGraph;
    use crate::descriptor::{natural_param_indices, Signature};
    use crate::types::ScalarType;

    const FLOAT: DataType = DataType::Single(ScalarType::F32);

    fn op(graph: &mut BuilderGraph, name: &str, inputs: usize, outputs: usize) -> NodeRef {
        let mut sig = Signature::new(name);
        for i in 0..inputs {
            sig = sig.input(format!("in{i}"), FLOAT);
        }
        for i in 0..outputs {
            sig = sig.output(format!("out{i}"), FLOAT);
        }
        let (ins, outs) = natural_param_indices(&sig);
        graph.add_operation(Arc::new(sig), &ins, &outs).unwrap()
    }

    fn link(graph: &mut BuilderGraph, from: NodeRef, output: usize, to: NodeRef, input: usize) {
        let from = graph.output(from, output).unwrap();
        let to = graph.input(to, input).unwrap();
        graph.add_link(from, to).unwrap();
    }

    #[test]
    fn chain_depends_on_single_dummy() {
        // Dummy.out -> OpA.in, OpA.out -> Target.in
        let mut graph = BuilderGraph::new();
        let dummy = graph.add_dummy(&[], &[FLOAT]);
        let op_a = op(&mut graph, "a", 1, 1);
        let target = graph.add_dummy(&[FLOAT], &[]);
        link(&mut graph, dummy, 0, op_a, 0);
        link(&mut graph, op_a, 0, target, 0);

        let dummy_out = graph.output(dummy, 0).unwrap();
        let target_in = graph.input(target, 0).unwrap();
        let network = graph.finalize().unwrap();

        let deps = network.find_dummy_dependencies(&[target_in]).unwrap();
        assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec![dummy_out]);
    }

    #[test]
    fn fan_in_reports_each_dummy_output_once() {
        let mut graph = BuilderGraph::new();
        let dummy = graph.add_dummy(&[], &[FLOAT]);
        let op_a = op(&mut graph, "a", 1, 1);
        let op_b = op(&mut graph, "b", 1, 1);
        let target = graph.add_dummy(&[FLOAT, FLOAT], &[]);
        link(&mut graph, dummy, 0, op_a, 0);
        link(&mut graph, dummy, 0, op_b, 0);
        link(&mut graph, op_a, 0, target, 0);
        link(&mut graph, op_b, 0, target, 1);

        let dummy_out = graph.output(dummy, 0).unwrap();
        let seeds: Vec<InputRef> = graph.inputs(target).collect();
        let network = graph.finalize().unwrap();

        let deps = network.find_dummy_dependencies(&seeds).unwrap();
        assert_eq!(deps.len(), 1);
        assert!(deps.contains(&dummy_out));
    }

    #[test]
    fn empty_seed_set_has_no_dependencies() {
        let mut graph = BuilderGraph::new();
        graph.add_dummy(&[], &[FLOAT]);
        let network = graph.finalize().unwrap();

        assert!(network.find_dummy_dependencies(&[]).unwrap().is_empty());
    }

    #[test]
    fn seed_fed_directly_by_dummy() {
        let mut graph = BuilderGraph::new();
        let dummy = graph.add_dummy(&[], &[FLOAT]);
        let target = graph.add_dummy(&[FLOAT], &[]);
        link(&mut graph, dummy, 0, target, 0);
        let seed = graph.input(target, 0).unwrap();
        let network = graph.finalize().unwrap();

        let deps = network.find_dummy_dependencies(&[seed]).unwrap();
        assert_eq!(deps.len(), 1);
    }

    #[test]
    fn dependencies_follow_lifo_discovery_order() {
        // Two dummies feed one op; the op's inputs are pushed in order and
        // popped last-first, so the second dummy is discovered first.
        let mut graph = BuilderGraph::new();
        let first = graph.add_dummy(&[], &[FLOAT]);
        let second = graph.add_dummy(&[], &[FLOAT]);
        let add = op(&mut graph, "add", 2, 1);
        let target = graph.add_dummy(&[FLOAT], &[]);
        link(&mut graph, first, 0, add, 0);
        link(&mut graph, second, 0, add, 1);
        link(&mut graph, add, 0, target, 0);

        let first_out = graph.output(first, 0).unwrap();
        let second_out = graph.output(second, 0).unwrap();
        let seed = graph.input(target, 0).unwrap();
        let network = graph.finalize().unwrap();

        let deps: Vec<OutputRef> = network
            .find_dummy_dependencies(&[seed])
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(deps, vec![second_out, first_out]);
    }

    #[test]
    fn dummy_dependencies_stop_at_dummy_nodes() {
        // A dummy with its own inputs is a boundary: its inputs are not
        // searched.
        let mut graph = BuilderGraph::new();
        let upstream = graph.add_dummy(&[], &[FLOAT]);
        let boundary = graph.add_dummy(&[FLOAT], &[FLOAT]);
        let target = graph.add_dummy(&[FLOAT], &[]);
        link(&mut graph, upstream, 0, boundary, 0);
        link(&mut graph, boundary, 0, target, 0);

        let boundary_out = graph.output(boundary, 0).unwrap();
        let seed = graph.input(target, 0).unwrap();
        let network = graph.finalize().unwrap();

        let deps = network.find_dummy_dependencies(&[seed]).unwrap();
        assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec![boundary_out]);
    }

    #[test]
    fn query_is_repeatable() {
        let mut graph = BuilderGraph::new();
        let dummy = graph.add_dummy(&[], &[FLOAT, FLOAT]);
        let add = op(&mut graph, "add", 2, 1);
        let target = graph.add_dummy(&[FLOAT], &[]);
        link(&mut graph, dummy, 0, add, 0);
        link(&mut graph, dummy, 1, add, 1);
        link(&mut graph, add, 0, target, 0);
        let seed = graph.input(target, 0).unwrap();
        let network = graph.finalize().unwrap();

        let first = network.find_dummy_dependencies(&[seed]).unwrap();
        let second = network.find_dummy_dependencies(&[seed]).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn traversal_terminates_on_cycles() {
        // dummy -> a.in0, b.out -> a.in1, a.out -> b.in0, a.out -> target
        let mut graph = BuilderGraph::new();
        let dummy = graph.add_dummy(&[], &[FLOAT]);
        let a = op(&mut graph, "a", 2, 1);
        let b = op(&mut graph, "b", 1, 1);
        let target = graph.add_dummy(&[FLOAT], &[]);
        link(&mut graph, dummy, 0, a, 0);
        link(&mut graph, b, 0, a, 1);
        link(&mut graph, a, 0, b, 0);
        link(&mut graph, a, 0, target, 0);

        let dummy_out = graph.output(dummy, 0).unwrap();
        let seed = graph.input(target, 0).unwrap();
        let network = graph.finalize().unwrap();

        assert!(!network.is_acyclic());
        let deps = network.find_dummy_dependencies(&[seed]).unwrap();
        assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec![dummy_out]);
    }

    #[test]
    fn foreign_seed_is_rejected() {
        let mut other = BuilderGraph::new();
        let foreign = other.add_dummy(&[FLOAT], &[]);
        let foreign_in = other.input(foreign, 0).unwrap();

        let mut graph = BuilderGraph::new();
        graph.add_dummy(&[], &[FLOAT]);
        let network = graph.finalize().unwrap();

        let result = network.find_dummy_dependencies(&[foreign_in]);
        assert!(matches!(result, Err(NetworkError::ForeignHandle { .. })));
    }

    #[test]
    fn views_follow_links() {
        let mut graph = BuilderGraph::new();
        let source = graph.add_dummy_named("Inputs", &[], &[("x", FLOAT)]);
        let double = op(&mut graph, "double", 1, 1);
        let sink = graph.add_dummy_named("Outputs", &[("y", FLOAT), ("z", FLOAT)], &[]);
        link(&mut graph, source, 0, double, 0);
        link(&mut graph, double, 0, sink, 0);
        link(&mut graph, double, 0, sink, 1);
        let network = graph.finalize().unwrap();

        let double = network.node(double).unwrap();
        assert!(double.is_operation());
        assert_eq!(double.name(), "double");
        assert_eq!(double.input_param_indices(), &[0]);
        assert_eq!(double.output_param_indices(), &[1]);

        let input = double.input(0).unwrap();
        assert_eq!(input.name(), "in0");
        assert_eq!(input.param_index(), Some(0));
        assert_eq!(input.origin().name(), "x");
        assert_eq!(input.origin().node().name(), "Inputs");

        let output = double.output(0).unwrap();
        let targets: Vec<&str> = output.targets().map(|t| t.name()).collect();
        assert_eq!(targets, vec!["y", "z"]);
        assert!(output.targets().all(|t| t.node().is_dummy()));
        assert_eq!(output.data_type(), FLOAT);
    }

    #[test]
    fn lookups_by_id_respect_direction() {
        let mut graph = BuilderGraph::new();
        let source = graph.add_dummy(&[], &[FLOAT]);
        let sink = graph.add_dummy(&[FLOAT], &[]);
        link(&mut graph, source, 0, sink, 0);
        let network = graph.finalize().unwrap();

        assert!(network.output_by_id(SocketId(0)).is_some());
        assert!(network.input_by_id(SocketId(0)).is_none());
        assert!(network.input_by_id(SocketId(1)).is_some());
        assert!(network.input_by_id(SocketId(2)).is_none());
        assert!(network.node_by_id(NodeId(2)).is_none());
    }

    #[test]
    fn topological_order_puts_sources_first() {
        let mut graph = BuilderGraph::new();
        let sink = graph.add_dummy(&[FLOAT], &[]);
        let a = op(&mut graph, "a", 1, 1);
        let source = graph.add_dummy(&[], &[FLOAT]);
        link(&mut graph, source, 0, a, 0);
        link(&mut graph, a, 0, sink, 0);
        let network = graph.finalize().unwrap();

        assert_eq!(
            network.topological_order().unwrap(),
            vec![source.id(), a.id(), sink.id()]
        );
    }

    #[test]
    fn to_dot_lists_every_link() {
        let mut graph = BuilderGraph::new();
        let source = graph.add_dummy(&[], &[FLOAT]);
        let sink = graph.add_dummy(&[FLOAT, FLOAT], &[]);
        link(&mut graph, source, 0, sink, 0);
        link(&mut graph, source, 0, sink, 1);
        let builder_dot = graph.to_dot();
        let network = graph.finalize().unwrap();

        let dot = network.to_dot();
        assert!(dot.contains("\"n0\":\"s0\" -> \"n1\":\"s1\"\n"));
        assert!(dot.contains("\"n0\":\"s0\" -> \"n1\":\"s2\"\n"));
        assert_eq!(dot, builder_dot);
    }

    #[test]
    fn network_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Network>();

        let mut graph = BuilderGraph::new();
        let dummy = graph.add_dummy(&[], &[FLOAT]);
        let a = op(&mut graph, "a", 1, 1);
        let target = graph.add_dummy(&[FLOAT], &[]);
        link(&mut graph, dummy, 0, a, 0);
        link(&mut graph, a, 0, target, 0);
        let seed = graph.input(target, 0).unwrap();
        let network = graph.finalize().unwrap();

        let expected = network.find_dummy_dependencies(&[seed]).unwrap();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| network.find_dummy_dependencies(&[seed]).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
