//! Conversion of a [`BuilderGraph`] into an immutable [`Network`].
//!
//! The conversion runs in two passes over the builder:
//!
//! 1. **Shell pass**: allocate every node and socket of the network, copying
//!    ids, indices, types and node payloads, and record where each socket id
//!    landed in a dense `socket_by_id` table. No links are resolved yet.
//! 2. **Wiring pass**: translate every origin and every target list of the
//!    builder through `socket_by_id`.
//!
//! Splitting the work means a link never refers to a socket that has not
//! been allocated yet, whatever order the nodes are visited in. The network
//! ends up with exactly the same ids and topology as the builder.

use smallvec::SmallVec;

use crate::analysis;
use crate::arena::{Arena, Slot};
use crate::builder::{BuilderGraph, BuilderSocket};
use crate::error::NetworkError;
use crate::network::{Link, Network, Node, Socket};

/// Options for [`BuilderGraph::finalize_with`].
#[derive(Debug, Clone, Default)]
pub struct FinalizeConfig {
    /// Reject graphs whose links form a cycle. Off by default: the network
    /// itself does not need a DAG, only some execution engines do.
    pub require_acyclic: bool,
}

impl BuilderGraph {
    /// Finalizes with the default [`FinalizeConfig`].
    pub fn finalize(self) -> Result<Network, NetworkError> {
        self.finalize_with(&FinalizeConfig::default())
    }

    /// Consumes the builder and produces the finalized network.
    ///
    /// Every input socket must be linked; otherwise this fails with
    /// [`NetworkError::UnlinkedInput`] for the lowest such socket id. With
    /// `require_acyclic` set, a cycle fails with [`NetworkError::Cycle`].
    /// Handles taken from the builder remain valid on the network.
    pub fn finalize_with(self, config: &FinalizeConfig) -> Result<Network, NetworkError> {
        #[cfg(debug_assertions)]
        self.assert_consistency();

        if let Some(&unlinked) = self
            .input_sockets
            .iter()
            .find(|&&slot| self.sockets[slot].origin().is_none())
        {
            let socket = &self.sockets[unlinked];
            return Err(NetworkError::UnlinkedInput {
                input: socket.id,
                node: self.nodes[socket.node].id,
            });
        }

        if config.require_acyclic {
            analysis::topological_order(self.node_count(), self.node_links())?;
        }

        let network = convert(&self)?;

        #[cfg(debug_assertions)]
        network.assert_consistency();

        tracing::debug!(
            graph = %network.graph_id(),
            nodes = network.node_count(),
            sockets = network.socket_count(),
            links = network.link_count(),
            "finalized network"
        );
        Ok(network)
    }
}

fn convert(builder: &BuilderGraph) -> Result<Network, NetworkError> {
    let mut nodes = Arena::with_capacity(builder.node_count());
    let mut sockets = Arena::with_capacity(builder.socket_count());
    let mut node_by_id: Vec<Option<Slot<Node>>> = vec![None; builder.node_count()];
    let mut socket_by_id: Vec<Option<Slot<Socket>>> = vec![None; builder.socket_count()];
    let mut operation_nodes = Vec::with_capacity(builder.operation_nodes.len());
    let mut dummy_nodes = Vec::with_capacity(builder.dummy_nodes.len());
    let mut input_sockets = Vec::with_capacity(builder.input_sockets.len());
    let mut output_sockets = Vec::with_capacity(builder.output_sockets.len());

    // Shell pass: operation nodes, then dummy nodes.
    for &builder_slot in builder.operation_nodes.iter().chain(&builder.dummy_nodes) {
        let source = &builder.nodes[builder_slot];
        let node = nodes.alloc(Node {
            id: source.id,
            kind: source.kind.clone(),
            inputs: SmallVec::new(),
            outputs: SmallVec::new(),
        });

        for &builder_socket in &source.inputs {
            let socket = sockets.alloc(shell_socket(
                &builder.sockets[builder_socket],
                node,
                Link::Input { origin: None },
            ));
            nodes[node].inputs.push(socket);
            input_sockets.push(socket);
            socket_by_id[builder.sockets[builder_socket].id.index()] = Some(socket);
        }
        for &builder_socket in &source.outputs {
            let socket = sockets.alloc(shell_socket(
                &builder.sockets[builder_socket],
                node,
                Link::Output {
                    targets: SmallVec::new(),
                },
            ));
            nodes[node].outputs.push(socket);
            output_sockets.push(socket);
            socket_by_id[builder.sockets[builder_socket].id.index()] = Some(socket);
        }

        if source.kind.is_dummy() {
            dummy_nodes.push(node);
        } else {
            operation_nodes.push(node);
        }
        node_by_id[source.id.index()] = Some(node);
    }

    let node_by_id = dense(node_by_id, "node")?;
    let socket_by_id = dense(socket_by_id, "socket")?;

    // Wiring pass.
    for &builder_input in &builder.input_sockets {
        let source = &builder.sockets[builder_input];
        let origin = source
            .origin()
            .ok_or_else(|| NetworkError::GraphInconsistency {
                reason: format!("input socket {} has no origin", source.id),
            })?;
        let origin = socket_by_id[builder.sockets[origin].id.index()];
        sockets[socket_by_id[source.id.index()]].link = Link::Input {
            origin: Some(origin),
        };
    }
    for &builder_output in &builder.output_sockets {
        let source = &builder.sockets[builder_output];
        let targets = source
            .targets()
            .iter()
            .map(|&target| socket_by_id[builder.sockets[target].id.index()])
            .collect();
        sockets[socket_by_id[source.id.index()]].link = Link::Output { targets };
    }

    Ok(Network {
        graph: builder.graph,
        nodes,
        sockets,
        node_by_id,
        socket_by_id,
        operation_nodes,
        dummy_nodes,
        input_sockets,
        output_sockets,
        link_count: builder.link_count,
    })
}

fn shell_socket(source: &BuilderSocket, node: Slot<Node>, link: Link) -> Socket {
    Socket {
        id: source.id,
        index: source.index,
        data_type: source.data_type,
        node,
        link,
    }
}

/// Unwraps a lookup table filled by the shell pass; every id must have been
/// visited exactly once.
fn dense<T>(table: Vec<Option<Slot<T>>>, what: &str) -> Result<Vec<Slot<T>>, NetworkError> {
    table
        .into_iter()
        .enumerate()
        .map(|(id, slot)| {
            slot.ok_or_else(|| NetworkError::GraphInconsistency {
                reason: format!("{what} {id} was not copied"),
            })
        })
        .collect()
}
