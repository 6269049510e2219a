//! Graphviz DOT rendering shared by the builder graph and the network.
//!
//! Each node becomes a box whose label is an HTML-like table: a bold header
//! with the node name, then one row per socket position with the input on
//! the left and the output on the right. Each socket is a table port, so
//! links attach to the exact socket they connect. Node and socket ids are
//! used as DOT identifiers (`"n3"`, `"s7"`), which keeps the output stable.

use std::borrow::Cow;
use std::fmt;

use crate::id::{NodeId, SocketId};

/// A node record ready for rendering.
pub(crate) struct DotNode<'a> {
    pub id: NodeId,
    pub title: &'a str,
    pub inputs: Vec<(SocketId, &'a str)>,
    pub outputs: Vec<(SocketId, &'a str)>,
}

/// A link record: `(node, socket)` of the origin, then of the target.
pub(crate) struct DotLink {
    pub from: (NodeId, SocketId),
    pub to: (NodeId, SocketId),
}

#[derive(Default)]
pub(crate) struct DotGraph<'a> {
    pub nodes: Vec<DotNode<'a>>,
    pub links: Vec<DotLink>,
}

impl fmt::Display for DotGraph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph Network {{")?;
        writeln!(f, "rankdir=LR")?;
        for node in &self.nodes {
            write_node(f, node)?;
            writeln!(f)?;
        }
        for link in &self.links {
            writeln!(
                f,
                "\"n{}\":\"s{}\" -> \"n{}\":\"s{}\"",
                link.from.0, link.from.1, link.to.0, link.to.1
            )?;
        }
        writeln!(f, "}}")
    }
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &DotNode<'_>) -> fmt::Result {
    write!(
        f,
        "\"n{}\" [style=\"filled\", fillcolor=\"#FFFFFF\", shape=\"box\", label=<",
        node.id
    )?;
    write!(f, "<table border=\"0\" cellspacing=\"3\">")?;
    write!(
        f,
        "<tr><td colspan=\"3\" align=\"center\"><b>{}</b></td></tr>",
        escape(node.title)
    )?;

    let rows = node.inputs.len().max(node.outputs.len());
    for row in 0..rows {
        write!(f, "<tr>")?;
        match node.inputs.get(row) {
            Some((id, name)) => write!(f, "<td align=\"left\" port=\"s{id}\">{}</td>", escape(name))?,
            None => write!(f, "<td></td>")?,
        }
        write!(f, "<td></td>")?;
        match node.outputs.get(row) {
            Some((id, name)) => write!(f, "<td align=\"right\" port=\"s{id}\">{}</td>", escape(name))?,
            None => write!(f, "<td></td>")?,
        }
        write!(f, "</tr>")?;
    }

    write!(f, "</table>>]")
}

/// Escapes text for an HTML-like label.
fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
