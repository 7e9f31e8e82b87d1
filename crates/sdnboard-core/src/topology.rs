// ── Topology graph ──
//
// Turns the controller's `/topology` document into a typed node/edge
// graph and hands it to a renderer. One fetch, one transform, one render
// per load; failures are logged and nothing is shown.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::Serialize;
use strum::Display;
use thiserror::Error;
use tracing::{debug, error, warn};

use sdnboard_api::ControllerClient;
use sdnboard_api::models::TopologyDocument;

// ── Node / edge types ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NodeKind {
    Switch,
    Host,
}

impl NodeKind {
    pub fn shape(self) -> &'static str {
        match self {
            Self::Switch => "box",
            Self::Host => "ellipse",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Switch => "#3399ff",
            Self::Host => "#66cc66",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopologyNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EdgeKind {
    /// Switch port to host; drawn without an arrow.
    HostAttachment,
    /// Switch to switch; arrow points at the destination.
    SwitchLink,
}

impl EdgeKind {
    pub fn has_arrow(self) -> bool {
        matches!(self, Self::SwitchLink)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopologyEdge {
    pub kind: EdgeKind,
    pub label: String,
    /// Port on the source switch.
    pub src_port: u32,
    /// Port on the destination switch, for inter-switch links.
    pub dst_port: Option<u32>,
}

/// Node id used for a switch.
pub fn switch_node_id(dpid: impl std::fmt::Display) -> String {
    format!("s{dpid}")
}

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),
}

// ── Graph ───────────────────────────────────────────────────────────

/// Directed graph of switches and hosts.
///
/// `index` maps the textual node ids (`s<dpid>`, host MAC) to graph
/// indices so edges can be wired without panicking on unknown ids.
#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    graph: StableDiGraph<TopologyNode, TopologyEdge>,
    index: HashMap<String, NodeIndex>,
}

impl TopologyGraph {
    /// Build a graph from the controller document.
    ///
    /// Edges naming an unknown node are dropped with a warning. A node id
    /// that appears twice is an error.
    pub fn from_document(doc: &TopologyDocument) -> Result<Self, TopologyError> {
        let mut graph = Self::default();

        for switch in &doc.switches {
            graph.add_node(TopologyNode {
                id: switch_node_id(switch.dpid),
                label: format!("Switch {}", switch.dpid),
                kind: NodeKind::Switch,
            })?;
        }

        for host in &doc.hosts {
            let label = match host.ip.as_deref() {
                Some(ip) if !ip.is_empty() => format!("{ip} ({})", host.mac),
                _ => host.mac.clone(),
            };
            graph.add_node(TopologyNode {
                id: host.mac.clone(),
                label,
                kind: NodeKind::Host,
            })?;
        }

        for host in &doc.hosts {
            graph.add_edge(
                &switch_node_id(host.dpid),
                &host.mac,
                TopologyEdge {
                    kind: EdgeKind::HostAttachment,
                    label: format!("port {}", host.port),
                    src_port: host.port,
                    dst_port: None,
                },
            );
        }

        for link in &doc.links {
            graph.add_edge(
                &switch_node_id(link.src),
                &switch_node_id(link.dst),
                TopologyEdge {
                    kind: EdgeKind::SwitchLink,
                    label: format!("({}↔{})", link.src_port, link.dst_port),
                    src_port: link.src_port,
                    dst_port: Some(link.dst_port),
                },
            );
        }

        Ok(graph)
    }

    fn add_node(&mut self, node: TopologyNode) -> Result<(), TopologyError> {
        if self.index.contains_key(&node.id) {
            return Err(TopologyError::DuplicateNode(node.id));
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        Ok(())
    }

    fn add_edge(&mut self, from: &str, to: &str, edge: TopologyEdge) {
        let (Some(&a), Some(&b)) = (self.index.get(from), self.index.get(to)) else {
            warn!(from, to, label = %edge.label, "dropping edge with unknown endpoint");
            return;
        };
        self.graph.add_edge(a, b, edge);
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, id: &str) -> Option<&TopologyNode> {
        self.index.get(id).and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Nodes in insertion order: switches first, then hosts.
    pub fn nodes(&self) -> impl Iterator<Item = &TopologyNode> {
        self.graph.node_indices().filter_map(|idx| self.graph.node_weight(idx))
    }

    /// Edges as `(source, target, edge)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&TopologyNode, &TopologyNode, &TopologyEdge)> {
        self.graph.edge_references().filter_map(|e| {
            let src = self.graph.node_weight(e.source())?;
            let dst = self.graph.node_weight(e.target())?;
            Some((src, dst, e.weight()))
        })
    }

    /// Graphviz rendering with the node shapes and colours above.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph topology {\n");
        for node in self.nodes() {
            let _ = writeln!(
                out,
                "    {:?} [label={:?}, shape={}, style=filled, fillcolor={:?}];",
                node.id,
                node.label,
                node.kind.shape(),
                node.kind.color(),
            );
        }
        for (src, dst, edge) in self.edges() {
            let dir = if edge.kind.has_arrow() { "forward" } else { "none" };
            let _ = writeln!(
                out,
                "    {:?} -> {:?} [label={:?}, dir={dir}];",
                src.id, dst.id, edge.label,
            );
        }
        out.push_str("}\n");
        out
    }
}

#[derive(Serialize)]
struct SerializedEdge<'a> {
    from: &'a str,
    to: &'a str,
    #[serde(flatten)]
    edge: &'a TopologyEdge,
}

impl Serialize for TopologyGraph {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let nodes: Vec<&TopologyNode> = self.nodes().collect();
        let edges: Vec<SerializedEdge<'_>> = self
            .edges()
            .map(|(src, dst, edge)| SerializedEdge {
                from: &src.id,
                to: &dst.id,
                edge,
            })
            .collect();

        let mut s = serializer.serialize_struct("TopologyGraph", 2)?;
        s.serialize_field("nodes", &nodes)?;
        s.serialize_field("edges", &edges)?;
        s.end()
    }
}

// ── Rendering seam ──────────────────────────────────────────────────

/// Receives the finished graph. Layout and drawing are its business.
pub trait GraphRenderer {
    fn render(&mut self, graph: &TopologyGraph);
}

/// Fetch-transform-render driver for the topology page.
pub struct TopologyView {
    client: Arc<ControllerClient>,
}

impl TopologyView {
    pub fn new(client: Arc<ControllerClient>) -> Self {
        Self { client }
    }

    /// Fetch `/topology`, build the graph and render it once.
    ///
    /// Returns whether anything was rendered. Fetch and transform errors
    /// are logged and otherwise swallowed; there is no error state.
    pub async fn load<R: GraphRenderer + ?Sized>(&self, renderer: &mut R) -> bool {
        let doc = match self.client.topology().await {
            Ok(doc) => doc,
            Err(e) => {
                error!(error = %e, "failed to fetch topology");
                return false;
            }
        };

        match TopologyGraph::from_document(&doc) {
            Ok(graph) => {
                debug!(
                    nodes = graph.node_count(),
                    edges = graph.edge_count(),
                    "rendering topology"
                );
                renderer.render(&graph);
                true
            }
            Err(e) => {
                error!(error = %e, "failed to build topology graph");
                false
            }
        }
    }
}
