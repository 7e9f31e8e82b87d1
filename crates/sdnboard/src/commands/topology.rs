//! Topology command handler.
//!
//! Each `--format` is a [`GraphRenderer`] that captures its text; the
//! handler prints whatever the renderer produced.

use tabled::Tabled;

use sdnboard_core::topology::{TopologyEdge, TopologyNode};
use sdnboard_core::{Dashboard, GraphRenderer, TopologyGraph};

use crate::cli::{GlobalOpts, OutputFormat, TopologyArgs, TopologyFormat};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Kind")]
    kind: String,
}

impl From<&TopologyNode> for NodeRow {
    fn from(n: &TopologyNode) -> Self {
        Self {
            id: n.id.clone(),
            label: n.label.clone(),
            kind: n.kind.to_string(),
        }
    }
}

#[derive(Tabled)]
struct EdgeRow {
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Label")]
    label: String,
}

impl EdgeRow {
    fn new(src: &TopologyNode, dst: &TopologyNode, edge: &TopologyEdge) -> Self {
        Self {
            from: src.id.clone(),
            to: dst.id.clone(),
            kind: edge.kind.to_string(),
            label: edge.label.clone(),
        }
    }
}

/// Renders a graph into text once.
struct TextRenderer {
    format: TopologyFormat,
    compact: bool,
    rendered: Option<Result<String, CliError>>,
}

impl TextRenderer {
    fn new(format: TopologyFormat, compact: bool) -> Self {
        Self {
            format,
            compact,
            rendered: None,
        }
    }
}

impl GraphRenderer for TextRenderer {
    fn render(&mut self, graph: &TopologyGraph) {
        let text = match self.format {
            TopologyFormat::Dot => Ok(graph.to_dot()),
            TopologyFormat::Json if self.compact => {
                serde_json::to_string(graph).map_err(|e| CliError::Render(e.to_string()))
            }
            TopologyFormat::Json => {
                serde_json::to_string_pretty(graph).map_err(|e| CliError::Render(e.to_string()))
            }
            TopologyFormat::Table => Ok(render_tables(graph)),
        };
        self.rendered = Some(text);
    }
}

fn render_tables(graph: &TopologyGraph) -> String {
    let nodes: Vec<NodeRow> = graph.nodes().map(NodeRow::from).collect();
    let edges: Vec<EdgeRow> = graph
        .edges()
        .map(|(src, dst, edge)| EdgeRow::new(src, dst, edge))
        .collect();

    format!(
        "Nodes ({})\n{}\n\nLinks ({})\n{}",
        graph.node_count(),
        output::render_table(&nodes),
        graph.edge_count(),
        output::render_table(&edges),
    )
}

pub async fn handle(
    dashboard: &Dashboard,
    args: &TopologyArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let compact = matches!(global.output, OutputFormat::JsonCompact);
    let mut renderer = TextRenderer::new(args.format, compact);

    let loaded = output::with_spinner(
        "Loading topology",
        global.quiet,
        dashboard.topology().load(&mut renderer),
    )
    .await;

    match renderer.rendered {
        Some(text) if loaded => {
            output::print_output(&text?, global.quiet);
            Ok(())
        }
        _ => Err(CliError::TopologyUnavailable),
    }
}
