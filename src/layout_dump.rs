use crate::ir::Graph;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f64,
    pub height: f64,
    pub columns: Vec<ColumnDump>,
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
}

#[derive(Debug, Serialize)]
pub struct ColumnDump {
    pub x0: f64,
    pub nodes: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub index: usize,
    pub name: Option<String>,
    pub depth: usize,
    pub height: usize,
    pub value: f64,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub source_links: Vec<usize>,
    pub target_links: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct LinkDump {
    pub index: usize,
    pub source: Option<usize>,
    pub target: Option<usize>,
    pub value: f64,
    pub width: f64,
    pub y0: f64,
    pub y1: f64,
}

impl LayoutDump {
    pub fn from_graph(graph: &Graph) -> Self {
        let nodes: Vec<NodeDump> = graph
            .nodes
            .iter()
            .map(|node| NodeDump {
                index: node.index,
                name: node
                    .data
                    .get("name")
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
                depth: node.depth,
                height: node.height,
                value: node.value,
                x0: node.x0,
                y0: node.y0,
                x1: node.x1,
                y1: node.y1,
                source_links: node.source_links.clone(),
                target_links: node.target_links.clone(),
            })
            .collect();

        let links = graph
            .links
            .iter()
            .map(|link| LinkDump {
                index: link.index,
                source: link.source.index(),
                target: link.target.index(),
                value: link.value,
                width: link.width,
                y0: link.y0,
                y1: link.y1,
            })
            .collect();

        let mut columns: Vec<ColumnDump> = Vec::new();
        let mut by_x: Vec<&NodeDump> = nodes.iter().collect();
        by_x.sort_by(|a, b| a.x0.total_cmp(&b.x0));
        for node in by_x {
            match columns.last_mut() {
                Some(column) if column.x0 == node.x0 => column.nodes.push(node.index),
                _ => columns.push(ColumnDump {
                    x0: node.x0,
                    nodes: vec![node.index],
                }),
            }
        }

        let width = nodes.iter().map(|n| n.x1).fold(0.0, f64::max);
        let height = nodes.iter().map(|n| n.y1).fold(0.0, f64::max);

        LayoutDump {
            width,
            height,
            columns,
            nodes,
            links,
        }
    }
}

pub fn write_layout_dump(path: &Path, graph: &Graph) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_graph(graph);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
