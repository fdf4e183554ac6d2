use crate::config::LayoutConfig;
use crate::ir::{Link, Node};

use super::align::AlignContext;
use super::Endpoints;

/// Assigns `depth` (forward layer) and `height` (backward layer) to every
/// node, then places nodes horizontally. Returns the column count.
pub(super) fn compute_node_depths(
    nodes: &mut [Node],
    links: &[Link],
    ends: &[Endpoints],
    config: &LayoutConfig,
) -> usize {
    let columns = assign_layers(nodes, ends, Direction::Forward);
    assign_layers(nodes, ends, Direction::Backward);

    let extent = &config.extent;
    let kx = if columns > 1 {
        (extent.width() - config.node_width) / (columns - 1) as f64
    } else {
        0.0
    };
    let last_column = columns.saturating_sub(1) as f64;

    let placements: Vec<f64> = {
        let ctx = AlignContext {
            nodes: &*nodes,
            links,
            ends,
            columns,
        };
        nodes
            .iter()
            .map(|node| config.align.column(node, &ctx).floor().min(last_column).max(0.0))
            .collect()
    };
    for (node, column) in nodes.iter_mut().zip(placements) {
        node.x0 = extent.x0 + column * kx;
        node.x1 = node.x0 + config.node_width;
    }
    columns
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Breadth-first layering from every node at once. A node reached again in a
/// later frontier is overwritten, so on acyclic input each node ends on its
/// longest path. Cyclic input is cut off after `nodes.len()` layers.
fn assign_layers(nodes: &mut [Node], ends: &[Endpoints], direction: Direction) -> usize {
    let mut frontier: Vec<usize> = (0..nodes.len()).collect();
    let mut queued = vec![false; nodes.len()];
    let mut layer = 0usize;
    while !frontier.is_empty() {
        if layer > nodes.len() {
            tracing::warn!(
                ?direction,
                layers = layer,
                "sankey graph contains a cycle; layering truncated"
            );
            break;
        }
        let mut next = Vec::new();
        for &idx in &frontier {
            let node = &mut nodes[idx];
            let outgoing = match direction {
                Direction::Forward => {
                    node.depth = layer;
                    &node.source_links
                }
                Direction::Backward => {
                    node.height = layer;
                    &node.target_links
                }
            };
            for &link in outgoing {
                let neighbor = match direction {
                    Direction::Forward => ends[link].target,
                    Direction::Backward => ends[link].source,
                };
                if !queued[neighbor] {
                    queued[neighbor] = true;
                    next.push(neighbor);
                }
            }
        }
        for &idx in &next {
            queued[idx] = false;
        }
        frontier = next;
        layer += 1;
    }
    layer
}
