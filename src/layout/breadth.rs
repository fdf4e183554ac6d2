use crate::config::LayoutConfig;
use crate::ir::{Link, Node};

use super::collision::resolve_collisions;
use super::Endpoints;

const ALPHA_DECAY: f64 = 0.99;

/// Groups node indices by `x0`, columns ascending, nodes in input order.
pub(super) fn compute_columns(nodes: &[Node]) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| nodes[a].x0.total_cmp(&nodes[b].x0));

    let mut columns: Vec<Vec<usize>> = Vec::new();
    let mut current_x = None;
    for idx in order {
        let x0 = nodes[idx].x0;
        match (current_x, columns.last_mut()) {
            (Some(x), Some(column)) if x == x0 => column.push(idx),
            _ => {
                columns.push(vec![idx]);
                current_x = Some(x0);
            }
        }
    }
    columns
}

/// Global value-to-pixel scale: the tightest column decides, so every column
/// fits and magnitudes stay comparable across the diagram.
pub(super) fn compute_ky(nodes: &[Node], columns: &[Vec<usize>], config: &LayoutConfig) -> f64 {
    let available = config.extent.height();
    let ky = columns
        .iter()
        .map(|column| {
            let total: f64 = column.iter().map(|&idx| nodes[idx].value).sum();
            (available - (column.len() as f64 - 1.0) * config.node_padding) / total
        })
        .filter(|ky| !ky.is_nan())
        .fold(f64::INFINITY, f64::min);
    if ky.is_finite() { ky } else { 0.0 }
}

/// Seeds vertical bands and link widths, then alternates relaxation and
/// collision resolution for the configured number of iterations.
pub(super) fn compute_node_breadths(
    nodes: &mut [Node],
    links: &mut [Link],
    ends: &[Endpoints],
    config: &LayoutConfig,
) {
    let mut columns = compute_columns(nodes);
    let ky = compute_ky(nodes, &columns, config);
    tracing::debug!(columns = columns.len(), ky, "sankey breadth scale");

    for column in &columns {
        for (position, &idx) in column.iter().enumerate() {
            let node = &mut nodes[idx];
            node.y0 = position as f64;
            node.y1 = node.y0 + node.value * ky;
        }
    }
    for link in links.iter_mut() {
        link.width = link.value * ky;
    }

    let extent = &config.extent;
    let padding = config.node_padding;
    resolve_collisions(nodes, &mut columns, extent, padding);
    let mut alpha = 1.0;
    for iteration in 0..config.iterations {
        alpha *= ALPHA_DECAY;
        relax_right_to_left(nodes, links, ends, &columns, alpha);
        resolve_collisions(nodes, &mut columns, extent, padding);
        relax_left_to_right(nodes, links, ends, &columns, alpha);
        resolve_collisions(nodes, &mut columns, extent, padding);
        tracing::trace!(iteration, alpha, "sankey relaxation pass");
    }
}

/// Moves each node toward the value-weighted center of its targets.
fn relax_right_to_left(
    nodes: &mut [Node],
    links: &[Link],
    ends: &[Endpoints],
    columns: &[Vec<usize>],
    alpha: f64,
) {
    for column in columns.iter().rev() {
        for &idx in column {
            let node = &nodes[idx];
            let Some(center) = weighted_center(nodes, links, &node.source_links, |l| ends[l].target)
            else {
                continue;
            };
            let dy = (center - node.center()) * alpha;
            nodes[idx].shift(dy);
        }
    }
}

/// Moves each node toward the value-weighted center of its sources.
fn relax_left_to_right(
    nodes: &mut [Node],
    links: &[Link],
    ends: &[Endpoints],
    columns: &[Vec<usize>],
    alpha: f64,
) {
    for column in columns {
        for &idx in column {
            let node = &nodes[idx];
            let Some(center) = weighted_center(nodes, links, &node.target_links, |l| ends[l].source)
            else {
                continue;
            };
            let dy = (center - node.center()) * alpha;
            nodes[idx].shift(dy);
        }
    }
}

/// `None` for nodes without links on that side, or whose links carry no
/// weight.
fn weighted_center(
    nodes: &[Node],
    links: &[Link],
    node_links: &[usize],
    neighbor: impl Fn(usize) -> usize,
) -> Option<f64> {
    if node_links.is_empty() {
        return None;
    }
    let mut weighted = 0.0;
    let mut total = 0.0;
    for &link in node_links {
        let value = links[link].value;
        weighted += nodes[neighbor(link)].center() * value;
        total += value;
    }
    (total != 0.0).then(|| weighted / total)
}
