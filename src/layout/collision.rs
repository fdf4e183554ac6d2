use crate::config::Extent;
use crate::ir::Node;

/// Removes overlap within each column and pulls columns back inside the
/// extent. Each column is re-sorted by `y0`.
///
/// When a column's bands plus padding are taller than the extent the final
/// upward sweep leaves nodes overlapping or above `extent.y0`.
pub(super) fn resolve_collisions(
    nodes: &mut [Node],
    columns: &mut [Vec<usize>],
    extent: &Extent,
    padding: f64,
) {
    for column in columns.iter_mut() {
        resolve_column(nodes, column, extent, padding);
    }
}

fn resolve_column(nodes: &mut [Node], column: &mut [usize], extent: &Extent, padding: f64) {
    if column.is_empty() {
        return;
    }
    column.sort_by(|&a, &b| nodes[a].y0.total_cmp(&nodes[b].y0));

    // Push overlapping nodes down.
    let mut y = extent.y0;
    for &idx in column.iter() {
        let node = &mut nodes[idx];
        let dy = y - node.y0;
        if dy > 0.0 {
            node.shift(dy);
        }
        y = node.y1 + padding;
    }

    // If the bottom node went past the extent, push it back up and cascade.
    let bottom = column[column.len() - 1];
    let dy = y - padding - extent.y1;
    if dy > 0.0 {
        nodes[bottom].shift(-dy);
        let mut y = nodes[bottom].y0;
        for &idx in column.iter().rev().skip(1) {
            let node = &mut nodes[idx];
            let dy = node.y1 + padding - y;
            if dy > 0.0 {
                node.shift(-dy);
            }
            y = node.y0;
        }
    }
}
