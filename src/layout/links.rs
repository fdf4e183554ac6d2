use std::collections::HashMap;

use crate::config::NodeId;
use crate::ir::{Link, Node, NodeKey, NodeRef};

use super::{Endpoints, LayoutError};

/// Indexes nodes and links, resolves link endpoints and fills each node's
/// `source_links` / `target_links` in link order.
pub(super) fn compute_node_links(
    nodes: &mut [Node],
    links: &mut [Link],
    node_id: &NodeId,
) -> Result<Vec<Endpoints>, LayoutError> {
    let mut node_by_id: HashMap<NodeKey, usize> = HashMap::with_capacity(nodes.len());
    for (idx, node) in nodes.iter_mut().enumerate() {
        node.index = idx;
        node.source_links.clear();
        node.target_links.clear();
        if let Some(key) = node_id.key(node, idx) {
            node_by_id.insert(key, idx);
        }
    }

    let mut ends = Vec::with_capacity(links.len());
    for (idx, link) in links.iter_mut().enumerate() {
        link.index = idx;
        let source = find(&node_by_id, nodes.len(), &link.source, idx)?;
        link.source = NodeRef::Resolved(source);
        let target = find(&node_by_id, nodes.len(), &link.target, idx)?;
        link.target = NodeRef::Resolved(target);
        nodes[source].source_links.push(idx);
        nodes[target].target_links.push(idx);
        ends.push(Endpoints { source, target });
    }
    Ok(ends)
}

fn find(
    node_by_id: &HashMap<NodeKey, usize>,
    node_count: usize,
    node_ref: &NodeRef,
    link: usize,
) -> Result<usize, LayoutError> {
    let found = match node_ref {
        NodeRef::Resolved(idx) => Some(*idx).filter(|idx| *idx < node_count),
        NodeRef::Unresolved(key) => node_by_id
            .get(key)
            .or_else(|| key.coerced().and_then(|key| node_by_id.get(&key)))
            .copied(),
    };
    found.ok_or_else(|| LayoutError::UnresolvedNodeReference {
        link,
        key: node_ref.key(),
    })
}

/// Endpoints of links that were already normalized by a previous layout.
///
/// Node adjacency must still agree with them: a node listing a link that no
/// longer exists, or no longer ends at that node, is reported against that
/// link with the node's position as key.
pub(super) fn resolved_ends(nodes: &[Node], links: &[Link]) -> Result<Vec<Endpoints>, LayoutError> {
    let ends = links
        .iter()
        .enumerate()
        .map(|(idx, link)| {
            let resolve = |node_ref: &NodeRef| {
                node_ref
                    .index()
                    .filter(|node| *node < nodes.len())
                    .ok_or_else(|| LayoutError::UnresolvedNodeReference {
                        link: idx,
                        key: node_ref.key(),
                    })
            };
            Ok(Endpoints {
                source: resolve(&link.source)?,
                target: resolve(&link.target)?,
            })
        })
        .collect::<Result<Vec<_>, LayoutError>>()?;

    for (idx, node) in nodes.iter().enumerate() {
        let stale = |link: usize, end: fn(&Endpoints) -> usize| {
            ends.get(link).is_none_or(|e| end(e) != idx)
        };
        let stale_link = node
            .source_links
            .iter()
            .find(|&&l| stale(l, |e| e.source))
            .or_else(|| node.target_links.iter().find(|&&l| stale(l, |e| e.target)));
        if let Some(&link) = stale_link {
            return Err(LayoutError::UnresolvedNodeReference {
                link,
                key: NodeKey::Index(idx),
            });
        }
    }
    Ok(ends)
}

/// A node's value is the larger of its outgoing and incoming totals.
pub(super) fn compute_node_values(nodes: &mut [Node], links: &[Link]) {
    for node in nodes.iter_mut() {
        let out_total: f64 = node.source_links.iter().map(|&l| links[l].value).sum();
        let in_total: f64 = node.target_links.iter().map(|&l| links[l].value).sum();
        node.value = out_total.max(in_total);
    }
}
