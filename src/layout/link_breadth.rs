use crate::config::LinkStacking;
use crate::ir::{Link, Node};

use super::Endpoints;

/// Orders each node's links by the vertical position of the node at their
/// other end, then assigns the link anchors `y0` (source side) and `y1`
/// (target side).
pub(super) fn compute_link_breadths(
    nodes: &mut [Node],
    links: &mut [Link],
    ends: &[Endpoints],
    stacking: LinkStacking,
) {
    let breadth: Vec<f64> = nodes.iter().map(|node| node.y0).collect();
    let by_breadth = |a: usize, b: usize, other: &dyn Fn(usize) -> usize| {
        breadth[other(a)]
            .total_cmp(&breadth[other(b)])
            .then_with(|| links[a].index.cmp(&links[b].index))
    };
    for node in nodes.iter_mut() {
        node.source_links
            .sort_by(|&a, &b| by_breadth(a, b, &|l: usize| ends[l].target));
        node.target_links
            .sort_by(|&a, &b| by_breadth(a, b, &|l: usize| ends[l].source));
    }

    for node in nodes.iter() {
        match stacking {
            LinkStacking::Shared => {
                let base = node.y1 + node.y0 / 2.0;
                for &l in &node.source_links {
                    links[l].y0 = base + links[l].width / 2.0;
                }
                for &l in &node.target_links {
                    links[l].y1 = base + links[l].width / 2.0;
                }
            }
            LinkStacking::Cumulative => {
                let mut y = node.y0;
                for &l in &node.source_links {
                    links[l].y0 = y + links[l].width / 2.0;
                    y += links[l].width;
                }
                let mut y = node.y0;
                for &l in &node.target_links {
                    links[l].y1 = y + links[l].width / 2.0;
                    y += links[l].width;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeId;
    use crate::layout::links::compute_node_links;

    /// Source 0 fans out to sinks 1 (low), 2 (high) and again to 1.
    fn fan_out() -> (Vec<Node>, Vec<Link>, Vec<Endpoints>) {
        let mut nodes: Vec<Node> = (0..3).map(|_| Node::new()).collect();
        let mut links = vec![
            Link::new(0usize, 1usize, 2.0),
            Link::new(0usize, 2usize, 4.0),
            Link::new(0usize, 1usize, 6.0),
        ];
        let ends = compute_node_links(&mut nodes, &mut links, &NodeId::Index).unwrap();
        for (node, (y0, y1)) in nodes.iter_mut().zip([(10.0, 22.0), (40.0, 48.0), (0.0, 4.0)]) {
            node.y0 = y0;
            node.y1 = y1;
        }
        for link in &mut links {
            link.width = link.value;
        }
        (nodes, links, ends)
    }

    #[test]
    fn links_sorted_by_neighbor_breadth_then_index() {
        let (mut nodes, mut links, ends) = fan_out();
        compute_link_breadths(&mut nodes, &mut links, &ends, LinkStacking::Shared);
        assert_eq!(nodes[0].source_links, vec![1, 0, 2]);
        assert_eq!(nodes[1].target_links, vec![0, 2]);
    }

    #[test]
    fn shared_anchor_reuses_node_base() {
        let (mut nodes, mut links, ends) = fan_out();
        compute_link_breadths(&mut nodes, &mut links, &ends, LinkStacking::Shared);
        // base at the source is 22 + 10 / 2
        let y0: Vec<f64> = links.iter().map(|l| l.y0).collect();
        assert_eq!(y0, vec![28.0, 29.0, 30.0]);
        // base at sink 1 is 48 + 40 / 2
        assert_eq!(links[0].y1, 69.0);
        assert_eq!(links[2].y1, 71.0);
        assert_eq!(links[1].y1, 6.0);
    }

    #[test]
    fn cumulative_anchor_stacks_links() {
        let (mut nodes, mut links, ends) = fan_out();
        compute_link_breadths(&mut nodes, &mut links, &ends, LinkStacking::Cumulative);
        let y0: Vec<f64> = links.iter().map(|l| l.y0).collect();
        // order 1, 0, 2 with widths 4, 2, 6 from y0 = 10
        assert_eq!(y0, vec![15.0, 12.0, 19.0]);
        assert_eq!(links[0].y1, 41.0);
        assert_eq!(links[2].y1, 45.0);
    }
}
