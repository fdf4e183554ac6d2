pub mod align;
mod breadth;
mod collision;
mod depth;
mod error;
pub mod geospatial;
mod link_breadth;
mod links;

use crate::config::LayoutConfig;
use crate::ir::{Graph, Link, Node, SankeyGraph};

pub use align::{Align, AlignContext};
pub use error::LayoutError;
pub use geospatial::{
    HeightNormalizer, LinearHeightNormalizer, LinearScale, NodeBounds, Positioner, Positioning,
    ValueRange, WidthNormalizer,
};

use breadth::compute_node_breadths;
use depth::compute_node_depths;
use link_breadth::compute_link_breadths;
use links::{compute_node_links, compute_node_values, resolved_ends};

/// Resolved source and target node of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Endpoints {
    pub(crate) source: usize,
    pub(crate) target: usize,
}

/// Sankey layout generator: an immutable configuration plus an optional
/// positioning strategy, applied to graphs in place.
#[derive(Debug, Clone, Default)]
pub struct Sankey {
    config: LayoutConfig,
    positioning: Option<Positioning>,
}

impl Sankey {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            positioning: None,
        }
    }

    pub fn with_positioning(mut self, positioning: Positioning) -> Self {
        self.positioning = Some(positioning);
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Runs the full pipeline on `graph` in place.
    ///
    /// On an unresolved link endpoint the call fails; nodes and the links
    /// before the failing one keep whatever normalization already wrote.
    pub fn layout<'g, G>(&self, graph: &'g mut G) -> Result<&'g mut G, LayoutError>
    where
        G: SankeyGraph + ?Sized,
    {
        let (nodes, links) = graph.parts_mut();
        self.layout_parts(nodes, links)?;
        Ok(graph)
    }

    /// Lays out a copy of `graph`, leaving the input untouched.
    pub fn layout_cloned<G>(&self, graph: &G) -> Result<G, LayoutError>
    where
        G: SankeyGraph + Clone,
    {
        let mut copy = graph.clone();
        self.layout(&mut copy)?;
        Ok(copy)
    }

    /// Recomputes link order and anchors only. Node bounds and link widths
    /// must come from a previous layout.
    pub fn update<'g, G>(&self, graph: &'g mut G) -> Result<&'g mut G, LayoutError>
    where
        G: SankeyGraph + ?Sized,
    {
        let (nodes, links) = graph.parts_mut();
        let ends = resolved_ends(nodes, links)?;
        compute_link_breadths(nodes, links, &ends, self.config.link_stacking);
        Ok(graph)
    }

    fn layout_parts(&self, nodes: &mut [Node], links: &mut [Link]) -> Result<(), LayoutError> {
        tracing::debug!(
            nodes = nodes.len(),
            links = links.len(),
            positioned = self.positioning.is_some(),
            "sankey layout"
        );
        let ends = compute_node_links(nodes, links, &self.config.node_id)?;
        compute_node_values(nodes, links);
        match &self.positioning {
            Some(positioning) => positioning.apply(nodes, links, &self.config),
            None => {
                let columns = compute_node_depths(nodes, links, &ends, &self.config);
                tracing::debug!(columns, "sankey columns assigned");
                compute_node_breadths(nodes, links, &ends, &self.config);
            }
        }
        compute_link_breadths(nodes, links, &ends, self.config.link_stacking);
        Ok(())
    }
}

/// Lays out `graph` in place with the default (column) placement.
pub fn compute_layout(graph: &mut Graph, config: &LayoutConfig) -> Result<(), LayoutError> {
    Sankey::new(config.clone()).layout(graph)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Extent, LinkStacking, NodeId};
    use crate::ir::{NodeKey, NodeRef};

    fn chain() -> Graph {
        let mut graph = Graph::new();
        for name in ["A", "B", "C"] {
            graph.add_node(Node::named(name));
        }
        graph.add_link(0usize, 1usize, 10.0);
        graph.add_link(1usize, 2usize, 10.0);
        graph
    }

    fn scenario_config() -> LayoutConfig {
        LayoutConfig::default()
            .with_extent(Extent::new(0.0, 0.0, 100.0, 100.0))
            .with_node_width(10.0)
            .with_node_padding(0.0)
    }

    #[test]
    fn three_node_chain_fills_extent() {
        let mut graph = chain();
        compute_layout(&mut graph, &scenario_config()).unwrap();
        let x0: Vec<f64> = graph.nodes.iter().map(|n| n.x0).collect();
        assert_eq!(x0, vec![0.0, 45.0, 90.0]);
        for node in &graph.nodes {
            assert_eq!(node.x1 - node.x0, 10.0);
            assert_eq!((node.y0, node.y1), (0.0, 100.0));
            assert_eq!(node.value, 10.0);
        }
        for link in &graph.links {
            assert_eq!(link.width, 100.0);
        }
        // Shared anchor: y1 + y0 / 2 + width / 2
        assert_eq!(graph.links[0].y0, 150.0);
        assert_eq!(graph.links[0].y1, 150.0);
    }

    #[test]
    fn cumulative_stacking_anchors_inside_band() {
        let mut graph = chain();
        let config = scenario_config().with_link_stacking(LinkStacking::Cumulative);
        Sankey::new(config).layout(&mut graph).unwrap();
        assert_eq!(graph.links[0].y0, 50.0);
        assert_eq!(graph.links[1].y1, 50.0);
    }

    #[test]
    fn missing_reference_aborts_layout() {
        let mut graph = chain();
        graph.add_link(2usize, 9usize, 1.0);
        let err = compute_layout(&mut graph, &scenario_config()).unwrap_err();
        assert_eq!(
            err,
            LayoutError::UnresolvedNodeReference {
                link: 2,
                key: NodeKey::Index(9)
            }
        );
        assert!(err.to_string().contains("missing: 9"));
        // Geometry was never computed.
        assert!(graph.nodes.iter().all(|n| n.x1 == 0.0 && n.y1 == 0.0));
    }

    #[test]
    fn named_ids_resolve_through_field() {
        let mut graph = Graph::new();
        graph.add_node(Node::named("coal"));
        graph.add_node(Node::named("power"));
        graph.add_link("coal", "power", 4.0);
        let config = scenario_config().with_node_id(NodeId::Field("name".into()));
        Sankey::new(config).layout(&mut graph).unwrap();
        assert_eq!(graph.links[0].source, NodeRef::Resolved(0));
        assert_eq!(graph.nodes[1].x0, 90.0);
    }

    #[test]
    fn update_is_idempotent() {
        let mut graph = chain();
        let sankey = Sankey::new(scenario_config());
        sankey.layout(&mut graph).unwrap();
        sankey.update(&mut graph).unwrap();
        let first: Vec<(f64, f64)> = graph.links.iter().map(|l| (l.y0, l.y1)).collect();
        sankey.update(&mut graph).unwrap();
        let second: Vec<(f64, f64)> = graph.links.iter().map(|l| (l.y0, l.y1)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn update_requires_resolved_links() {
        let mut graph = chain();
        let err = Sankey::default().update(&mut graph).unwrap_err();
        assert!(matches!(err, LayoutError::UnresolvedNodeReference { link: 0, .. }));
    }

    #[test]
    fn reloaded_graph_stays_resolved() {
        let mut graph = chain();
        let sankey = Sankey::new(scenario_config());
        sankey.layout(&mut graph).unwrap();

        let json = serde_json::to_string(&graph).unwrap();
        let mut reloaded = Graph::from_json(&json).unwrap();
        assert_eq!(reloaded.links[0].source, NodeRef::Resolved(0));
        sankey.update(&mut reloaded).unwrap();
        assert_eq!(reloaded, graph);

        let by_name = Sankey::new(scenario_config().with_node_id(NodeId::Field("name".into())));
        by_name.layout(&mut reloaded).unwrap();
        assert_eq!(reloaded.nodes[2].x0, 90.0);
        assert_eq!(reloaded.links[1].target, NodeRef::Resolved(2));
    }

    #[test]
    fn update_after_dropping_links_fails() {
        let mut graph = chain();
        let sankey = Sankey::new(scenario_config());
        sankey.layout(&mut graph).unwrap();
        graph.links.clear();
        let err = sankey.update(&mut graph).unwrap_err();
        assert_eq!(
            err,
            LayoutError::UnresolvedNodeReference {
                link: 0,
                key: NodeKey::Index(0)
            }
        );
    }

    #[test]
    fn layout_cloned_leaves_input_untouched() {
        let graph = chain();
        let laid_out = Sankey::new(scenario_config()).layout_cloned(&graph).unwrap();
        assert_eq!(graph, chain());
        assert_eq!(laid_out.nodes[2].x0, 90.0);
    }

    #[test]
    fn tuple_accessor_is_laid_out() {
        let mut parts = (
            vec![Node::new(), Node::new()],
            vec![Link::new(0usize, 1usize, 2.0)],
        );
        Sankey::new(scenario_config()).layout(&mut parts).unwrap();
        assert_eq!(parts.0[1].x0, 90.0);
        assert_eq!(parts.1[0].width, 100.0);
    }

    #[test]
    fn positioning_bypasses_columns() {
        let mut graph = chain();
        let positioning = Positioning::new(|node: &Node| NodeBounds {
            x0: node.index as f64 * 7.0,
            y0: 3.0,
            x1: node.index as f64 * 7.0 + node.x1,
            y1: 3.0 + node.y1,
        })
        .with_height_normalizer(LinearHeightNormalizer::default());
        Sankey::new(scenario_config())
            .with_positioning(positioning)
            .layout(&mut graph)
            .unwrap();
        let x0: Vec<f64> = graph.nodes.iter().map(|n| n.x0).collect();
        assert_eq!(x0, vec![0.0, 7.0, 14.0]);
        // All values equal: heights collapse to the midpoint of 10..100.
        assert!(graph.nodes.iter().all(|n| n.y1 - n.y0 == 55.0));
        assert!(graph.links.iter().all(|l| l.width == 55.0));
        assert!(graph.nodes.iter().all(|n| n.depth == 0));
    }
}
