use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ir::{Link, Node};

use super::Endpoints;

/// Read-only view handed to alignment strategies.
pub struct AlignContext<'a> {
    pub nodes: &'a [Node],
    pub links: &'a [Link],
    pub(crate) ends: &'a [Endpoints],
    /// Number of columns produced by layering.
    pub columns: usize,
}

impl AlignContext<'_> {
    pub fn target_of(&self, link: usize) -> &Node {
        &self.nodes[self.ends[link].target]
    }

    pub fn source_of(&self, link: usize) -> &Node {
        &self.nodes[self.ends[link].source]
    }
}

pub type AlignFn = Arc<dyn Fn(&Node, &AlignContext<'_>) -> f64 + Send + Sync>;

/// Column assignment strategy. The result is floored and clamped to
/// `0..columns` by the caller.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Right,
    Center,
    #[default]
    Justify,
    #[serde(skip)]
    Custom(AlignFn),
}

impl Align {
    pub fn custom(f: impl Fn(&Node, &AlignContext<'_>) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub fn column(&self, node: &Node, ctx: &AlignContext<'_>) -> f64 {
        match self {
            Self::Left => node.depth as f64,
            Self::Right => ctx.columns as f64 - 1.0 - node.height as f64,
            Self::Justify => {
                if node.source_links.is_empty() {
                    ctx.columns as f64 - 1.0
                } else {
                    node.depth as f64
                }
            }
            Self::Center => {
                if !node.target_links.is_empty() {
                    node.depth as f64
                } else if !node.source_links.is_empty() {
                    let min_target = node
                        .source_links
                        .iter()
                        .map(|&link| ctx.target_of(link).depth)
                        .min()
                        .unwrap_or(0);
                    min_target as f64 - 1.0
                } else {
                    0.0
                }
            }
            Self::Custom(f) => f(node, ctx),
        }
    }
}

impl fmt::Debug for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("Left"),
            Self::Right => f.write_str("Right"),
            Self::Center => f.write_str("Center"),
            Self::Justify => f.write_str("Justify"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> (Vec<Node>, Vec<Link>, Vec<Endpoints>) {
        // a -> b -> d, c -> d
        let mut nodes: Vec<Node> = (0..4).map(|_| Node::new()).collect();
        let ends = vec![
            Endpoints { source: 0, target: 1 },
            Endpoints { source: 1, target: 3 },
            Endpoints { source: 2, target: 3 },
        ];
        for (idx, end) in ends.iter().enumerate() {
            nodes[end.source].source_links.push(idx);
            nodes[end.target].target_links.push(idx);
        }
        for (node, (depth, height)) in nodes.iter_mut().zip([(0, 2), (1, 1), (0, 1), (2, 0)]) {
            node.depth = depth;
            node.height = height;
        }
        (nodes, Vec::new(), ends)
    }

    fn columns_for(align: &Align) -> Vec<f64> {
        let (nodes, links, ends) = graph();
        let ctx = AlignContext {
            nodes: &nodes,
            links: &links,
            ends: &ends,
            columns: 3,
        };
        nodes.iter().map(|node| align.column(node, &ctx)).collect()
    }

    #[test]
    fn builtin_strategies() {
        assert_eq!(columns_for(&Align::Left), vec![0.0, 1.0, 0.0, 2.0]);
        assert_eq!(columns_for(&Align::Right), vec![0.0, 1.0, 1.0, 2.0]);
        assert_eq!(columns_for(&Align::Justify), vec![0.0, 1.0, 0.0, 2.0]);
        assert_eq!(columns_for(&Align::Center), vec![0.0, 1.0, 1.0, 2.0]);
    }

    #[test]
    fn custom_strategy_sees_column_count() {
        let align = Align::custom(|_, ctx| ctx.columns as f64 / 2.0);
        assert_eq!(columns_for(&align), vec![1.5; 4]);
    }

    #[test]
    fn deserializes_lowercase_names() {
        let align: Align = serde_json::from_str("\"center\"").unwrap();
        assert!(matches!(align, Align::Center));
    }
}
