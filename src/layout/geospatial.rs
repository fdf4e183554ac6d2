use std::fmt;
use std::sync::Arc;

use crate::config::LayoutConfig;
use crate::ir::{Link, Node};

/// Bounds a [`Positioner`] assigns to a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBounds {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// Smallest and largest node value in the graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

/// Supplies node geometry directly, e.g. from projected map coordinates.
/// The node arrives with its value and normalized `x1` / `y1` already set.
pub trait Positioner {
    fn position(&self, node: &Node) -> NodeBounds;
}

impl<F> Positioner for F
where
    F: Fn(&Node) -> NodeBounds,
{
    fn position(&self, node: &Node) -> NodeBounds {
        self(node)
    }
}

pub trait HeightNormalizer {
    fn normalize(&self, range: ValueRange, node: &Node) -> f64;
}

impl<F> HeightNormalizer for F
where
    F: Fn(ValueRange, &Node) -> f64,
{
    fn normalize(&self, range: ValueRange, node: &Node) -> f64 {
        self(range, node)
    }
}

pub trait WidthNormalizer {
    fn normalize(&self, node: &Node) -> f64;
}

impl<F> WidthNormalizer for F
where
    F: Fn(&Node) -> f64,
{
    fn normalize(&self, node: &Node) -> f64 {
        self(node)
    }
}

/// Maps node values linearly onto `[min, max]` pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearHeightNormalizer {
    pub min: f64,
    pub max: f64,
}

impl Default for LinearHeightNormalizer {
    fn default() -> Self {
        Self {
            min: 10.0,
            max: 100.0,
        }
    }
}

impl HeightNormalizer for LinearHeightNormalizer {
    fn normalize(&self, range: ValueRange, node: &Node) -> f64 {
        LinearScale::new((range.min, range.max), (self.min, self.max)).apply(node.value)
    }
}

/// Linear map from `domain` onto `range`. A collapsed domain maps every input
/// to the middle of the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span != 0.0 && !span.is_nan() {
            (value - d0) / span
        } else {
            0.5
        };
        r0 + (r1 - r0) * t
    }
}

/// Geometry strategies that replace layering, relaxation and collision
/// resolution.
#[derive(Clone)]
pub struct Positioning {
    positioner: Arc<dyn Positioner + Send + Sync>,
    height_normalizer: Option<Arc<dyn HeightNormalizer + Send + Sync>>,
    width_normalizer: Option<Arc<dyn WidthNormalizer + Send + Sync>>,
}

impl Positioning {
    pub fn new(positioner: impl Positioner + Send + Sync + 'static) -> Self {
        Self {
            positioner: Arc::new(positioner),
            height_normalizer: None,
            width_normalizer: None,
        }
    }

    pub fn with_height_normalizer(
        mut self,
        normalizer: impl HeightNormalizer + Send + Sync + 'static,
    ) -> Self {
        self.height_normalizer = Some(Arc::new(normalizer));
        self
    }

    pub fn with_width_normalizer(
        mut self,
        normalizer: impl WidthNormalizer + Send + Sync + 'static,
    ) -> Self {
        self.width_normalizer = Some(Arc::new(normalizer));
        self
    }

    /// Positions every node, then sets link widths from a scale mapping the
    /// observed link values onto the observed node heights.
    pub(super) fn apply(&self, nodes: &mut [Node], links: &mut [Link], config: &LayoutConfig) {
        let Some(values) = min_max(nodes.iter().map(|node| node.value)) else {
            return;
        };
        let range = ValueRange {
            min: values.0,
            max: values.1,
        };
        for node in nodes.iter_mut() {
            node.depth = 0;
            node.height = 0;
            node.x0 = 0.0;
            node.y0 = 0.0;
            node.x1 = match &self.width_normalizer {
                Some(normalizer) => normalizer.normalize(node),
                None => config.node_width,
            };
            node.y1 = match &self.height_normalizer {
                Some(normalizer) => normalizer.normalize(range, node),
                None => 1.0,
            };
            let bounds = self.positioner.position(node);
            node.x0 = bounds.x0;
            node.y0 = bounds.y0;
            node.x1 = bounds.x1;
            node.y1 = bounds.y1;
        }

        let Some(heights) = min_max(nodes.iter().map(|node| node.y1 - node.y0)) else {
            return;
        };
        let Some(link_values) = min_max(links.iter().map(|link| link.value)) else {
            return;
        };
        let scale = LinearScale::new(link_values, heights);
        tracing::debug!(?scale, "sankey geospatial link scale");
        for link in links.iter_mut() {
            link.width = scale.apply(link.value);
        }
    }
}

impl fmt::Debug for Positioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Positioning")
            .field("height_normalizer", &self.height_normalizer.is_some())
            .field("width_normalizer", &self.width_normalizer.is_some())
            .finish_non_exhaustive()
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
