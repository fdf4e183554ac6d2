use crate::ir::{Node, NodeKey};
use crate::layout::align::Align;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

pub type NodeIdFn = Arc<dyn Fn(&Node) -> Option<NodeKey> + Send + Sync>;

/// How a node's id is derived when links name their endpoints by key.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeId {
    /// Position in the node sequence.
    #[default]
    Index,
    /// A field of the node's caller data, string or non-negative integer.
    Field(String),
    #[serde(skip)]
    Custom(NodeIdFn),
}

impl NodeId {
    pub fn custom(f: impl Fn(&Node) -> Option<NodeKey> + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub fn key(&self, node: &Node, position: usize) -> Option<NodeKey> {
        match self {
            Self::Index => Some(NodeKey::Index(position)),
            Self::Field(field) => node.data.get(field).and_then(NodeKey::from_value),
            Self::Custom(f) => f(node),
        }
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => f.write_str("Index"),
            Self::Field(field) => f.debug_tuple("Field").field(field).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Anchors of multiple links leaving (or entering) the same node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkStacking {
    /// Every link at a node shares the base anchor `y1 + y0 / 2`, offset by
    /// half its own width. Matches historical output exactly.
    #[default]
    Shared,
    /// Links stack top-down from the node's `y0`, each advancing the offset
    /// by its width.
    Cumulative,
}

/// Rectangle the diagram is laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f64; 2]; 2]", into = "[[f64; 2]; 2]")]
pub struct Extent {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Extent {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::from_size(1.0, 1.0)
    }
}

impl From<[[f64; 2]; 2]> for Extent {
    fn from([[x0, y0], [x1, y1]]: [[f64; 2]; 2]) -> Self {
        Self::new(x0, y0, x1, y1)
    }
}

impl From<Extent> for [[f64; 2]; 2] {
    fn from(extent: Extent) -> Self {
        [[extent.x0, extent.y0], [extent.x1, extent.y1]]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_padding: f64,
    pub extent: Extent,
    pub iterations: usize,
    pub align: Align,
    pub node_id: NodeId,
    pub link_stacking: LinkStacking,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 24.0,
            node_padding: 8.0,
            extent: Extent::default(),
            iterations: 32,
            align: Align::Justify,
            node_id: NodeId::Index,
            link_stacking: LinkStacking::Shared,
        }
    }
}

impl LayoutConfig {
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.extent = Extent::from_size(width, height);
        self
    }

    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_node_width(mut self, node_width: f64) -> Self {
        self.node_width = node_width;
        self
    }

    pub fn with_node_padding(mut self, node_padding: f64) -> Self {
        self.node_padding = node_padding;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_node_id(mut self, node_id: NodeId) -> Self {
        self.node_id = node_id;
        self
    }

    pub fn with_link_stacking(mut self, link_stacking: LinkStacking) -> Self {
        self.link_stacking = link_stacking;
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    node_width: Option<f64>,
    node_padding: Option<f64>,
    size: Option<[f64; 2]>,
    extent: Option<Extent>,
    iterations: Option<usize>,
    node_align: Option<Align>,
    node_id: Option<NodeId>,
    link_stacking: Option<LinkStacking>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let mut config = LayoutConfig::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;
    apply_config_file(&mut config, parsed);
    Ok(config)
}

fn apply_config_file(config: &mut LayoutConfig, parsed: ConfigFile) {
    if let Some(v) = parsed.node_width {
        config.node_width = v;
    }
    if let Some(v) = parsed.node_padding {
        config.node_padding = v;
    }
    if let Some(v) = parsed.extent {
        config.extent = v;
    }
    if let Some([width, height]) = parsed.size {
        config.extent = Extent::from_size(width, height);
    }
    if let Some(v) = parsed.iterations {
        config.iterations = v;
    }
    if let Some(v) = parsed.node_align {
        config.align = v;
    }
    if let Some(v) = parsed.node_id {
        config.node_id = v;
    }
    if let Some(v) = parsed.link_stacking {
        config.link_stacking = v;
    }
}
