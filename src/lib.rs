pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;

pub use config::{Extent, LayoutConfig, LinkStacking, NodeId, load_config};
pub use ir::{Graph, Link, Node, NodeKey, NodeRef, SankeyGraph};
pub use layout::{
    Align, AlignContext, HeightNormalizer, LayoutError, LinearHeightNormalizer, LinearScale,
    NodeBounds, Positioner, Positioning, Sankey, ValueRange, WidthNormalizer, compute_layout,
};
pub use layout_dump::{LayoutDump, write_layout_dump};
