use thiserror::Error;

use crate::ir::NodeKey;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("missing: {key} (link {link} has no matching node)")]
    UnresolvedNodeReference { link: usize, key: NodeKey },
}
