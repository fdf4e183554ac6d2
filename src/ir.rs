use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier a link uses to name one of its endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeKey {
    Index(usize),
    Name(String),
}

impl NodeKey {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .map(Self::Index),
            Value::String(name) => Some(Self::Name(name.clone())),
            _ => None,
        }
    }

    /// The same id spelled the other way: `5` for `"5"` and back. Numeric and
    /// string ids name the same node when their decimal text agrees.
    pub fn coerced(&self) -> Option<Self> {
        match self {
            Self::Index(idx) => Some(Self::Name(idx.to_string())),
            Self::Name(name) => name
                .parse::<usize>()
                .ok()
                .filter(|idx| idx.to_string() == *name)
                .map(Self::Index),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(idx) => write!(f, "{idx}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for NodeKey {
    fn from(idx: usize) -> Self {
        Self::Index(idx)
    }
}

impl From<&str> for NodeKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Link endpoint. Input carries keys; normalization replaces them with node
/// positions.
///
/// A resolved endpoint is written as `{"index": n}`, so a laid-out graph read
/// back from JSON is still resolved and a bare `n` always stays an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeRef {
    Unresolved(NodeKey),
    Resolved(#[serde(with = "position")] usize),
}

mod position {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Position {
        index: usize,
    }

    pub fn serialize<S: Serializer>(index: &usize, serializer: S) -> Result<S::Ok, S::Error> {
        Position { index: *index }.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
        Position::deserialize(deserializer).map(|position| position.index)
    }
}

impl NodeRef {
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Resolved(idx) => Some(*idx),
            Self::Unresolved(_) => None,
        }
    }

    pub fn key(&self) -> NodeKey {
        match self {
            Self::Resolved(idx) => NodeKey::Index(*idx),
            Self::Unresolved(key) => key.clone(),
        }
    }
}

impl From<NodeKey> for NodeRef {
    fn from(key: NodeKey) -> Self {
        Self::Unresolved(key)
    }
}

impl From<usize> for NodeRef {
    fn from(idx: usize) -> Self {
        Self::Unresolved(NodeKey::Index(idx))
    }
}

impl From<&str> for NodeRef {
    fn from(name: &str) -> Self {
        Self::Unresolved(NodeKey::from(name))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub depth: usize,
    #[serde(default)]
    pub height: usize,
    #[serde(default)]
    pub x0: f64,
    #[serde(default)]
    pub x1: f64,
    #[serde(default)]
    pub y0: f64,
    #[serde(default)]
    pub y1: f64,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub source_links: Vec<usize>,
    #[serde(default)]
    pub target_links: Vec<usize>,
    /// Caller-defined fields, carried through layout untouched.
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: &str) -> Self {
        let mut node = Self::default();
        node.data
            .insert("name".to_string(), Value::String(name.to_string()));
        node
    }

    pub fn center(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }

    pub fn shift(&mut self, dy: f64) {
        self.y0 += dy;
        self.y1 += dy;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: NodeRef,
    pub target: NodeRef,
    pub value: f64,
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub y0: f64,
    #[serde(default)]
    pub y1: f64,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Link {
    pub fn new(source: impl Into<NodeRef>, target: impl Into<NodeRef>, value: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value,
            index: 0,
            width: 0.0,
            y0: 0.0,
            y1: 0.0,
            data: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(input: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Lenient variant of [`Graph::from_json`]: comments, trailing commas and
    /// unquoted keys are accepted.
    pub fn from_json5(input: &str) -> anyhow::Result<Self> {
        Ok(json5::from_str(input)?)
    }

    pub fn from_json_path(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let is_json5 = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| ext == "json5")
            .unwrap_or(false);
        if is_json5 {
            Self::from_json5(&contents)
        } else {
            Self::from_json(&contents)
        }
    }

    pub fn add_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn add_link(&mut self, source: impl Into<NodeRef>, target: impl Into<NodeRef>, value: f64) {
        self.links.push(Link::new(source, target, value));
    }

    /// Links consecutive stages: `[a, b, c]` yields `a -> b` and `b -> c`.
    /// Each link records `key` (`"a-b"`) and `name` (`"a -> b"`) in its data.
    pub fn chain<K>(&mut self, stages: &[K], value: f64)
    where
        K: Clone + Into<NodeKey>,
    {
        for pair in stages.windows(2) {
            let source: NodeKey = pair[0].clone().into();
            let target: NodeKey = pair[1].clone().into();
            let mut link = Link::new(source.clone(), target.clone(), value);
            link.data.insert(
                "key".to_string(),
                Value::String(format!("{source}-{target}")),
            );
            link.data.insert(
                "name".to_string(),
                Value::String(format!("{source} -> {target}")),
            );
            self.links.push(link);
        }
    }
}

/// Access to the node and link sequences a layout operates on.
///
/// Layout mutates the returned slices in place; the implementor hands over
/// mutation rights for the duration of the call.
pub trait SankeyGraph {
    fn parts_mut(&mut self) -> (&mut [Node], &mut [Link]);
}

impl SankeyGraph for Graph {
    fn parts_mut(&mut self) -> (&mut [Node], &mut [Link]) {
        (self.nodes.as_mut_slice(), self.links.as_mut_slice())
    }
}

impl SankeyGraph for (Vec<Node>, Vec<Link>) {
    fn parts_mut(&mut self) -> (&mut [Node], &mut [Link]) {
        (self.0.as_mut_slice(), self.1.as_mut_slice())
    }
}
