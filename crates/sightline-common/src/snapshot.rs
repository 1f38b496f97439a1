use crate::content::NodeRef;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Custom deserializer for HashMap<String, String> that filters out null
/// values. The capture payload reports missing attributes as null.
fn deserialize_nullable_string_map<'de, D>(
    deserializer: D,
) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: HashMap<String, Option<String>> = HashMap::deserialize(deserializer)?;
    Ok(map
        .into_iter()
        .filter_map(|(k, v)| v.map(|val| (k, val)))
        .collect())
}

/// One synchronous capture of the rendered document: every element and text
/// node in document preorder, with the computed-style signals the engine
/// needs. Taken fresh on every evaluation, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub nodes: Vec<RawNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawNode {
    Element(ElementNode),
    Text(TextNode),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementNode {
    pub depth: u32,
    /// Side-table index of this element.
    pub node: NodeRef,
    #[serde(default)]
    pub parent: Option<NodeRef>,
    /// Lowercased tag name.
    pub tag: String,
    #[serde(default = "default_display")]
    pub display: String,
    #[serde(default = "default_visibility")]
    pub visibility: String,
    /// True when the computed left margin is non-zero. The pixel heuristic
    /// lives in the capture payload; only the behavior contract crosses the
    /// boundary.
    #[serde(default)]
    pub indented: bool,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub options: Vec<RawOption>,
    /// Remaining attributes, for custom widget adapters.
    #[serde(default, deserialize_with = "deserialize_nullable_string_map")]
    pub attrs: HashMap<String, String>,
}

fn default_display() -> String {
    "inline".into()
}

fn default_visibility() -> String {
    "visible".into()
}

impl Default for ElementNode {
    fn default() -> Self {
        Self {
            depth: 0,
            node: NodeRef(0),
            parent: None,
            tag: String::new(),
            display: default_display(),
            visibility: default_visibility(),
            indented: false,
            class_name: String::new(),
            title: None,
            input_type: None,
            checked: false,
            value: None,
            placeholder: None,
            src: None,
            options: Vec::new(),
            attrs: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextNode {
    pub depth: u32,
    /// Side-table index of the parent element.
    pub parent: NodeRef,
    /// Raw text content, untouched by the capture payload.
    pub text: String,
    /// The parent element's computed `text-transform`.
    #[serde(default)]
    pub transform: TextTransform,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    #[default]
    None,
    Capitalize,
    Uppercase,
    Lowercase,
}

/// Any computed value other than the three effective transforms means no
/// transform, matching how browsers fall through for exotic values.
impl<'de> Deserialize<'de> for TextTransform {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(match value.as_str() {
            "capitalize" => TextTransform::Capitalize,
            "uppercase" => TextTransform::Uppercase,
            "lowercase" => TextTransform::Lowercase,
            _ => TextTransform::None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOption {
    pub node: NodeRef,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_display")]
    pub display: String,
    #[serde(default = "default_visibility")]
    pub visibility: String,
}

impl RawNode {
    pub fn depth(&self) -> u32 {
        match self {
            RawNode::Element(el) => el.depth,
            RawNode::Text(t) => t.depth,
        }
    }
}
