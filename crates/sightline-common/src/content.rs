use serde::{Deserialize, Serialize};

/// Opaque handle to a live node, valid for the snapshot it was captured
/// with. The value is an index into the scanner's in-page side table; the
/// content model never owns the node it points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeRef(pub u32);

/// One unit of the linearized content model: a merged text run or an atomic
/// widget descriptor, in strict reading order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum ContentItem {
    Text(TextRun),
    Widget(Widget),
}

/// A run of visible text assembled from one visual block.
///
/// `text` is the normalized, transform-applied concatenation; `substrings`
/// preserves the per-source-node breakdown so inline matches can resolve to
/// the specific originating node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub substrings: Vec<Substring>,
    /// The parent element of the first contributing text node.
    pub node: NodeRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Substring {
    pub text: String,
    pub node: NodeRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Widget {
    pub kind: WidgetKind,
    pub node: NodeRef,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Visible text for text-bearing widgets (button values, image class
    /// names, adapter-supplied text). Participates in anchor matching.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetKind {
    Image {
        src: String,
    },
    Input {
        input_type: String,
        checked: bool,
        #[serde(default)]
        placeholder: Option<String>,
        value: String,
    },
    Select {
        /// Visible options only, in document order.
        options: Vec<SelectOption>,
    },
    TextArea {
        #[serde(default)]
        placeholder: Option<String>,
        value: String,
    },
    Custom {
        #[serde(default)]
        value: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectOption {
    pub node: NodeRef,
    pub selected: bool,
    pub text: String,
}

impl Widget {
    pub fn is_radio(&self) -> bool {
        matches!(&self.kind, WidgetKind::Input { input_type, .. } if input_type == "radio")
    }

    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            WidgetKind::Input { value, .. } | WidgetKind::TextArea { value, .. } => Some(value),
            WidgetKind::Custom { value } => value.as_deref(),
            _ => None,
        }
    }

    pub fn placeholder(&self) -> Option<&str> {
        match &self.kind {
            WidgetKind::Input { placeholder, .. } | WidgetKind::TextArea { placeholder, .. } => {
                placeholder.as_deref()
            }
            _ => None,
        }
    }
}

impl ContentItem {
    pub fn text(&self) -> Option<&str> {
        match self {
            ContentItem::Text(run) => Some(&run.text),
            ContentItem::Widget(w) => w.text.as_deref(),
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            ContentItem::Widget(w) => w.value(),
            ContentItem::Text(_) => None,
        }
    }

    pub fn placeholder(&self) -> Option<&str> {
        match self {
            ContentItem::Widget(w) => w.placeholder(),
            ContentItem::Text(_) => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            ContentItem::Widget(w) => w.title.as_deref(),
            ContentItem::Text(_) => None,
        }
    }

    /// The node to act on for this item: the widget itself, or the text
    /// run's parent element.
    pub fn node(&self) -> NodeRef {
        match self {
            ContentItem::Text(run) => run.node,
            ContentItem::Widget(w) => w.node,
        }
    }

    /// Inputs, selects and text areas accept value assignment.
    pub fn is_settable(&self) -> bool {
        matches!(
            self,
            ContentItem::Widget(Widget {
                kind: WidgetKind::Input { .. } | WidgetKind::Select { .. } | WidgetKind::TextArea { .. },
                ..
            })
        )
    }

    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            ContentItem::Text(run) => Some(run),
            ContentItem::Widget(_) => None,
        }
    }

    pub fn as_widget(&self) -> Option<&Widget> {
        match self {
            ContentItem::Widget(w) => Some(w),
            ContentItem::Text(_) => None,
        }
    }
}
