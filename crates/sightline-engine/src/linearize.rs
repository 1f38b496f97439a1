//! Flattens the segmenter's block stream into the linear content model.

use crate::segment::{BlockItem, Segmenter};
use crate::visibility::option_visible;
use sightline_common::content::{ContentItem, SelectOption, TextRun, Widget, WidgetKind};
use sightline_common::snapshot::{ElementNode, PageSnapshot, RawNode, TextTransform};
use std::sync::Arc;

/// Fields a custom widget adapter contributes to its descriptor.
#[derive(Debug, Clone, Default)]
pub struct CustomFields {
    pub text: Option<String>,
    pub value: Option<String>,
}

/// Pluggable recognizer for application-specific widgets. A matching
/// element joins its block as one atomic item and its subtree is opaque to
/// segmentation.
pub trait WidgetAdapter: Send + Sync {
    fn matches(&self, el: &ElementNode) -> bool;
    fn describe(&self, el: &ElementNode) -> CustomFields;
}

/// Builds the linear content model from a page snapshot. This is the
/// externally-callable entry point; every call re-reads the snapshot it is
/// given and nothing is cached between calls.
#[derive(Clone, Default)]
pub struct ContentBuilder {
    adapters: Vec<Arc<dyn WidgetAdapter>>,
}

impl ContentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn WidgetAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    pub fn build(&self, snapshot: &PageSnapshot) -> Vec<ContentItem> {
        let mut content = Vec::new();
        for block in Segmenter::new(&snapshot.nodes, &self.adapters) {
            for item in block {
                match item {
                    BlockItem::Run(run) => {
                        content.push(ContentItem::Text(TextRun {
                            text: run.text,
                            substrings: run.substrings,
                            node: run.node,
                        }));
                    }
                    BlockItem::Widget(index) => {
                        if let RawNode::Element(el) = &snapshot.nodes[index] {
                            content.push(ContentItem::Widget(self.describe(el)));
                        }
                    }
                }
            }
        }
        content
    }

    fn describe(&self, el: &ElementNode) -> Widget {
        let mut text = None;
        let kind = match el.tag.as_str() {
            "img" => {
                text = Some(el.class_name.clone());
                WidgetKind::Image {
                    src: el.src.clone().unwrap_or_default(),
                }
            }
            "input" => {
                let input_type = el.input_type.clone().unwrap_or_else(|| "text".into());
                let mut value = el.value.clone().unwrap_or_default();
                match input_type.as_str() {
                    "submit" => {
                        if value.is_empty() {
                            value = "Submit".into();
                        }
                        text = Some(value.clone());
                    }
                    "reset" => {
                        if value.is_empty() {
                            value = "Reset".into();
                        }
                        text = Some(value.clone());
                    }
                    "button" => {
                        text = Some(value.clone());
                    }
                    _ => {}
                }
                WidgetKind::Input {
                    input_type,
                    checked: el.checked,
                    placeholder: el.placeholder.clone(),
                    value,
                }
            }
            "select" => WidgetKind::Select {
                options: el
                    .options
                    .iter()
                    .filter(|o| option_visible(o))
                    .map(|o| SelectOption {
                        node: o.node,
                        selected: o.selected,
                        text: o.text.clone(),
                    })
                    .collect(),
            },
            "textarea" => WidgetKind::TextArea {
                placeholder: el.placeholder.clone(),
                value: el.value.clone().unwrap_or_default(),
            },
            _ => {
                let fields = self
                    .adapters
                    .iter()
                    .find(|a| a.matches(el))
                    .map(|a| a.describe(el))
                    .unwrap_or_default();
                text = fields.text;
                WidgetKind::Custom {
                    value: fields.value,
                }
            }
        };
        Widget {
            kind,
            node: el.node,
            class_name: el.class_name.clone(),
            title: el.title.clone(),
            text,
        }
    }
}

/// Collapses every run of whitespace except non-breaking spaces to one
/// plain space. The non-breaking space survives; the resolver normalizes a
/// single occurrence at match time.
pub fn reduce_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_whitespace = false;
    for ch in s.chars() {
        if ch.is_whitespace() && ch != '\u{a0}' {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            in_whitespace = false;
            out.push(ch);
        }
    }
    out
}

/// Applies the contributing node's computed `text-transform`.
pub fn apply_transform(s: &str, transform: TextTransform) -> String {
    match transform {
        TextTransform::Capitalize => {
            let mut out = String::with_capacity(s.len());
            let mut prev_word = false;
            for ch in s.chars() {
                let is_word = ch.is_alphanumeric() || ch == '_';
                if is_word && !prev_word {
                    out.extend(ch.to_uppercase());
                } else {
                    out.push(ch);
                }
                prev_word = is_word;
            }
            out
        }
        TextTransform::Uppercase => s.to_uppercase(),
        TextTransform::Lowercase => s.to_lowercase(),
        TextTransform::None => s.to_string(),
    }
}
