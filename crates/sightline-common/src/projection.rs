//! Lossy projection of the content model into a generic labeled tree, used
//! for snapshot-style comparison and action notifications. One-directional:
//! node identity is discarded.

use crate::content::{ContentItem, WidgetKind};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiagNode {
    Text(String),
    Element {
        label: String,
        attrs: Vec<(String, String)>,
        children: Vec<DiagNode>,
    },
}

impl DiagNode {
    fn element(label: &str) -> Self {
        DiagNode::Element {
            label: label.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        if let DiagNode::Element { attrs, .. } = &mut self {
            attrs.push((name.into(), value.into()));
        }
        self
    }

    fn child(mut self, node: DiagNode) -> Self {
        if let DiagNode::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }
}

/// Maps the content-item sequence onto a generic inspectable tree rooted at
/// a `window` element.
pub fn project(content: &[ContentItem]) -> DiagNode {
    let mut root = DiagNode::element("window");
    for item in content {
        root = root.child(project_item(item));
    }
    root
}

fn project_item(item: &ContentItem) -> DiagNode {
    match item {
        ContentItem::Text(run) => DiagNode::Text(run.text.clone()),
        ContentItem::Widget(w) => match &w.kind {
            WidgetKind::Image { src } => DiagNode::element("img").attr("src", src.clone()),
            WidgetKind::Input {
                input_type,
                checked,
                placeholder,
                value,
            } => match input_type.as_str() {
                "checkbox" | "radio" => {
                    let mut node = DiagNode::element(input_type);
                    if *checked {
                        node = node.attr("checked", "true");
                    }
                    node
                }
                _ => {
                    let mut node = DiagNode::element("textbox");
                    if let Some(placeholder) = placeholder {
                        node = node.attr("placeholder", placeholder.clone());
                    }
                    node.attr("value", value.clone())
                }
            },
            WidgetKind::Select { options } => {
                let mut node = DiagNode::element("combobox");
                for option in options {
                    let mut o = DiagNode::element("option");
                    if option.selected {
                        o = o.attr("selected", "true");
                    }
                    node = node.child(o.child(DiagNode::Text(option.text.clone())));
                }
                node
            }
            WidgetKind::TextArea { placeholder, value } => {
                let mut node = DiagNode::element("textbox").attr("multiline", "true");
                if let Some(placeholder) = placeholder {
                    node = node.attr("placeholder", placeholder.clone());
                }
                node.child(DiagNode::Text(value.clone()))
            }
            WidgetKind::Custom { .. } => DiagNode::element("unknown"),
        },
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl DiagNode {
    fn write(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        match self {
            DiagNode::Text(text) => writeln!(f, "{pad}{}", escape(text)),
            DiagNode::Element {
                label,
                attrs,
                children,
            } => {
                write!(f, "{pad}<{label}")?;
                for (name, value) in attrs {
                    write!(f, " {name}=\"{}\"", escape(value))?;
                }
                if children.is_empty() {
                    writeln!(f, "/>")
                } else {
                    writeln!(f, ">")?;
                    for child in children {
                        child.write(f, indent + 1)?;
                    }
                    writeln!(f, "{pad}</{label}>")
                }
            }
        }
    }
}

impl fmt::Display for DiagNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, 0)
    }
}
