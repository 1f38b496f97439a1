use crate::context::Context;
use crate::driver::Driver;
use crate::resolve::{self, Anchor};
use crate::wait::{self, WaitPolicy};
use sightline_common::content::{ContentItem, Widget, WidgetKind};
use sightline_common::error::{AutomationError, Result};
use std::collections::HashMap;
use std::time::Duration;

/// Fluent accessor for reading widget state identified by a key.
pub struct Getter<'a, D> {
    context: &'a Context<D>,
    key: Anchor,
    wait: WaitPolicy,
}

impl<'a, D: Driver> Getter<'a, D> {
    pub(crate) fn new(context: &'a Context<D>, key: Anchor) -> Self {
        let wait = context.wait;
        Self { context, key, wait }
    }

    /// Overrides the timeout for this chain.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.wait.timeout = timeout;
        self
    }

    /// The value of the widget immediately following the key.
    pub async fn value(self) -> Result<Option<String>> {
        let mut values = self.values(&["value"]).await?;
        Ok(values.remove("value").flatten())
    }

    /// Reads one widget per requested name, in order, starting immediately
    /// after the resolved key position.
    pub async fn values(&self, names: &[&str]) -> Result<HashMap<String, Option<String>>> {
        wait::poll(
            self.wait,
            async || {
                let (content, resolved) = self.context.resolve_once(&self.key).await?;
                let mut index = resolved.index;
                let mut result = HashMap::new();
                for name in names {
                    index += 1;
                    let item = content.get(index).ok_or_else(|| {
                        AutomationError::NotFound(format!("no gettable item for \"{name}\""))
                    })?;
                    let value = match item.as_widget().map(|w| &w.kind) {
                        Some(WidgetKind::Select { options }) => {
                            options.iter().find(|o| o.selected).map(|o| o.text.clone())
                        }
                        Some(WidgetKind::Input { input_type, .. }) if input_type == "radio" => {
                            read_radio_group(&content, &mut index)
                        }
                        _ => item
                            .value()
                            .map(str::to_string)
                            .or_else(|| item.text().map(str::to_string)),
                    };
                    result.insert((*name).to_string(), value);
                }
                Ok(result)
            },
            || resolve::describe_chain(&self.context.precedings, &self.key),
        )
        .await
    }

    /// The displayed text of the available options: a select's visible
    /// options, or the labels of a contiguous radio group. Anything else is
    /// a structural mismatch.
    pub async fn options(&self) -> Result<Vec<String>> {
        wait::poll(
            self.wait,
            async || {
                let (content, resolved) = self.context.resolve_once(&self.key).await?;
                let mut index = resolved.index;
                let widget = loop {
                    index += 1;
                    let item = content
                        .get(index)
                        .ok_or_else(|| AutomationError::NotFound(self.key.to_string()))?;
                    match item.as_widget() {
                        Some(w) if matches!(w.kind, WidgetKind::Image { .. }) => continue,
                        Some(w) => break w,
                        None => {
                            return Err(AutomationError::Unsupported(
                                "options() not supported for text content".into(),
                            ));
                        }
                    }
                };
                match &widget.kind {
                    WidgetKind::Select { options } => {
                        Ok(options.iter().map(|o| o.text.clone()).collect())
                    }
                    WidgetKind::Input { input_type, .. } if input_type == "radio" => {
                        Ok(radio_group_labels(&content, index))
                    }
                    WidgetKind::Input { input_type, .. } => Err(AutomationError::Unsupported(
                        format!("options() not supported for {input_type} input type"),
                    )),
                    _ => Err(AutomationError::Unsupported(
                        "options() not supported for this widget".into(),
                    )),
                }
            },
            || resolve::describe_chain(&self.context.precedings, &self.key),
        )
        .await
    }
}

/// Scans forward by (radio, label) pairs until a checked radio is found.
/// A non-radio item terminates the group with no value. Leaves `index` at
/// the position the scan stopped.
fn read_radio_group(content: &[ContentItem], index: &mut usize) -> Option<String> {
    loop {
        match content.get(*index).and_then(ContentItem::as_widget) {
            Some(Widget {
                kind:
                    WidgetKind::Input {
                        input_type,
                        checked,
                        ..
                    },
                ..
            }) if input_type == "radio" => {
                if *checked {
                    return content
                        .get(*index + 1)
                        .and_then(|item| item.text())
                        .map(str::to_string);
                }
            }
            _ => return None,
        }
        *index += 2;
    }
}

/// Collects the labels of a contiguous radio group starting at the radio at
/// `index`, skipping images between pairs.
fn radio_group_labels(content: &[ContentItem], mut index: usize) -> Vec<String> {
    let mut labels = Vec::new();
    loop {
        index += 1;
        if let Some(text) = content.get(index).and_then(|item| item.text()) {
            if !text.is_empty() {
                labels.push(text.to_string());
            }
        }
        // advance to the next widget, skipping images
        loop {
            index += 1;
            match content.get(index).map(|item| item.as_widget()) {
                Some(Some(w)) if matches!(w.kind, WidgetKind::Image { .. }) => continue,
                Some(Some(w)) if w.is_radio() => break,
                _ => return labels,
            }
        }
    }
}
