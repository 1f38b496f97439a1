use crate::context::Context;
use crate::driver::Driver;
use crate::observe::ActionKind;
use crate::resolve::Anchor;
use crate::wait::{self, WaitPolicy};
use regex::Regex;
use sightline_common::content::{ContentItem, SelectOption, Widget, WidgetKind};
use sightline_common::error::{AutomationError, Result};
use std::fmt;
use std::time::Duration;

/// A value to apply to a settable widget. Patterns are only meaningful for
/// select-option matching; they cannot be typed.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Text(String),
    Pattern(Regex),
}

impl FieldValue {
    /// Select options match by substring or pattern.
    fn matches_option(&self, text: &str) -> bool {
        match self {
            FieldValue::Text(value) => text.contains(value.as_str()),
            FieldValue::Pattern(re) => re.is_match(text),
        }
    }

    /// Radio labels match exactly.
    fn matches_label(&self, text: &str) -> bool {
        match self {
            FieldValue::Text(value) => text == value,
            FieldValue::Pattern(re) => re.is_match(text),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(value) => f.write_str(value),
            FieldValue::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.into())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Regex> for FieldValue {
    fn from(re: Regex) -> Self {
        FieldValue::Pattern(re)
    }
}

/// Fluent accessor for assigning values to widgets identified by a key.
pub struct Setter<'a, D> {
    context: &'a Context<D>,
    key: Anchor,
    wait: WaitPolicy,
}

impl<'a, D: Driver> Setter<'a, D> {
    pub(crate) fn new(context: &'a Context<D>, key: Anchor) -> Self {
        let wait = context.wait;
        Self { context, key, wait }
    }

    /// Overrides the timeout for this chain.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.wait.timeout = timeout;
        self
    }

    /// Sets the next settable widget after the key.
    pub async fn to(self, value: impl Into<FieldValue>) -> Result<()> {
        let value = value.into();
        self.apply(vec![value]).await
    }

    /// Sets consecutive settable widgets, one per value, left to right.
    pub async fn to_each<V: Into<FieldValue>>(
        self,
        values: impl IntoIterator<Item = V>,
    ) -> Result<()> {
        let values: Vec<FieldValue> = values.into_iter().map(Into::into).collect();
        self.apply(values).await
    }

    /// One multi-value application is a single retry unit: a failed attempt
    /// re-resolves and re-applies from the start on the next poll.
    async fn apply(self, values: Vec<FieldValue>) -> Result<()> {
        wait::poll(
            self.wait,
            async || {
                let (content, resolved) = self.context.resolve_once(&self.key).await?;
                let mut index = resolved.index;
                for value in &values {
                    let (offset, widget) = content[index + 1..]
                        .iter()
                        .enumerate()
                        .find_map(|(i, item)| match item.as_widget() {
                            Some(w) if item.is_settable() => Some((i, w)),
                            _ => None,
                        })
                        .ok_or_else(|| {
                            AutomationError::NotFound("no settable widget remaining".into())
                        })?;
                    index += offset + 1;
                    match &widget.kind {
                        WidgetKind::Select { options } => {
                            self.set_select(&content, options, value).await?;
                        }
                        _ if widget.is_radio() => {
                            index = self.set_radio(&content, index, value).await?;
                        }
                        _ => {
                            self.set_text(&content, widget, value).await?;
                        }
                    }
                }
                Ok(())
            },
            || {
                let list = values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("could not set \"{}\" to {list}", self.key)
            },
        )
        .await
    }

    /// Clicks the first option matching the value. An already-selected
    /// option is a no-op; no matching option is a structural mismatch.
    async fn set_select(
        &self,
        content: &[ContentItem],
        options: &[SelectOption],
        value: &FieldValue,
    ) -> Result<()> {
        let option = options
            .iter()
            .find(|o| value.matches_option(&o.text))
            .ok_or_else(|| {
                AutomationError::Unsupported(format!("no option with text found: {value}"))
            })?;
        if option.selected {
            return Ok(());
        }
        self.context.notify(ActionKind::Set, content);
        self.context.driver.click(option.node).await?;
        Ok(())
    }

    /// Scans (radio, label) pairs for a label equal to the value and clicks
    /// the label's parent node. A non-radio item before a match is a
    /// structural mismatch. Returns the index the scan stopped at.
    async fn set_radio(
        &self,
        content: &[ContentItem],
        mut index: usize,
        value: &FieldValue,
    ) -> Result<usize> {
        loop {
            if let Some(label) = content.get(index + 1) {
                if label.text().is_some_and(|t| value.matches_label(t)) {
                    self.context.notify(ActionKind::Set, content);
                    self.context.driver.click(label.node()).await?;
                    return Ok(index);
                }
            }
            index += 2;
            let still_radio = content
                .get(index)
                .and_then(ContentItem::as_widget)
                .is_some_and(Widget::is_radio);
            if !still_radio {
                return Err(AutomationError::Unsupported(format!(
                    "no radio button with label found: {value}"
                )));
            }
        }
    }

    /// Clear-then-type, skipped entirely when the widget already holds the
    /// target value. An empty value clears without retyping.
    async fn set_text(
        &self,
        content: &[ContentItem],
        widget: &Widget,
        value: &FieldValue,
    ) -> Result<()> {
        let FieldValue::Text(text) = value else {
            return Err(AutomationError::Unsupported(format!(
                "cannot type pattern {value} into a text widget"
            )));
        };
        if widget.value() == Some(text.as_str()) {
            return Ok(());
        }
        self.context.notify(ActionKind::Set, content);
        self.context.driver.clear(widget.node).await?;
        if !text.is_empty() {
            self.context.driver.send_keys(widget.node, text).await?;
        }
        Ok(())
    }
}
