use crate::driver::Driver;
use crate::getter::Getter;
use crate::linearize::{ContentBuilder, WidgetAdapter};
use crate::observe::{ActionEvent, ActionKind, ActionObserver};
use crate::resolve::{self, Anchor, Resolved};
use crate::setter::Setter;
use crate::wait::{self, WaitPolicy};
use regex::Regex;
use sightline_common::content::ContentItem;
use sightline_common::error::{AutomationError, Result};
use sightline_common::projection::{self, DiagNode};
use std::sync::Arc;
use std::time::Duration;

/// Entry point into the automation API. Owns the driver, the content
/// builder and the default wait policy, and dereferences to the root
/// [`Context`].
pub struct Automator<D> {
    root: Context<D>,
}

impl<D: Driver> Automator<D> {
    pub fn new(driver: D) -> Self {
        Self {
            root: Context {
                driver: Arc::new(driver),
                builder: Arc::new(ContentBuilder::new()),
                observer: None,
                wait: WaitPolicy::default(),
                precedings: Vec::new(),
                followings: Vec::new(),
            },
        }
    }

    /// Default timeout for every resolution-dependent operation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.root.wait.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.root.wait.interval = interval;
        self
    }

    /// Registers a recognizer for application-specific widgets.
    pub fn with_adapter(mut self, adapter: Arc<dyn WidgetAdapter>) -> Self {
        let builder = (*self.root.builder).clone().with_adapter(adapter);
        self.root.builder = Arc::new(builder);
        self
    }

    /// Installs a sink receiving a notification before each mutation.
    pub fn with_observer(mut self, observer: Arc<dyn ActionObserver>) -> Self {
        self.root.observer = Some(observer);
        self
    }
}

impl<D> std::ops::Deref for Automator<D> {
    type Target = Context<D>;

    fn deref(&self) -> &Context<D> {
        &self.root
    }
}

/// An immutable, cumulative lookup scope: ordered preceding and following
/// anchors that every lookup must satisfy in reading order. Deriving a
/// nested context never mutates its parent; a context is cheap to clone and
/// carries no cached resolution.
pub struct Context<D> {
    pub(crate) driver: Arc<D>,
    pub(crate) builder: Arc<ContentBuilder>,
    pub(crate) observer: Option<Arc<dyn ActionObserver>>,
    pub(crate) wait: WaitPolicy,
    pub(crate) precedings: Vec<Anchor>,
    pub(crate) followings: Vec<Anchor>,
}

impl<D> Clone for Context<D> {
    fn clone(&self) -> Self {
        Self {
            driver: self.driver.clone(),
            builder: self.builder.clone(),
            observer: self.observer.clone(),
            wait: self.wait,
            precedings: self.precedings.clone(),
            followings: self.followings.clone(),
        }
    }
}

impl<D: Driver> Context<D> {
    /// A context scoped to content after the given text.
    pub fn after(&self, anchor: impl Into<Anchor>) -> Context<D> {
        let mut ctx = self.clone();
        ctx.precedings.push(anchor.into());
        ctx
    }

    /// A context scoped to content before the given text.
    pub fn before(&self, anchor: impl Into<Anchor>) -> Context<D> {
        let mut ctx = self.clone();
        ctx.followings.push(anchor.into());
        ctx
    }

    /// A context scoped to content strictly between the two texts.
    pub fn between(&self, after: impl Into<Anchor>, before: impl Into<Anchor>) -> Context<D> {
        self.after(after).before(before)
    }

    /// Begins a chain of calls to get something by a key.
    pub fn get(&self, key: impl Into<Anchor>) -> Getter<'_, D> {
        Getter::new(self, key.into())
    }

    /// Begins a chain of calls to set something by a key.
    pub fn set(&self, key: impl Into<Anchor>) -> Setter<'_, D> {
        Setter::new(self, key.into())
    }

    /// One fresh content model, built from a new snapshot.
    pub async fn content(&self) -> Result<Vec<ContentItem>> {
        let snapshot = self.driver.capture().await?;
        Ok(self.builder.build(&snapshot))
    }

    /// Diagnostic projection of the current content, for snapshot-style
    /// comparison.
    pub async fn diagnostics(&self) -> Result<DiagNode> {
        Ok(projection::project(&self.content().await?))
    }

    /// Clicks the element showing the given text, preferring the specific
    /// inline node when the text matched inside a larger run.
    pub async fn click(&self, key: impl Into<Anchor>) -> Result<()> {
        let key = key.into();
        wait::poll(
            self.wait,
            async || {
                let content = self.content().await?;
                let resolved = resolve::resolve_plain(&content, &self.precedings, &key)?;
                let item = &content[resolved.index];
                let target = match (item.as_text(), resolved.substring) {
                    (Some(run), Some(i)) => run.substrings[i].node,
                    _ => item.node(),
                };
                self.notify(ActionKind::Click, &content);
                self.driver.click(target).await?;
                Ok(())
            },
            || resolve::describe_chain(&self.precedings, &key),
        )
        .await
    }

    /// The text immediately following the key: the remainder of the key's
    /// own run when it matched inline, else the next text item.
    pub async fn string(&self, key: impl Into<Anchor>) -> Result<String> {
        let key = key.into();
        let (content, resolved) = self.resolve_key(&key).await?;
        if let (Some(run), Some(i)) = (content[resolved.index].as_text(), resolved.substring) {
            if i + 1 < run.substrings.len() {
                return Ok(run.substrings[i + 1].text.clone());
            }
        }
        for item in &content[resolved.index + 1..] {
            if let Some(run) = item.as_text() {
                return Ok(run.text.clone());
            }
        }
        Ok(String::new())
    }

    /// The value of the first widget after the key.
    pub async fn value(&self, key: impl Into<Anchor>) -> Result<Option<String>> {
        let key = key.into();
        let (content, resolved) = self.resolve_key(&key).await?;
        for item in &content[resolved.index + 1..] {
            if let Some(widget) = item.as_widget() {
                return Ok(widget.value().map(str::to_string));
            }
        }
        Ok(None)
    }

    /// Resolves the pattern as a key and returns the capture groups against
    /// the matched item's text.
    pub async fn matches(&self, pattern: Regex) -> Result<Vec<Option<String>>> {
        let key = Anchor::Pattern(pattern.clone());
        let (content, resolved) = self.resolve_key(&key).await?;
        let text = content[resolved.index].text().unwrap_or_default();
        let captures = pattern
            .captures(text)
            .ok_or_else(|| AutomationError::NotFound(key.to_string()))?;
        Ok(captures
            .iter()
            .map(|group| group.map(|m| m.as_str().to_string()))
            .collect())
    }

    /// One resolution attempt against a fresh snapshot.
    pub(crate) async fn resolve_once(&self, key: &Anchor) -> Result<(Vec<ContentItem>, Resolved)> {
        let content = self.content().await?;
        let resolved = resolve::resolve(&content, &self.precedings, key, &self.followings)?;
        Ok((content, resolved))
    }

    pub(crate) async fn resolve_key(&self, key: &Anchor) -> Result<(Vec<ContentItem>, Resolved)> {
        wait::poll(
            self.wait,
            async || self.resolve_once(key).await,
            || resolve::describe_chain(&self.precedings, key),
        )
        .await
    }

    pub(crate) fn notify(&self, action: ActionKind, content: &[ContentItem]) {
        if let Some(observer) = &self.observer {
            observer.on_action(&ActionEvent {
                action,
                content: projection::project(content),
            });
        }
    }
}
