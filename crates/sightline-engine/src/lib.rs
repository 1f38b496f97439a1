//! Locates and manipulates page elements by the visible text a user would
//! read: a snapshot of the rendered document is linearized into reading
//! order, and textual anchors ("the field after 'Last Name'") are resolved
//! against that sequence under a bounded retry.

pub mod context;
pub mod driver;
pub mod getter;
pub mod linearize;
pub mod observe;
pub mod resolve;
pub mod segment;
pub mod setter;
pub mod visibility;
pub mod wait;

pub use sightline_common::content::{
    ContentItem, NodeRef, SelectOption, Substring, TextRun, Widget, WidgetKind,
};
pub use sightline_common::error::{AutomationError, DriverError, Result};
pub use sightline_common::projection::{self, DiagNode};
pub use sightline_common::protocol;
pub use sightline_common::snapshot::{
    ElementNode, PageSnapshot, RawNode, RawOption, TextNode, TextTransform,
};

pub use context::{Automator, Context};
pub use driver::Driver;
pub use linearize::{ContentBuilder, CustomFields, WidgetAdapter};
pub use observe::{ActionEvent, ActionKind, ActionObserver};
pub use resolve::{Anchor, Resolved};
pub use setter::FieldValue;
pub use wait::WaitPolicy;
