use async_trait::async_trait;
use sightline_common::content::NodeRef;
use sightline_common::snapshot::PageSnapshot;

pub use sightline_common::error::DriverError;

/// The browser collaborator boundary. Implementations execute the capture
/// payload and the per-node primitives; polling and timeouts belong to the
/// engine. At most one call is in flight at a time per session.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Takes one synchronous snapshot of the rendered document.
    async fn capture(&self) -> Result<PageSnapshot, DriverError>;

    /// Clicks the referenced node.
    async fn click(&self, node: NodeRef) -> Result<(), DriverError>;

    /// Clears the referenced widget's value.
    async fn clear(&self, node: NodeRef) -> Result<(), DriverError>;

    /// Types into the referenced widget.
    async fn send_keys(&self, node: NodeRef, text: &str) -> Result<(), DriverError>;
}
