use sightline_common::projection::DiagNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Click,
    Set,
}

/// Delivered to the injected sink before each mutating widget interaction.
/// A side channel for external observers, never used for control flow.
#[derive(Debug, Clone)]
pub struct ActionEvent {
    pub action: ActionKind,
    /// Diagnostic projection of the content the action was resolved
    /// against.
    pub content: DiagNode,
}

pub trait ActionObserver: Send + Sync {
    fn on_action(&self, event: &ActionEvent);
}
