/// The in-page capture payload.
/// This string is injected into browser contexts by drivers.
pub const CAPTURE_JS: &str = include_str!("capture.js");
