use sightline_common::snapshot::{ElementNode, RawOption};

/// Decides whether a node is meaningful to a user. The same rules govern
/// traversal inclusion and select-option inclusion: hidden inputs and
/// noscript content are never visible, then computed `display: none`, then
/// any computed `visibility` other than `visible`.
pub fn is_displayed(el: &ElementNode) -> bool {
    if el.tag == "noscript" {
        return false;
    }
    if el.tag == "input" && el.input_type.as_deref() == Some("hidden") {
        return false;
    }
    if el.display == "none" {
        return false;
    }
    el.visibility == "visible"
}

pub fn option_visible(option: &RawOption) -> bool {
    option.display != "none" && option.visibility == "visible"
}
