//! Colorbar: a vertical color strip annotated with the current value range.
//!
//! Label precision adapts to how close `vmin` and `vmax` are, so nearly equal
//! bounds still get distinguishable labels.

mod format;
mod layout;
mod widget;

pub use format::{format_label, label_precision, MAX_PRECISION, MIN_PRECISION};
pub use layout::{ColorbarLayout, FixedMetrics, LineMetrics, TextMetrics, TEXT_PADDING};
pub use widget::{bar_extent, Colorbar, STRIP_STEPS};
