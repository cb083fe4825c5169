//! Output back ends. Both render the same [`SkeletonPlan`](crate::rows::SkeletonPlan):
//! [`code`] prints component source text, [`preview`] draws positioned boxes.

pub mod code;
pub mod preview;

pub use code::{emit_code, EMPTY_SKELETON};
pub use preview::{render_preview, Preview, PreviewBox};
