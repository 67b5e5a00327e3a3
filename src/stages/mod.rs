//! Pixel-level refinement stages
//!
//! Each stage is a pure function over an owned RGBA buffer: it takes the
//! buffer by value, transforms it, and returns it together with a stats
//! struct describing what changed. Stages never share mutable state; the
//! [`crate::pipeline::RefinePipeline`] owns the buffer and threads it
//! through whichever stages the operator chooses.

pub mod background;
pub mod composite;
pub mod dilate;
pub mod edit;
pub mod harden;
pub mod mirror;
pub mod profile;
pub mod shape;
pub mod threshold;

pub use background::sample_background;
pub use composite::{compose, CompositeStats};
pub use dilate::{dilate, DilateStats};
pub use edit::{clear_rect, fill_rect, set_edge, EditStats, Rect};
pub use harden::{harden, HardenMode, HardenStats};
pub use mirror::{mirror, MirrorStats};
pub use profile::extract_profile;
pub use shape::{correct_shape, ShapeStats};
pub use threshold::{apply_threshold, threshold_value, ThresholdMode, ThresholdStats};
