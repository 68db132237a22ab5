//! vobforge Animation - engine animation clips and keyframe resampling
//!
//! Source animations are fixed-rate pose samples for a subset of skeleton
//! nodes. `AnimationResampler` turns them into per-property curves bound by
//! transform path, compresses static translations, and optionally diverts
//! horizontal root-bone motion to the clip root.

mod clip;
mod curve;
mod naming;
mod resample;

pub use clip::{AnimationClip, ClipCurve, TransformProperty};
pub use curve::{AnimationCurve, Keyframe};
pub use naming::{clip_location, next_clip_name};
pub use resample::{AnimationResampler, Pose, TrackSource, STATIC_TRANSLATION_EPSILON};
