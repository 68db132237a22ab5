//! Resampling of fixed-rate pose samples into per-property curves

use crate::clip::{AnimationClip, TransformProperty};
use crate::curve::AnimationCurve;
use glam::{Quat, Vec3};
use vobforge_core::{ForgeError, Result};

/// Squared distance in engine units below which a translation counts as static
pub const STATIC_TRANSLATION_EPSILON: f32 = 0.001;

/// One node's local pose at one frame, in engine units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

/// Decoded animation tracks.
///
/// `samples` is frame-major: `samples[node_indices.len() * frame + slot]`
/// is the pose of node `node_indices[slot]` at `frame`.
#[derive(Debug, Clone, Copy)]
pub struct TrackSource<'a> {
    pub node_indices: &'a [u32],
    pub frame_count: u32,
    pub frame_rate: f32,
    pub samples: &'a [Pose],
}

impl TrackSource<'_> {
    fn sample(&self, frame: usize, slot: usize) -> Pose {
        self.samples[self.node_indices.len() * frame + slot]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnimationResampler {
    pub extract_root_motion: bool,
    pub epsilon: f32,
}

impl Default for AnimationResampler {
    fn default() -> Self {
        Self {
            extract_root_motion: true,
            epsilon: STATIC_TRANSLATION_EPSILON,
        }
    }
}

impl AnimationResampler {
    pub fn new(extract_root_motion: bool, epsilon: f32) -> Self {
        Self {
            extract_root_motion,
            epsilon,
        }
    }

    /// Build a clip from `source`.
    ///
    /// `bone_paths[i]` is the transform path of skeleton node `i` relative to
    /// the clip root. `root_bone` names the node whose horizontal motion moves
    /// the whole model; it is only set when the skeleton has a synthetic root.
    /// A clip without frames or without animated nodes yields
    /// `ForgeError::EmptyClip`.
    pub fn resample(
        &self,
        name: &str,
        source: &TrackSource<'_>,
        bone_paths: &[String],
        root_bone: Option<usize>,
    ) -> Result<AnimationClip> {
        if source.frame_count == 0 {
            return Err(ForgeError::EmptyClip(format!("{} is empty", name)));
        }
        if source.node_indices.is_empty() {
            return Err(ForgeError::EmptyClip(format!("{} animates no nodes", name)));
        }
        if !(source.frame_rate > 0.0) {
            return Err(ForgeError::DecodeError(format!(
                "{} has invalid frame rate {}",
                name, source.frame_rate
            )));
        }

        let frames = source.frame_count as usize;
        let slots = source.node_indices.len();
        if source.samples.len() < slots * frames {
            return Err(ForgeError::DecodeError(format!(
                "{} has {} samples, expected {} ({} nodes x {} frames)",
                name,
                source.samples.len(),
                slots * frames,
                slots,
                frames
            )));
        }

        let inv_fps = 1.0 / source.frame_rate;
        let end = inv_fps * (frames - 1) as f32;
        let mut clip = AnimationClip::new(name, source.frame_rate);
        let mut root_motion = Vec::new();

        for (slot, node) in source.node_indices.iter().enumerate() {
            let bone = *node as usize;
            let path = bone_paths.get(bone).ok_or_else(|| {
                ForgeError::DecodeError(format!(
                    "{} animates node {} but the skeleton has {} nodes",
                    name,
                    bone,
                    bone_paths.len()
                ))
            })?;
            let divert = self.extract_root_motion && root_bone == Some(bone);

            let mut position: [AnimationCurve; 3] = Default::default();
            let mut rotation: [AnimationCurve; 4] = Default::default();
            let first = source.sample(0, slot).position;
            let mut moving = false;

            for frame in 0..frames {
                let pose = source.sample(frame, slot);
                let time = frame as f32 * inv_fps;

                if (pose.position - first).length_squared() > self.epsilon {
                    moving = true;
                }
                for (axis, curve) in position.iter_mut().enumerate() {
                    curve.add_key(time, pose.position[axis]);
                }
                for (curve, value) in rotation.iter_mut().zip(pose.rotation.to_array()) {
                    curve.add_key(time, value);
                }
            }

            if !moving {
                position = [0, 1, 2].map(|axis| AnimationCurve::constant(0.0, end, first[axis]));
            }

            for (property, curve) in TransformProperty::POSITION.into_iter().zip(position) {
                let horizontal = matches!(
                    property,
                    TransformProperty::PositionX | TransformProperty::PositionZ
                );
                if divert && horizontal {
                    root_motion.push((property, curve));
                } else {
                    clip.set_curve(path, property, curve);
                }
            }
            for (property, curve) in TransformProperty::ROTATION.into_iter().zip(rotation) {
                clip.set_curve(path, property, curve);
            }
        }

        for (property, curve) in root_motion {
            clip.set_curve("", property, curve);
        }

        clip.ensure_quaternion_continuity();
        log::debug!("Resampled {} ({} frames, {} curves)", name, frames, clip.curves.len());
        Ok(clip)
    }
}
