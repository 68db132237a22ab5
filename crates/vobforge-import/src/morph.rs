//! Dense blend-shape frames from sparse morph samples

use glam::Vec3;
use std::collections::HashMap;
use vobforge_core::{ForgeError, Result, UnitScale};
use vobforge_decode::MorphBlendRecord;
use vobforge_scene::BlendShapeFrame;

/// Remaps morph samples, addressed by original vertex id, onto the current
/// vertex order of the base mesh.
pub struct MorphBlendBuilder<'a> {
    /// Current vertex index to original vertex id
    vertex_ids: &'a [u32],
    scale: UnitScale,
}

impl<'a> MorphBlendBuilder<'a> {
    pub fn new(vertex_ids: &'a [u32], scale: UnitScale) -> Self {
        Self { vertex_ids, scale }
    }

    /// One frame per source frame of every blend, in blend order.
    ///
    /// Frames of the n-th blend (1-based) are named `<blend>@<n>` and placed at
    /// weight `(frame + 1) / frame_count`.
    pub fn build(&self, vertex_count: usize, blends: &[MorphBlendRecord]) -> Result<Vec<BlendShapeFrame>> {
        if self.vertex_ids.len() < vertex_count {
            return Err(ForgeError::DecodeError(format!(
                "Morph mesh has {} vertices but only {} vertex ids",
                vertex_count,
                self.vertex_ids.len()
            )));
        }

        let mut frames = Vec::new();
        for (counter, blend) in blends.iter().enumerate() {
            let columns = blend.indices.len();
            let needed = columns * blend.frame_count as usize;
            if blend.samples.len() < needed {
                return Err(ForgeError::DecodeError(format!(
                    "Morph {} has {} samples, expected {}",
                    blend.name,
                    blend.samples.len(),
                    needed
                )));
            }

            let name = format!("{}@{}", blend.name, counter + 1);
            let inv_frames = 1.0 / blend.frame_count as f32;
            for frame in 0..blend.frame_count as usize {
                let mut update = HashMap::with_capacity(columns);
                for (column, original) in blend.indices.iter().enumerate() {
                    update.insert(*original, blend.samples[column + columns * frame]);
                }

                let deltas = self.vertex_ids[..vertex_count]
                    .iter()
                    .map(|id| update.get(id).map_or(Vec3::ZERO, |d| self.scale.point(*d)))
                    .collect();
                frames.push(BlendShapeFrame {
                    name: name.clone(),
                    weight: (1 + frame) as f32 * inv_frames,
                    deltas,
                });
            }
        }
        log::debug!("Built {} blend shape frames from {} blends", frames.len(), blends.len());
        Ok(frames)
    }
}
