//! Animation clips: curves bound to transform properties by node path

use crate::curve::AnimationCurve;
use serde::{Deserialize, Serialize};

/// Transform channel animated by a curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformProperty {
    #[serde(rename = "localPosition.x")]
    PositionX,
    #[serde(rename = "localPosition.y")]
    PositionY,
    #[serde(rename = "localPosition.z")]
    PositionZ,
    #[serde(rename = "localRotation.x")]
    RotationX,
    #[serde(rename = "localRotation.y")]
    RotationY,
    #[serde(rename = "localRotation.z")]
    RotationZ,
    #[serde(rename = "localRotation.w")]
    RotationW,
}

impl TransformProperty {
    pub const POSITION: [TransformProperty; 3] = [
        TransformProperty::PositionX,
        TransformProperty::PositionY,
        TransformProperty::PositionZ,
    ];

    pub const ROTATION: [TransformProperty; 4] = [
        TransformProperty::RotationX,
        TransformProperty::RotationY,
        TransformProperty::RotationZ,
        TransformProperty::RotationW,
    ];
}

/// One curve bound to `path` (relative to the clip root, `""` for the root itself)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipCurve {
    pub path: String,
    pub property: TransformProperty,
    pub curve: AnimationCurve,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub frame_rate: f32,
    /// Successor clip for caller-side chaining
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default)]
    pub curves: Vec<ClipCurve>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, frame_rate: f32) -> Self {
        Self {
            name: name.into(),
            frame_rate,
            next: None,
            curves: Vec::new(),
        }
    }

    pub fn set_curve(&mut self, path: &str, property: TransformProperty, curve: AnimationCurve) {
        match self
            .curves
            .iter_mut()
            .find(|c| c.path == path && c.property == property)
        {
            Some(existing) => existing.curve = curve,
            None => self.curves.push(ClipCurve {
                path: path.to_string(),
                property,
                curve,
            }),
        }
    }

    pub fn curve(&self, path: &str, property: TransformProperty) -> Option<&AnimationCurve> {
        self.curves
            .iter()
            .find(|c| c.path == path && c.property == property)
            .map(|c| &c.curve)
    }

    fn curve_index(&self, path: &str, property: TransformProperty) -> Option<usize> {
        self.curves
            .iter()
            .position(|c| c.path == path && c.property == property)
    }

    pub fn length(&self) -> f32 {
        self.curves
            .iter()
            .map(|c| c.curve.keys.last().map(|k| k.time).unwrap_or(0.0))
            .fold(0.0, f32::max)
    }

    /// Flip the sign of rotation keys whose quaternion points away from the
    /// previous key, so interpolation takes the short way round.
    pub fn ensure_quaternion_continuity(&mut self) {
        let mut paths: Vec<String> = self
            .curves
            .iter()
            .filter(|c| c.property == TransformProperty::RotationW)
            .map(|c| c.path.clone())
            .collect();
        paths.sort();
        paths.dedup();

        for path in paths {
            let slots: Option<Vec<usize>> = TransformProperty::ROTATION
                .iter()
                .map(|p| self.curve_index(&path, *p))
                .collect();
            let Some(slots) = slots else {
                continue;
            };
            let keys = slots
                .iter()
                .map(|s| self.curves[*s].curve.len())
                .min()
                .unwrap_or(0);

            for k in 1..keys {
                let dot: f32 = slots
                    .iter()
                    .map(|s| {
                        let c = &self.curves[*s].curve.keys;
                        c[k - 1].value * c[k].value
                    })
                    .sum();
                if dot < 0.0 {
                    for s in &slots {
                        let key = &mut self.curves[*s].curve.keys[k];
                        key.value = -key.value;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotation_clip(quats: &[[f32; 4]]) -> AnimationClip {
        let mut clip = AnimationClip::new("TEST", 25.0);
        for (axis, property) in TransformProperty::ROTATION.iter().enumerate() {
            let mut curve = AnimationCurve::new();
            for (frame, q) in quats.iter().enumerate() {
                curve.add_key(frame as f32 / 25.0, q[axis]);
            }
            clip.set_curve("BIP01", *property, curve);
        }
        clip
    }

    #[test]
    fn test_continuity_flips_opposite_hemisphere() {
        let mut clip = rotation_clip(&[
            [0.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0, -1.0],
            [0.0, 0.1, 0.0, -0.99],
        ]);
        clip.ensure_quaternion_continuity();
        let w = clip.curve("BIP01", TransformProperty::RotationW).unwrap();
        assert!(w.keys.iter().all(|k| k.value > 0.0));
        let y = clip.curve("BIP01", TransformProperty::RotationY).unwrap();
        assert!((y.keys[2].value + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_set_curve_replaces() {
        let mut clip = AnimationClip::new("TEST", 25.0);
        clip.set_curve("", TransformProperty::PositionX, AnimationCurve::constant(0.0, 1.0, 1.0));
        clip.set_curve("", TransformProperty::PositionX, AnimationCurve::constant(0.0, 2.0, 3.0));
        assert_eq!(clip.curves.len(), 1);
        assert!((clip.length() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_clip_toml_roundtrip() {
        let clip = rotation_clip(&[[0.0, 0.0, 0.0, 1.0], [0.0, 0.7071, 0.0, 0.7071]]);
        let text = toml::to_string(&clip).unwrap();
        assert!(text.contains("localRotation.w"));
        let back: AnimationClip = toml::from_str(&text).unwrap();
        assert_eq!(back, clip);
    }
}
