//! Engine-side spatial and color types

use glam::{Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Local transform decomposed into position, rotation and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Decompose an affine matrix. Shear is lost, as with any TRS decomposition.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self {
            position,
            rotation: rotation.normalize(),
            scale,
        }
    }
}

/// Conversion factor from source units (centimetres) to engine units.
///
/// Only absolute positions are scaled. Directions, texture coordinates and
/// rotations pass through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitScale(pub f32);

impl Default for UnitScale {
    fn default() -> Self {
        Self::CENTIMETRES
    }
}

impl UnitScale {
    pub const CENTIMETRES: Self = Self(0.01);

    pub fn point(&self, p: [f32; 3]) -> Vec3 {
        Vec3::from(p) * self.0
    }

    pub fn length(&self, value: f32) -> f32 {
        value * self.0
    }

    /// Convert a column-major source node matrix into a local transform.
    /// The translation column is scaled, rotation and scale are decomposed as-is.
    pub fn node_transform(&self, columns: &[[f32; 4]; 4]) -> Transform {
        let mut transform = Transform::from_matrix(Mat4::from_cols_array_2d(columns));
        transform.position *= self.0;
        transform
    }

    /// Convert a source rotation given as three matrix rows.
    pub fn rotation_rows(rows: &[[f32; 3]; 3]) -> Quat {
        let matrix = Mat3::from_cols_array_2d(rows).transpose();
        Quat::from_mat3(&matrix).normalize()
    }
}

/// 8-bit RGBA color unpacked from the source's `0xAARRGGBB` encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn from_packed(c: u32) -> Self {
        Self {
            r: (c >> 16) as u8,
            g: (c >> 8) as u8,
            b: c as u8,
            a: (c >> 24) as u8,
        }
    }

    /// Normalized `[r, g, b, a]` in 0..=1
    pub fn to_linear(&self) -> [f32; 4] {
        const INV: f32 = 1.0 / 255.0;
        [
            self.r as f32 * INV,
            self.g as f32 * INV,
            self.b as f32 * INV,
            self.a as f32 * INV,
        ]
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_transform_matrix_roundtrip() {
        let t = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(0.5),
            scale: Vec3::splat(2.0),
        };
        let back = Transform::from_matrix(t.to_matrix());
        assert!(approx(back.position, t.position));
        assert!(approx(back.scale, t.scale));
        assert!(back.rotation.dot(t.rotation).abs() > 0.9999);
    }

    #[test]
    fn test_node_transform_scales_translation_only() {
        let columns = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [100.0, 250.0, -50.0, 1.0],
        ];
        let t = UnitScale::CENTIMETRES.node_transform(&columns);
        assert!(approx(t.position, Vec3::new(1.0, 2.5, -0.5)));
        assert!(approx(t.scale, Vec3::ONE));
    }

    #[test]
    fn test_rotation_rows_are_transposed() {
        // Rows of a +90 degree rotation about Y
        let rows = [[0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]];
        let q = UnitScale::rotation_rows(&rows);
        let expected = Quat::from_mat3(&Mat3::from_cols_array_2d(&rows).transpose());
        assert!(q.dot(expected).abs() > 0.9999);
        // The row matrix itself is the transposed rotation
        let rotated = q * Vec3::X;
        let expected_vec = Mat3::from_cols_array_2d(&rows).transpose() * Vec3::X;
        assert!(approx(rotated, expected_vec));
    }

    #[test]
    fn test_packed_color() {
        let c = Rgba::from_packed(0x80FF4010);
        assert_eq!((c.r, c.g, c.b, c.a), (0xFF, 0x40, 0x10, 0x80));
        assert_eq!(c.to_string(), "255,64,16,128");
        assert!((c.to_linear()[0] - 1.0).abs() < 1e-6);
    }
}
