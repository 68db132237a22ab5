//! Static mesh conversion into engine units and winding

use glam::{Vec2, Vec3};
use vobforge_core::UnitScale;
use vobforge_decode::MeshRecord;
use vobforge_scene::MeshAsset;

/// Reverse the winding of a triangle list: `(a, b, c)` becomes `(a, c, b)`.
/// A trailing partial triangle is dropped.
pub fn flip_winding(indices: &[u32]) -> Vec<u32> {
    indices
        .chunks_exact(3)
        .flat_map(|tri| [tri[0], tri[2], tri[1]])
        .collect()
}

pub fn convert_mesh(name: &str, record: &MeshRecord, scale: UnitScale) -> MeshAsset {
    MeshAsset {
        name: name.to_string(),
        positions: record.positions.iter().map(|p| scale.point(*p)).collect(),
        normals: record.normals.iter().map(|n| Vec3::from(*n)).collect(),
        uvs: record.uvs.iter().map(|uv| Vec2::from(*uv)).collect(),
        submeshes: record
            .submeshes
            .iter()
            .map(|s| flip_winding(&s.indices))
            .collect(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vobforge_decode::SubmeshRecord;

    #[test]
    fn test_flip_winding() {
        assert_eq!(flip_winding(&[0, 1, 2, 3, 4, 5]), vec![0, 2, 1, 3, 5, 4]);
        assert_eq!(flip_winding(&[0, 1, 2, 7]), vec![0, 2, 1]);
    }

    #[test]
    fn test_convert_scales_positions_only() {
        let record = MeshRecord {
            positions: vec![[100.0, 0.0, -50.0], [0.0, 200.0, 0.0], [1.0, 1.0, 1.0]],
            normals: vec![[0.0, 1.0, 0.0]; 3],
            uvs: vec![[0.5, 0.25]; 3],
            submeshes: vec![SubmeshRecord {
                texture: "STONE.TGA".into(),
                color: 0xFFFFFFFF,
                indices: vec![0, 1, 2],
            }],
            vertex_ids: vec![0, 1, 2],
        };
        let mesh = convert_mesh("ROCK", &record, UnitScale::CENTIMETRES);
        assert_eq!(mesh.name, "ROCK");
        assert!((mesh.positions[0] - Vec3::new(1.0, 0.0, -0.5)).length() < 1e-6);
        assert_eq!(mesh.normals[1], Vec3::Y);
        assert_eq!(mesh.uvs[2], Vec2::new(0.5, 0.25));
        assert_eq!(mesh.submeshes, vec![vec![0, 2, 1]]);
        assert_eq!(mesh.triangle_count(), 1);
    }
}
