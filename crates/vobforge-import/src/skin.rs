//! Bind-pose resolution of skinned vertices

use crate::convert::flip_winding;
use glam::{Mat4, Vec2, Vec3};
use vobforge_core::{ForgeError, Result, UnitScale};
use vobforge_decode::{SkinnedMeshRecord, SkinnedVertexRecord};
use vobforge_scene::{BoneWeight, MeshAsset, NodeId, SceneGraph};

/// Four bind-local candidate positions, one per influencing bone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinnedVertex {
    pub positions: [Vec3; 4],
    pub weight: BoneWeight,
}

impl SkinnedVertex {
    pub fn from_record(record: &SkinnedVertexRecord, scale: UnitScale) -> Self {
        Self {
            positions: record.positions.map(|p| scale.point(p)),
            weight: BoneWeight {
                bones: record.bone_indices.map(u32::from),
                weights: record.weights,
            },
        }
    }
}

/// Resolves skinned vertices against bone world matrices.
///
/// Weights are applied as decoded. Influences that do not sum to one scale
/// the resulting position accordingly.
#[derive(Debug, Clone)]
pub struct SkinBinder {
    bones: Vec<Mat4>,
}

impl SkinBinder {
    /// `bones[i]` is the world matrix of the bone with original index `i`
    pub fn new(bones: Vec<Mat4>) -> Self {
        Self { bones }
    }

    pub fn from_graph(graph: &SceneGraph, bones: &[NodeId]) -> Self {
        Self::new(bones.iter().map(|b| graph.world_matrix(*b)).collect())
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn bind_vertex(&self, vertex: &SkinnedVertex) -> Result<Vec3> {
        let mut position = Vec3::ZERO;
        for slot in 0..4 {
            let weight = vertex.weight.weights[slot];
            if weight == 0.0 {
                continue;
            }
            let bone = vertex.weight.bones[slot] as usize;
            let matrix = self.bones.get(bone).ok_or_else(|| {
                ForgeError::StructuralError(format!(
                    "Vertex references bone {} but the skeleton has {} bones",
                    bone,
                    self.bones.len()
                ))
            })?;
            position += matrix.transform_point3(vertex.positions[slot]) * weight;
        }
        Ok(position)
    }

    pub fn bind(&self, vertices: &[SkinnedVertex]) -> Result<Vec<Vec3>> {
        vertices.iter().map(|v| self.bind_vertex(v)).collect()
    }

    /// Inverse bone world matrices
    pub fn bind_poses(&self) -> Vec<Mat4> {
        self.bones.iter().map(|m| m.inverse()).collect()
    }

    /// Build a skinned mesh asset with bind-pose positions, weights and bind poses
    pub fn skin_mesh(&self, name: &str, record: &SkinnedMeshRecord, scale: UnitScale) -> Result<MeshAsset> {
        let vertices: Vec<SkinnedVertex> = record
            .vertices
            .iter()
            .map(|v| SkinnedVertex::from_record(v, scale))
            .collect();

        Ok(MeshAsset {
            name: name.to_string(),
            positions: self.bind(&vertices)?,
            normals: record.vertices.iter().map(|v| Vec3::from(v.normal)).collect(),
            uvs: record.vertices.iter().map(|v| Vec2::from(v.uv)).collect(),
            submeshes: record
                .submeshes
                .iter()
                .map(|s| flip_winding(&s.indices))
                .collect(),
            bone_weights: vertices.iter().map(|v| v.weight).collect(),
            bind_poses: self.bind_poses(),
            blend_shapes: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn vertex(positions: [[f32; 3]; 4], bones: [u8; 4], weights: [f32; 4]) -> SkinnedVertexRecord {
        SkinnedVertexRecord {
            positions,
            bone_indices: bones,
            weights,
            normal: [0.0, 1.0, 0.0],
            uv: [0.25, 0.75],
        }
    }

    #[test]
    fn test_identity_bone_keeps_bind_local_position() {
        let binder = SkinBinder::new(vec![Mat4::IDENTITY]);
        let record = vertex([[0.3, -1.2, 4.5], [9.0; 3], [9.0; 3], [9.0; 3]], [0; 4], [1.0, 0.0, 0.0, 0.0]);
        let v = SkinnedVertex::from_record(&record, UnitScale(1.0));
        assert_eq!(binder.bind_vertex(&v).unwrap(), Vec3::new(0.3, -1.2, 4.5));
    }

    #[test]
    fn test_weighted_sum() {
        let binder = SkinBinder::new(vec![
            Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)),
            Mat4::from_rotation_translation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2), Vec3::Y),
        ]);
        let record = vertex([[0.0; 3], [1.0, 0.0, 0.0], [0.0; 3], [0.0; 3]], [0, 1, 0, 0], [0.5, 0.5, 0.0, 0.0]);
        let v = SkinnedVertex::from_record(&record, UnitScale(1.0));
        // bone 0: (1,0,0); bone 1: rotate X about Y to -Z, then +Y
        let p = binder.bind_vertex(&v).unwrap();
        assert!((p - Vec3::new(0.5, 0.5, -0.5)).length() < 1e-5);
    }

    #[test]
    fn test_weights_are_not_renormalized() {
        let binder = SkinBinder::new(vec![Mat4::IDENTITY]);
        let record = vertex([[2.0, 0.0, 0.0]; 4], [0; 4], [0.5, 0.25, 0.0, 0.0]);
        let v = SkinnedVertex::from_record(&record, UnitScale(1.0));
        let p = binder.bind_vertex(&v).unwrap();
        assert!((p.x - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_bone_out_of_range() {
        let binder = SkinBinder::new(vec![Mat4::IDENTITY]);
        let record = vertex([[0.0; 3]; 4], [0, 3, 0, 0], [0.5, 0.5, 0.0, 0.0]);
        let v = SkinnedVertex::from_record(&record, UnitScale(1.0));
        assert!(matches!(binder.bind_vertex(&v), Err(ForgeError::StructuralError(_))));
    }

    #[test]
    fn test_skin_mesh() {
        let mut graph = SceneGraph::new();
        let bone = graph.add_node("BIP01", vobforge_core::Transform::from_position(Vec3::new(0.0, 1.0, 0.0)));
        let binder = SkinBinder::from_graph(&graph, &[bone]);
        let record = SkinnedMeshRecord {
            vertices: vec![
                vertex([[100.0, 0.0, 0.0]; 4], [0; 4], [1.0, 0.0, 0.0, 0.0]),
                vertex([[0.0, 0.0, 100.0]; 4], [0; 4], [1.0, 0.0, 0.0, 0.0]),
                vertex([[0.0; 3]; 4], [0; 4], [1.0, 0.0, 0.0, 0.0]),
            ],
            submeshes: vec![vobforge_decode::SubmeshRecord {
                texture: "HUM_BODY_NAKED_V0_C0.TGA".into(),
                color: 0xFFFFFFFF,
                indices: vec![0, 1, 2],
            }],
        };
        let mesh = binder.skin_mesh("HUM_BODY_NAKED0", &record, UnitScale::CENTIMETRES).unwrap();
        assert!((mesh.positions[0] - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-5);
        assert!((mesh.positions[1] - Vec3::new(0.0, 1.0, 1.0)).length() < 1e-5);
        assert_eq!(mesh.submeshes, vec![vec![0, 2, 1]]);
        assert_eq!(mesh.bone_weights.len(), 3);
        assert_eq!(mesh.uvs[0], Vec2::new(0.25, 0.75));
        let unbound = mesh.bind_poses[0].transform_point3(Vec3::new(0.0, 1.0, 0.0));
        assert!(unbound.length() < 1e-5);
    }
}
