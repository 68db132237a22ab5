//! Skeleton reconstruction from flat, parent-indexed node lists

use std::collections::HashSet;
use vobforge_core::{ident, ForgeError, Result, Transform, UnitScale};
use vobforge_decode::{AnimationRecord, RawNodeRecord, NO_PARENT};
use vobforge_scene::{NodeId, SceneGraph};

/// A skeleton placed in a scene graph
#[derive(Debug, Clone)]
pub struct BuiltSkeleton {
    /// The synthetic root, or the single source root
    pub root: NodeId,
    /// Scene node of every source node, by original index
    pub bones: Vec<NodeId>,
    /// Scene nodes of the source roots
    pub top_level: Vec<NodeId>,
    synthetic: bool,
}

impl BuiltSkeleton {
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// The bone directly under a synthetic root. Its horizontal motion is
    /// treated as root motion.
    pub fn animation_root(&self) -> Option<NodeId> {
        if self.synthetic {
            self.top_level.first().copied()
        } else {
            None
        }
    }

    pub fn original_index(&self, id: NodeId) -> Option<usize> {
        self.bones.iter().position(|b| *b == id)
    }

    /// Transform path of every bone relative to the skeleton root, by original index
    pub fn bone_paths(&self, graph: &SceneGraph) -> Vec<String> {
        self.bones
            .iter()
            .map(|b| graph.path(*b, self.root).unwrap_or_default())
            .collect()
    }
}

/// Flatten a built skeleton back into parent-index form
pub fn parent_indices(graph: &SceneGraph, skeleton: &BuiltSkeleton) -> Vec<u32> {
    skeleton
        .bones
        .iter()
        .map(|bone| {
            graph
                .parent(*bone)
                .and_then(|p| skeleton.original_index(p))
                .map_or(NO_PARENT, |i| i as u32)
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct SkeletonBuilder {
    scale: UnitScale,
    synthetic_root: bool,
}

impl SkeletonBuilder {
    pub fn new(scale: UnitScale) -> Self {
        Self {
            scale,
            synthetic_root: false,
        }
    }

    /// Parent every source root under a fresh node named after the skeleton
    pub fn with_synthetic_root(mut self, enabled: bool) -> Self {
        self.synthetic_root = enabled;
        self
    }

    /// Validate `nodes` and add one scene node per record to `graph`.
    ///
    /// Nothing is added to the graph when validation fails.
    pub fn build(&self, name: &str, nodes: &[RawNodeRecord], graph: &mut SceneGraph) -> Result<BuiltSkeleton> {
        let count = nodes.len();

        // slot[original index] = position in `nodes`
        let mut slot = vec![None; count];
        for (position, node) in nodes.iter().enumerate() {
            let index = node.index as usize;
            if index >= count {
                return Err(ForgeError::DecodeError(format!(
                    "{}: node {} has index {} but there are {} nodes",
                    name, node.name, index, count
                )));
            }
            if slot[index].replace(position).is_some() {
                return Err(ForgeError::DecodeError(format!(
                    "{}: duplicate node index {}",
                    name, index
                )));
            }
        }
        let ordered: Vec<&RawNodeRecord> = slot.iter().flatten().map(|p| &nodes[*p]).collect();

        let mut children = vec![Vec::new(); count];
        let mut roots = Vec::new();
        for node in &ordered {
            match node.parent_index() {
                None => roots.push(node.index as usize),
                Some(parent) if (parent as usize) < count => {
                    children[parent as usize].push(node.index as usize)
                }
                Some(parent) => {
                    return Err(ForgeError::DecodeError(format!(
                        "{}: node {} has parent {} but there are {} nodes",
                        name, node.name, parent, count
                    )))
                }
            }
        }

        if roots.is_empty() {
            return Err(ForgeError::StructuralError("No root nodes found".to_string()));
        }
        if roots.len() > 1 && !self.synthetic_root {
            let names: Vec<&str> = roots.iter().map(|r| ordered[*r].name.as_str()).collect();
            return Err(ForgeError::StructuralError(format!(
                "Expected 1 root node, got: [{}]",
                names.join(", ")
            )));
        }

        let mut reached = HashSet::with_capacity(count);
        let mut stack = roots.clone();
        while let Some(index) = stack.pop() {
            if reached.insert(index) {
                stack.extend(children[index].iter().copied());
            }
        }
        if reached.len() != count {
            let cut: Vec<&str> = (0..count)
                .filter(|i| !reached.contains(i))
                .map(|i| ordered[i].name.as_str())
                .collect();
            return Err(ForgeError::StructuralError(format!(
                "{}: nodes not reachable from a root: [{}]",
                name,
                cut.join(", ")
            )));
        }

        let bones: Vec<NodeId> = ordered
            .iter()
            .map(|node| graph.add_node(node.name.clone(), self.scale.node_transform(&node.transform)))
            .collect();
        for (parent, kids) in children.iter().enumerate() {
            for child in kids {
                graph.set_parent(bones[*child], bones[parent])?;
            }
        }

        let top_level: Vec<NodeId> = roots.iter().map(|r| bones[*r]).collect();
        let root = if self.synthetic_root {
            let root = graph.add_node(ident::normalize(name), Transform::IDENTITY);
            for node in &top_level {
                graph.set_parent(*node, root)?;
            }
            root
        } else {
            top_level[0]
        };

        log::debug!(
            "Built skeleton {} ({} nodes, synthetic root: {})",
            name,
            count,
            self.synthetic_root
        );
        Ok(BuiltSkeleton {
            root,
            bones,
            top_level,
            synthetic: self.synthetic_root,
        })
    }

    /// Move a synthetic root to the frame-0 translation of its first child
    /// in `idle`. Rotation is left alone. Returns whether the pose was applied.
    pub fn apply_idle_pose(&self, graph: &mut SceneGraph, skeleton: &BuiltSkeleton, idle: &AnimationRecord) -> bool {
        let Some(first) = skeleton.animation_root() else {
            return false;
        };
        let Some(original) = skeleton.original_index(first) else {
            return false;
        };
        let sample = idle
            .node_indices
            .iter()
            .position(|n| *n as usize == original)
            .and_then(|slot| idle.samples.get(slot));
        match sample {
            Some(sample) => {
                graph.node_mut(skeleton.root).transform.position = self.scale.point(sample.position);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use vobforge_decode::AnimationSample;

    fn node(index: u32, name: &str, parent: u32, t: [f32; 3]) -> RawNodeRecord {
        RawNodeRecord {
            index,
            name: name.into(),
            parent,
            transform: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [t[0], t[1], t[2], 1.0],
            ],
        }
    }

    fn humans() -> Vec<RawNodeRecord> {
        vec![
            node(0, "BIP01", NO_PARENT, [0.0, 90.0, 0.0]),
            node(1, "BIP01 PELVIS", 0, [0.0, 5.0, 0.0]),
            node(2, "BIP01 SPINE", 1, [0.0, 10.0, 0.0]),
            node(3, "BIP01 L THIGH", 1, [10.0, -5.0, 0.0]),
            node(4, "BIP01 HEAD", 2, [0.0, 40.0, 0.0]),
        ]
    }

    #[test]
    fn test_single_root_node_count() {
        let mut graph = SceneGraph::new();
        let skeleton = SkeletonBuilder::new(UnitScale::CENTIMETRES)
            .build("HUMANS.MDH", &humans(), &mut graph)
            .unwrap();
        assert_eq!(graph.len(), 5);
        assert_eq!(skeleton.bones.len(), 5);
        assert!(!skeleton.is_synthetic());
        assert_eq!(skeleton.root, skeleton.bones[0]);
        assert_eq!(graph.node(skeleton.bones[4]).name, "BIP01 HEAD");
        let head = graph.world_matrix(skeleton.bones[4]).transform_point3(Vec3::ZERO);
        assert!((head - Vec3::new(0.0, 1.45, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_out_of_order_records() {
        let mut nodes = humans();
        nodes.reverse();
        let mut graph = SceneGraph::new();
        let skeleton = SkeletonBuilder::new(UnitScale::CENTIMETRES)
            .build("HUMANS", &nodes, &mut graph)
            .unwrap();
        assert_eq!(graph.node(skeleton.bones[0]).name, "BIP01");
        assert_eq!(graph.node(skeleton.bones[3]).name, "BIP01 L THIGH");
    }

    #[test]
    fn test_multiple_roots_are_ambiguous() {
        let mut nodes = humans();
        nodes.push(node(5, "ZS_RIGHTHAND", NO_PARENT, [0.0; 3]));
        let mut graph = SceneGraph::new();
        let err = SkeletonBuilder::new(UnitScale::CENTIMETRES)
            .build("HUMANS", &nodes, &mut graph)
            .unwrap_err();
        match err {
            ForgeError::StructuralError(msg) => {
                assert_eq!(msg, "Expected 1 root node, got: [BIP01, ZS_RIGHTHAND]")
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(graph.is_empty());
    }

    #[test]
    fn test_no_roots() {
        let nodes = vec![node(0, "A", 1, [0.0; 3]), node(1, "B", 0, [0.0; 3])];
        for synthetic in [false, true] {
            let mut graph = SceneGraph::new();
            let err = SkeletonBuilder::new(UnitScale::CENTIMETRES)
                .with_synthetic_root(synthetic)
                .build("LOOP", &nodes, &mut graph)
                .unwrap_err();
            assert!(matches!(err, ForgeError::StructuralError(_)));
        }
    }

    #[test]
    fn test_unreachable_cycle() {
        let nodes = vec![
            node(0, "ROOT", NO_PARENT, [0.0; 3]),
            node(1, "A", 2, [0.0; 3]),
            node(2, "B", 1, [0.0; 3]),
        ];
        let mut graph = SceneGraph::new();
        let err = SkeletonBuilder::new(UnitScale::CENTIMETRES)
            .build("CYCLE", &nodes, &mut graph)
            .unwrap_err();
        assert!(matches!(err, ForgeError::StructuralError(_)));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_bad_indices() {
        let nodes = vec![node(0, "A", NO_PARENT, [0.0; 3]), node(0, "B", 0, [0.0; 3])];
        let mut graph = SceneGraph::new();
        let builder = SkeletonBuilder::new(UnitScale::CENTIMETRES);
        assert!(matches!(
            builder.build("DUP", &nodes, &mut graph),
            Err(ForgeError::DecodeError(_))
        ));
        let nodes = vec![node(0, "A", NO_PARENT, [0.0; 3]), node(1, "B", 7, [0.0; 3])];
        assert!(matches!(
            builder.build("PARENT", &nodes, &mut graph),
            Err(ForgeError::DecodeError(_))
        ));
    }

    #[test]
    fn test_parent_index_roundtrip() {
        let nodes = humans();
        let mut graph = SceneGraph::new();
        let skeleton = SkeletonBuilder::new(UnitScale::CENTIMETRES)
            .build("HUMANS", &nodes, &mut graph)
            .unwrap();
        let expected: Vec<u32> = nodes.iter().map(|n| n.parent).collect();
        assert_eq!(parent_indices(&graph, &skeleton), expected);
    }

    #[test]
    fn test_synthetic_root() {
        let mut nodes = humans();
        nodes.push(node(5, "ZS_RIGHTHAND", NO_PARENT, [0.0; 3]));
        let mut graph = SceneGraph::new();
        let skeleton = SkeletonBuilder::new(UnitScale::CENTIMETRES)
            .with_synthetic_root(true)
            .build("humans.mdh", &nodes, &mut graph)
            .unwrap();
        assert_eq!(graph.len(), 7);
        assert!(skeleton.is_synthetic());
        assert_eq!(graph.node(skeleton.root).name, "HUMANS");
        assert_eq!(graph.children(skeleton.root), &[skeleton.bones[0], skeleton.bones[5]]);
        assert_eq!(skeleton.animation_root(), Some(skeleton.bones[0]));
        assert_eq!(graph.node(skeleton.root).transform, Transform::IDENTITY);

        // Source roots stay parent-less in the flattened form
        let parents = parent_indices(&graph, &skeleton);
        assert_eq!(parents[0], NO_PARENT);
        assert_eq!(parents[5], NO_PARENT);

        let paths = skeleton.bone_paths(&graph);
        assert_eq!(paths[0], "BIP01");
        assert_eq!(paths[4], "BIP01/BIP01 PELVIS/BIP01 SPINE/BIP01 HEAD");
    }

    #[test]
    fn test_idle_pose_moves_synthetic_root_only() {
        let mut graph = SceneGraph::new();
        let builder = SkeletonBuilder::new(UnitScale::CENTIMETRES).with_synthetic_root(true);
        let skeleton = builder.build("HUMANS", &humans(), &mut graph).unwrap();
        let idle = AnimationRecord {
            node_indices: vec![2, 0],
            frame_count: 1,
            fps: 25.0,
            samples: vec![
                AnimationSample {
                    position: [0.0, 10.0, 0.0],
                    rotation: [0.0, 0.0, 0.0, 1.0],
                },
                AnimationSample {
                    position: [0.0, 92.0, 4.0],
                    rotation: [0.0, 0.7071068, 0.0, 0.7071068],
                },
            ],
            next: String::new(),
        };
        assert!(builder.apply_idle_pose(&mut graph, &skeleton, &idle));
        let root = graph.node(skeleton.root).transform;
        assert!((root.position - Vec3::new(0.0, 0.92, 0.04)).length() < 1e-5);
        assert_eq!(root.rotation, Quat::IDENTITY);

        // Without a synthetic root there is nothing to offset
        let plain = SkeletonBuilder::new(UnitScale::CENTIMETRES);
        let mut graph = SceneGraph::new();
        let skeleton = plain.build("HUMANS", &humans(), &mut graph).unwrap();
        assert!(!plain.apply_idle_pose(&mut graph, &skeleton, &idle));
    }
}
