//! Builds bind-pose bone transforms and resolves per-vertex skin
//! matrices from them.

use crate::mdl::bodypart::BoneWeight;
use crate::mdl::bones::{Bone, BoneInfo};
use crate::transform::{bone_local_transform, Mat3x4};

pub struct Skeleton {
    /// Bind-pose transform of each bone in model space.
    pub bind_pose: Vec<Mat3x4>,
    /// `bind_pose[i] x pose_to_bone[i]`, present only when the model
    /// carries bone info; used for blended vertex skinning.
    pub world: Vec<Mat3x4>,
}

impl Skeleton {
    pub fn build(bones: &[Bone], bone_infos: &[BoneInfo]) -> Self {
        let mut bind_pose: Vec<Mat3x4> = Vec::with_capacity(bones.len());
        for bone in bones {
            let local = bone_local_transform(bone.value);
            let transform = if bone.parent >= 0 {
                bind_pose[bone.parent as usize]
                    .concat(&local)
            } else {
                local
            };
            bind_pose.push(transform);
        }

        let world = if !bone_infos.is_empty() {
            bind_pose
                .iter()
                .zip(bone_infos.iter())
                .map(|(bind, info)| {
                    let pose_to_bone = Mat3x4 {
                        rows: [
                            info.pose_to_bone[0].map(|v| v as f64),
                            info.pose_to_bone[1].map(|v| v as f64),
                            info.pose_to_bone[2].map(|v| v as f64),
                        ],
                    };
                    bind.concat(&pose_to_bone)
                })
                .collect()
        } else {
            // No bone info: pose-to-bone is implicitly identity, so the
            // world transform used for skinning is just the bind pose.
            bind_pose.clone()
        };

        Self { bind_pose, world }
    }

    fn active_bone_count(weights: &BoneWeight) -> usize {
        weights.bone.iter().filter(|&&b| b != -1).count()
    }

    /// Blends the bind-pose world matrices of up to four influencing
    /// bones, topping off the first slot's weight when the recorded
    /// weights don't sum to 1.0 (matching the engine's own fallback).
    pub fn skin_matrix(&self, weights: &BoneWeight) -> Mat3x4 {
        let count = Self::active_bone_count(weights);
        let mut normalized = [0f64; 4];
        let mut total = 0f64;
        for i in 0..count {
            normalized[i] = weights.weight[i] as f64 / 255.0;
            total += normalized[i];
        }
        if total < 1.0 && count > 0 {
            normalized[0] += 1.0 - total;
        }

        let mut rows = [[0f64; 4]; 3];
        for i in 0..count {
            let bone_mat = &self.world[weights.bone[i] as usize];
            for j in 0..3 {
                for k in 0..4 {
                    rows[j][k] += bone_mat.rows[j][k] * normalized[i];
                }
            }
        }
        Mat3x4 { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bone(parent: i32) -> Bone {
        Bone {
            name: "b".into(),
            parent,
            flags: 0,
            bone_controller: [-1; 6],
            value: [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            scale: [1.0; 6],
        }
    }

    #[test]
    fn root_bone_bind_pose_is_its_own_local_transform() {
        let bones = vec![bone(-1)];
        let skeleton = Skeleton::build(&bones, &[]);
        assert_eq!(skeleton.bind_pose.len(), 1);
    }

    #[test]
    fn skin_matrix_tops_up_first_slot_when_underweighted() {
        let bones = vec![bone(-1)];
        let skeleton = Skeleton::build(&bones, &[]);
        let weights = BoneWeight {
            bone: [0, -1, -1, -1],
            weight: [100, 0, 0, 0],
        };
        let mat = skeleton.skin_matrix(&weights);
        // A single full-weight influence reproduces that bone's own
        // world matrix exactly, regardless of its recorded weight byte.
        assert_eq!(mat.rows[0][0], skeleton.world[0].rows[0][0]);
    }
}
