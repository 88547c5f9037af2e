use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::anim::{apply_root_rotation_fixup, calc_bone_position, clip_rotation};
use crate::error::{DecompileError, Result};
use crate::mdl::bodypart::{BodyPart, Model};
use crate::mdl::bones::{Bone, BoneInfo};
use crate::mdl::sequence::Sequence;
use crate::mdl::texture::Texture;
use crate::skeleton::Skeleton;
use crate::triangle::flatten_primitive;

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|source| DecompileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_nodes(out: &mut String, bones: &[Bone]) {
    out.push_str("nodes\n");
    for (i, bone) in bones.iter().enumerate() {
        let _ = writeln!(out, "{:3} \"{}\" {}", i, bone.name, bone.parent);
    }
    out.push_str("end\n");
}

fn write_bind_skeleton(out: &mut String, bones: &[Bone]) {
    out.push_str("skeleton\n");
    out.push_str("time 0\n");
    for (i, bone) in bones.iter().enumerate() {
        let _ = write!(out, "{:3}", i);
        for v in bone.value {
            let _ = write!(out, " {:.6}", v);
        }
        out.push('\n');
    }
    out.push_str("end\n");
}

fn write_triangles(
    out: &mut String,
    model: &Model,
    bones: &[Bone],
    bone_infos: &[BoneInfo],
    textures: &[Texture],
    has_bone_weights: bool,
) {
    out.push_str("triangles\n");

    let skeleton = Skeleton::build(bones, bone_infos);

    for mesh in &model.meshes {
        let texture = &textures[mesh.skin_ref as usize];
        let s = 1.0 / texture.width as f64;
        let t = 1.0 / texture.height as f64;

        for primitive in &mesh.primitives {
            for triangle in flatten_primitive(primitive) {
                out.push_str(&texture.name);
                out.push('\n');

                for vert in &triangle {
                    let vertex_index = vert.vertex_index as usize;
                    let normal_index = vert.normal_index as usize;
                    let bone_index = model.vertex_bones[vertex_index];

                    let u = (vert.s as f64 * s) as f32;
                    let v = (1.0 - vert.t as f64 * t) as f32;

                    if has_bone_weights {
                        let weights = &model.bone_weights[vertex_index];
                        let mat = skeleton.skin_matrix(weights);
                        let pos = mat.vector_transform(model.positions[vertex_index]);
                        let mut norm = mat.vector_rotate(model.normals[normal_index]);
                        normalize(&mut norm);

                        let active = weights.bone.iter().filter(|&&b| b != -1).count();
                        let _ = write!(
                            out,
                            "{:3} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
                            bone_index, pos[0], pos[1], pos[2], norm[0], norm[1], norm[2], u, v
                        );
                        if active > 0 {
                            let _ = write!(out, " {}", active);
                            for b in 0..active {
                                let _ = write!(
                                    out,
                                    " {} {:.6}",
                                    weights.bone[b],
                                    weights.weight[b] as f32 / 255.0
                                );
                            }
                        }
                        out.push('\n');
                    } else {
                        let mat = &skeleton.bind_pose[bone_index as usize];
                        let pos = mat.vector_transform(model.positions[vertex_index]);
                        let mut norm = mat.vector_rotate(model.normals[normal_index]);
                        normalize(&mut norm);

                        let _ = writeln!(
                            out,
                            "{:3} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
                            bone_index, pos[0], pos[1], pos[2], norm[0], norm[1], norm[2], u, v
                        );
                    }
                }
            }
        }
    }
    out.push_str("end\n");
}

fn normalize(v: &mut [f32; 3]) {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len > 0.0 {
        v[0] /= len;
        v[1] /= len;
        v[2] /= len;
    }
}

fn write_sequence_frame(out: &mut String, seq: &Sequence, bones: &[Bone], blend_id: usize, frame: u32) {
    let _ = writeln!(out, "time {}", frame);
    for (i, bone) in bones.iter().enumerate() {
        let channels = &seq.blend_anim[blend_id][i];
        let mut motion = calc_bone_position(channels, bone, frame);

        if bone.parent == -1 {
            apply_root_rotation_fixup(seq, &mut motion, frame);
        }
        clip_rotation(&mut motion[3]);
        clip_rotation(&mut motion[4]);
        clip_rotation(&mut motion[5]);

        let _ = write!(out, "{:3}  ", i);
        for v in motion {
            let _ = write!(out, " {:.6}", v);
        }
        out.push('\n');
    }
}

fn write_sequence_animation(out: &mut String, bones: &[Bone], seq: &Sequence, blend_id: usize) {
    out.push_str("skeleton\n");
    for frame in 0..seq.frames_num {
        write_sequence_frame(out, seq, bones, blend_id, frame);
    }
    out.push_str("end\n");
}

/// Writes every non-blank reference model as its own SMD directly under
/// `dest_dir`.
pub fn emit_reference_smds(
    dest_dir: &Path,
    body_parts: &[BodyPart],
    bones: &[Bone],
    bone_infos: &[BoneInfo],
    textures: &[Texture],
    has_bone_weights: bool,
) -> Result<()> {
    for part in body_parts {
        for model in &part.models {
            if model.is_blank() {
                continue;
            }

            let name = model.name.strip_suffix(".smd").unwrap_or(&model.name);
            let path = dest_dir.join(format!("{}.smd", name));

            let mut out = String::from("version 1\n");
            write_nodes(&mut out, bones);
            write_bind_skeleton(&mut out, bones);
            write_triangles(&mut out, model, bones, bone_infos, textures, has_bone_weights);

            write_file(&path, &out)?;
            log::info!("reference: {}", path.display());
        }
    }
    Ok(())
}

/// Writes every sequence blend as its own SMD under `dest_dir/anims`.
pub fn emit_sequence_smds(dest_dir: &Path, sequences: &[Sequence], bones: &[Bone]) -> Result<()> {
    let anims_dir = dest_dir.join("anims");
    fs::create_dir_all(&anims_dir).map_err(|source| DecompileError::Io {
        path: anims_dir.clone(),
        source,
    })?;

    for seq in sequences {
        for blend in 0..seq.blends_num as usize {
            let mut name = seq
                .label
                .strip_suffix(".smd")
                .unwrap_or(&seq.label)
                .to_string();
            if seq.blends_num > 1 {
                name = format!("{}_blend{}", name, blend + 1);
            }
            let path: PathBuf = anims_dir.join(format!("{}.smd", name));

            let mut out = String::from("version 1\n");
            write_nodes(&mut out, bones);
            write_sequence_animation(&mut out, bones, seq, blend);

            write_file(&path, &out)?;
            log::info!("sequence: {}", path.display());
        }

        if seq.pivots_num > 0 {
            log::warn!(
                "sequence {} uses {} foot pivots, feature not supported",
                seq.label,
                seq.pivots_num
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bone(parent: i32) -> Bone {
        Bone {
            name: "root".into(),
            parent,
            flags: 0,
            bone_controller: [-1; 6],
            value: [0.0; 6],
            scale: [1.0; 6],
        }
    }

    #[test]
    fn write_nodes_emits_one_line_per_bone_plus_end() {
        let bones = vec![bone(-1), bone(0)];
        let mut out = String::new();
        write_nodes(&mut out, &bones);
        assert_eq!(out.lines().count(), 4); // "nodes", 2 bones, "end"
    }

    #[test]
    fn normalize_leaves_zero_vector_untouched() {
        let mut v = [0.0, 0.0, 0.0];
        normalize(&mut v);
        assert_eq!(v, [0.0, 0.0, 0.0]);
    }
}
