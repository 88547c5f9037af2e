use std::io::{Read, Seek};

use crate::error::Result;
use crate::mdl::header::{MdlHeader, STUDIO_MOTION_RLOOP};
use crate::mdl::reader::ByteReader;

#[derive(Clone, Debug)]
pub struct Bone {
    pub name: String,
    pub parent: i32,
    pub flags: u32,
    pub bone_controller: [i32; 6],
    /// Default DoF values: (tx, ty, tz, rx, ry, rz)
    pub value: [f32; 6],
    /// Per-DoF scale factors applied to decoded anim deltas.
    pub scale: [f32; 6],
}

impl Bone {
    fn decode<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<Self> {
        let name = reader.read_name::<32>()?;
        let parent = reader.read_i32()?;
        let flags = reader.read_u32()?;
        let mut bone_controller = [0i32; 6];
        for v in bone_controller.iter_mut() {
            *v = reader.read_i32()?;
        }
        let mut value = [0f32; 6];
        for v in value.iter_mut() {
            *v = reader.read_f32()?;
        }
        let mut scale = [0f32; 6];
        for v in scale.iter_mut() {
            *v = reader.read_f32()?;
        }
        Ok(Self {
            name,
            parent,
            flags,
            bone_controller,
            value,
            scale,
        })
    }
}

/// Pose-to-bone composition data, present only when the header's
/// "has bone info" flag is set.
#[derive(Clone, Debug)]
pub struct BoneInfo {
    pub pose_to_bone: [[f32; 4]; 3],
    pub q_alignment: [f32; 4],
    pub proc_type: i32,
    pub proc_index: i32,
}

impl BoneInfo {
    fn decode<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<Self> {
        let mut pose_to_bone = [[0f32; 4]; 3];
        for row in pose_to_bone.iter_mut() {
            for v in row.iter_mut() {
                *v = reader.read_f32()?;
            }
        }
        let mut q_alignment = [0f32; 4];
        for v in q_alignment.iter_mut() {
            *v = reader.read_f32()?;
        }
        let proc_type = reader.read_i32()?;
        let proc_index = reader.read_i32()?;
        // quat + 10 reserved i32s, unused downstream
        for _ in 0..4 {
            reader.read_f32()?;
        }
        for _ in 0..10 {
            reader.read_i32()?;
        }
        Ok(Self {
            pose_to_bone,
            q_alignment,
            proc_type,
            proc_index,
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BoneController {
    pub bone: i32,
    pub motion_type: u32,
    pub start: f32,
    pub end: f32,
    pub rest: u32,
    pub index: u32,
}

impl BoneController {
    fn decode<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<Self> {
        Ok(Self {
            bone: reader.read_i32()?,
            motion_type: reader.read_u32()?,
            start: reader.read_f32()?,
            end: reader.read_f32()?,
            rest: reader.read_u32()?,
            index: reader.read_u32()?,
        })
    }

    /// The primary motion-type bit, with the "shortest path" rloop
    /// modifier masked off.
    pub fn primary_motion_type(&self) -> u32 {
        self.motion_type & !STUDIO_MOTION_RLOOP
    }
}

pub fn decode_bones<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    header: &MdlHeader,
) -> Result<(Vec<Bone>, Vec<BoneInfo>)> {
    reader.seek_to(header.bones_offset)?;
    let mut bones = Vec::with_capacity(header.bones_num as usize);
    for _ in 0..header.bones_num {
        bones.push(Bone::decode(reader)?);
    }

    let bone_infos = if header.has_bone_info() {
        let mut infos = Vec::with_capacity(header.bones_num as usize);
        for _ in 0..header.bones_num {
            infos.push(BoneInfo::decode(reader)?);
        }
        infos
    } else {
        Vec::new()
    };

    Ok((bones, bone_infos))
}

pub fn decode_bone_controllers<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    header: &MdlHeader,
) -> Result<Vec<BoneController>> {
    reader.seek_to(header.bone_controllers_offset)?;
    let mut controllers = Vec::with_capacity(header.bone_controllers_num as usize);
    for _ in 0..header.bone_controllers_num {
        controllers.push(BoneController::decode(reader)?);
    }
    Ok(controllers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_index_invariant_holds_for_decoded_bones() {
        let bones = vec![
            Bone {
                name: "root".into(),
                parent: -1,
                flags: 0,
                bone_controller: [-1; 6],
                value: [0.0; 6],
                scale: [1.0; 6],
            },
            Bone {
                name: "child".into(),
                parent: 0,
                flags: 0,
                bone_controller: [-1; 6],
                value: [0.0; 6],
                scale: [1.0; 6],
            },
        ];
        for (i, bone) in bones.iter().enumerate() {
            assert!(bone.parent < i as i32 || bone.parent == -1);
        }
    }

    #[test]
    fn primary_motion_type_masks_rloop_bit() {
        let bc = BoneController {
            bone: 0,
            motion_type: STUDIO_MOTION_RLOOP | 0x1,
            start: 0.0,
            end: 1.0,
            rest: 0,
            index: 0,
        };
        assert_eq!(bc.primary_motion_type(), 0x1);
    }
}
