use std::io::{Read, Seek};
use std::path::Path;

use crate::error::{DecompileError, Result};
use crate::mdl::reader::ByteReader;

pub const MDL_MAGIC: u32 = 0x54534449; // "IDST"
pub const SEQ_MAGIC: u32 = 0x51534449; // "IDSQ"
pub const STUDIO_VERSION: u32 = 10;

pub const STUDIO_HAS_BONEINFO: u32 = 1 << 30;
pub const STUDIO_HAS_BONEWEIGHTS: u32 = 1 << 31;

pub const STUDIO_NF_FLATSHADE: u32 = 1 << 0;
pub const STUDIO_NF_CHROME: u32 = 1 << 1;
pub const STUDIO_NF_FULLBRIGHT: u32 = 1 << 2;
pub const STUDIO_NF_NOMIPS: u32 = 1 << 3;
pub const STUDIO_NF_NOSMOOTH: u32 = 1 << 4;
pub const STUDIO_NF_ADDITIVE: u32 = 1 << 5;
pub const STUDIO_NF_MASKED: u32 = 1 << 6;
pub const STUDIO_NF_NORMALMAP: u32 = 1 << 7;
pub const STUDIO_NF_SOLID: u32 = 1 << 10;
pub const STUDIO_NF_TWOSIDE: u32 = 1 << 11;

pub const STUDIO_MOTION_X: u32 = 1 << 0;
pub const STUDIO_MOTION_Y: u32 = 1 << 1;
pub const STUDIO_MOTION_Z: u32 = 1 << 2;
pub const STUDIO_MOTION_XR: u32 = 1 << 3;
pub const STUDIO_MOTION_YR: u32 = 1 << 4;
pub const STUDIO_MOTION_ZR: u32 = 1 << 5;
pub const STUDIO_MOTION_LX: u32 = 1 << 6;
pub const STUDIO_MOTION_LY: u32 = 1 << 7;
pub const STUDIO_MOTION_LZ: u32 = 1 << 8;
pub const STUDIO_MOTION_AX: u32 = 1 << 9;
pub const STUDIO_MOTION_AY: u32 = 1 << 10;
pub const STUDIO_MOTION_AZ: u32 = 1 << 11;
pub const STUDIO_MOTION_AXR: u32 = 1 << 12;
pub const STUDIO_MOTION_AYR: u32 = 1 << 13;
pub const STUDIO_MOTION_AZR: u32 = 1 << 14;
pub const STUDIO_MOTION_TYPES: u32 = 0x7FFF;
pub const STUDIO_MOTION_RLOOP: u32 = 0x8000;

pub const MAX_HITBOXES: u32 = 512;
/// Literal on-disk size of a `StudioHitBox` record used in the header's
/// sanity check, per spec.md's own constant (not `size_of::<HitBox>()`;
/// see DESIGN.md).
pub const HITBOX_RECORD_SIZE: u32 = 68;

#[derive(Clone, Debug)]
pub struct MdlHeader {
    pub magic: u32,
    pub version: u32,
    pub name: String,
    pub length: u32,

    pub eye_position: [f32; 3],
    pub hull_min: [f32; 3],
    pub hull_max: [f32; 3],
    pub bbmin: [f32; 3],
    pub bbmax: [f32; 3],

    pub flags: u32,

    pub bones_num: u32,
    pub bones_offset: u32,

    pub bone_controllers_num: u32,
    pub bone_controllers_offset: u32,

    pub hitboxes_num: u32,
    pub hitboxes_offset: u32,

    pub sequences_num: u32,
    pub sequences_offset: u32,

    pub sequence_groups_num: u32,
    pub sequence_groups_offset: u32,

    pub textures_num: u32,
    pub textures_offset: u32,
    pub textures_data_offset: u32,

    pub skin_refs_num: u32,
    pub skin_families_num: u32,
    pub skins_offset: u32,

    pub body_parts_num: u32,
    pub body_parts_offset: u32,

    pub attachments_num: u32,
    pub attachments_offset: u32,

    pub studio_hdr2_offset: u32,
    pub sounds_offset: u32,

    pub sound_groups_num: u32,
    pub sound_groups_offset: u32,

    pub transitions_num: u32,
    pub transitions_offset: u32,
}

impl MdlHeader {
    pub fn decode<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<Self> {
        let magic = reader.read_u32()?;
        let version = reader.read_u32()?;
        let name = reader.read_name::<64>()?;
        let length = reader.read_u32()?;

        let eye_position = reader.read_vec3()?;
        let hull_min = reader.read_vec3()?;
        let hull_max = reader.read_vec3()?;
        let bbmin = reader.read_vec3()?;
        let bbmax = reader.read_vec3()?;

        let flags = reader.read_u32()?;

        let bones_num = reader.read_u32()?;
        let bones_offset = reader.read_u32()?;

        let bone_controllers_num = reader.read_u32()?;
        let bone_controllers_offset = reader.read_u32()?;

        let hitboxes_num = reader.read_u32()?;
        let hitboxes_offset = reader.read_u32()?;

        let sequences_num = reader.read_u32()?;
        let sequences_offset = reader.read_u32()?;

        let sequence_groups_num = reader.read_u32()?;
        let sequence_groups_offset = reader.read_u32()?;

        let textures_num = reader.read_u32()?;
        let textures_offset = reader.read_u32()?;
        let textures_data_offset = reader.read_u32()?;

        let skin_refs_num = reader.read_u32()?;
        let skin_families_num = reader.read_u32()?;
        let skins_offset = reader.read_u32()?;

        let body_parts_num = reader.read_u32()?;
        let body_parts_offset = reader.read_u32()?;

        let attachments_num = reader.read_u32()?;
        let attachments_offset = reader.read_u32()?;

        let studio_hdr2_offset = reader.read_u32()?;
        let sounds_offset = reader.read_u32()?;

        let sound_groups_num = reader.read_u32()?;
        let sound_groups_offset = reader.read_u32()?;

        let transitions_num = reader.read_u32()?;
        let transitions_offset = reader.read_u32()?;

        Ok(Self {
            magic,
            version,
            name,
            length,
            eye_position,
            hull_min,
            hull_max,
            bbmin,
            bbmax,
            flags,
            bones_num,
            bones_offset,
            bone_controllers_num,
            bone_controllers_offset,
            hitboxes_num,
            hitboxes_offset,
            sequences_num,
            sequences_offset,
            sequence_groups_num,
            sequence_groups_offset,
            textures_num,
            textures_offset,
            textures_data_offset,
            skin_refs_num,
            skin_families_num,
            skins_offset,
            body_parts_num,
            body_parts_offset,
            attachments_num,
            attachments_offset,
            studio_hdr2_offset,
            sounds_offset,
            sound_groups_num,
            sound_groups_offset,
            transitions_num,
            transitions_offset,
        })
    }

    pub fn has_bone_info(&self) -> bool {
        self.flags & STUDIO_HAS_BONEINFO != 0
    }

    pub fn has_bone_weights(&self) -> bool {
        self.flags & STUDIO_HAS_BONEWEIGHTS != 0
    }
}

/// Validates magic/version for a main model file, distinguishing the
/// "this is actually an external sequence file" case per spec.md §4.1.
pub fn validate_main_header(header: &MdlHeader, path: &Path) -> Result<()> {
    if header.magic != MDL_MAGIC {
        if header.magic == SEQ_MAGIC {
            return Err(DecompileError::NotMainFile {
                path: path.to_path_buf(),
            });
        }
        return Err(DecompileError::BadMagic {
            path: path.to_path_buf(),
        });
    }
    if header.version != STUDIO_VERSION {
        return Err(DecompileError::BadVersion {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

pub fn validate_sequence_header(header: &MdlHeader, path: &Path) -> Result<()> {
    if header.magic != SEQ_MAGIC {
        return Err(DecompileError::NotSequenceFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn minimal_header_bytes(magic: u32, version: u32) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&magic.to_le_bytes());
        data.extend_from_slice(&version.to_le_bytes());
        data.extend_from_slice(&[0u8; 64]); // name
        data.extend_from_slice(&0u32.to_le_bytes()); // length
        for _ in 0..(3 * 5) {
            data.extend_from_slice(&0f32.to_le_bytes()); // 5 vec3s
        }
        data.extend_from_slice(&0u32.to_le_bytes()); // flags
        for _ in 0..30 {
            data.extend_from_slice(&0u32.to_le_bytes());
        }
        data
    }

    #[test]
    fn rejects_wrong_magic() {
        let data = minimal_header_bytes(0x11111111, STUDIO_VERSION);
        let mut reader = ByteReader::new(Cursor::new(data), "x.mdl");
        let header = MdlHeader::decode(&mut reader).unwrap();
        let err = validate_main_header(&header, Path::new("x.mdl")).unwrap_err();
        assert!(matches!(err, DecompileError::BadMagic { .. }));
    }

    #[test]
    fn reports_sequence_file_as_not_main() {
        let data = minimal_header_bytes(SEQ_MAGIC, STUDIO_VERSION);
        let mut reader = ByteReader::new(Cursor::new(data), "x.mdl");
        let header = MdlHeader::decode(&mut reader).unwrap();
        let err = validate_main_header(&header, Path::new("x.mdl")).unwrap_err();
        assert!(matches!(err, DecompileError::NotMainFile { .. }));
    }

    #[test]
    fn rejects_wrong_version() {
        let data = minimal_header_bytes(MDL_MAGIC, 14);
        let mut reader = ByteReader::new(Cursor::new(data), "x.mdl");
        let header = MdlHeader::decode(&mut reader).unwrap();
        let err = validate_main_header(&header, Path::new("x.mdl")).unwrap_err();
        assert!(matches!(err, DecompileError::BadVersion { .. }));
    }
}
