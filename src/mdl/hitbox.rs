use std::io::{Read, Seek};

use crate::mdl::header::{MdlHeader, HITBOX_RECORD_SIZE, MAX_HITBOXES};
use crate::mdl::reader::ByteReader;
use crate::error::Result;

#[derive(Clone, Copy, Debug)]
pub struct HitBox {
    pub bone: u32,
    pub group: u32,
    pub bbmin: [f32; 3],
    pub bbmax: [f32; 3],
}

impl HitBox {
    fn decode<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<Self> {
        Ok(Self {
            bone: reader.read_u32()?,
            group: reader.read_u32()?,
            bbmin: reader.read_vec3()?,
            bbmax: reader.read_vec3()?,
        })
    }
}

/// Returns the hitbox count to actually use for decoding: either the
/// header's count, or 0 if it fails the sanity check in spec.md §4.2/§8.
/// The caller is responsible for emitting the warning.
pub fn sanitized_hitbox_count(header: &MdlHeader) -> u32 {
    if header.hitboxes_num > MAX_HITBOXES {
        return 0;
    }
    if header
        .hitboxes_offset
        .saturating_add(header.hitboxes_num.saturating_mul(HITBOX_RECORD_SIZE))
        > header.length
    {
        return 0;
    }
    header.hitboxes_num
}

pub fn decode_hitboxes<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    header: &MdlHeader,
) -> Result<Vec<HitBox>> {
    let count = sanitized_hitbox_count(header);
    if count == 0 {
        if header.hitboxes_num != 0 {
            log::warn!(
                "invalid hitbox count/offset ({}, offset {}); dropping hitboxes",
                header.hitboxes_num,
                header.hitboxes_offset
            );
        }
        return Ok(Vec::new());
    }

    reader.seek_to(header.hitboxes_offset)?;
    let mut hitboxes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        hitboxes.push(HitBox::decode(reader)?);
    }
    Ok(hitboxes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_with(hitboxes_num: u32, hitboxes_offset: u32, length: u32) -> MdlHeader {
        MdlHeader {
            magic: 0,
            version: 10,
            name: String::new(),
            length,
            eye_position: [0.0; 3],
            hull_min: [0.0; 3],
            hull_max: [0.0; 3],
            bbmin: [0.0; 3],
            bbmax: [0.0; 3],
            flags: 0,
            bones_num: 0,
            bones_offset: 0,
            bone_controllers_num: 0,
            bone_controllers_offset: 0,
            hitboxes_num,
            hitboxes_offset,
            sequences_num: 0,
            sequences_offset: 0,
            sequence_groups_num: 0,
            sequence_groups_offset: 0,
            textures_num: 0,
            textures_offset: 0,
            textures_data_offset: 0,
            skin_refs_num: 0,
            skin_families_num: 0,
            skins_offset: 0,
            body_parts_num: 0,
            body_parts_offset: 0,
            attachments_num: 0,
            attachments_offset: 0,
            studio_hdr2_offset: 0,
            sounds_offset: 0,
            sound_groups_num: 0,
            sound_groups_offset: 0,
            transitions_num: 0,
            transitions_offset: 0,
        }
    }

    #[test]
    fn count_over_max_is_reset_to_zero() {
        let header = header_with(1000, 0, 1 << 20);
        assert_eq!(sanitized_hitbox_count(&header), 0);
    }

    #[test]
    fn offset_plus_size_over_length_is_reset_to_zero() {
        let header = header_with(4, 100, 200); // 100 + 4*68 = 372 > 200
        assert_eq!(sanitized_hitbox_count(&header), 0);
    }

    #[test]
    fn valid_hitboxes_pass_through() {
        let header = header_with(4, 100, 1_000_000);
        assert_eq!(sanitized_hitbox_count(&header), 4);
    }
}
