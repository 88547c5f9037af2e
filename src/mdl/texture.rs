use std::io::{Read, Seek};

use crate::error::Result;
use crate::mdl::header::MdlHeader;
use crate::mdl::reader::ByteReader;

#[derive(Clone, Debug)]
pub struct Texture {
    pub name: String,
    pub flags: u32,
    pub width: u32,
    pub height: u32,
    /// `width * height` palette indices, row-major (row y, column x maps
    /// to `indices[y * width + x]`).
    pub indices: Vec<u8>,
    /// 256 RGB triples.
    pub palette: [[u8; 3]; 256],
}

impl Texture {
    fn decode_header<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<(String, u32, u32, u32, u32)> {
        let name = reader.read_name::<64>()?;
        let flags = reader.read_u32()?;
        let width = reader.read_u32()?;
        let height = reader.read_u32()?;
        let offset = reader.read_u32()?;
        Ok((name, flags, width, height, offset))
    }
}

pub fn decode_textures<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    header: &MdlHeader,
) -> Result<Vec<Texture>> {
    reader.seek_to(header.textures_offset)?;
    let mut table = Vec::with_capacity(header.textures_num as usize);
    for _ in 0..header.textures_num {
        table.push(Texture::decode_header(reader)?);
    }

    let mut textures = Vec::with_capacity(table.len());
    for (name, flags, width, height, offset) in table {
        reader.seek_to(offset)?;
        let indices = reader.read_bytes((width * height) as usize)?;
        let palette_bytes = reader.read_bytes(256 * 3)?;
        let mut palette = [[0u8; 3]; 256];
        for (i, chunk) in palette_bytes.chunks_exact(3).enumerate() {
            palette[i] = [chunk[0], chunk[1], chunk[2]];
        }
        textures.push(Texture {
            name,
            flags,
            width,
            height,
            indices,
            palette,
        });
    }
    Ok(textures)
}

/// One skin family is a remapping of skin-ref slots to texture indices.
pub fn decode_skin_families<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    header: &MdlHeader,
) -> Result<Vec<Vec<u16>>> {
    reader.seek_to(header.skins_offset)?;
    let mut families = Vec::with_capacity(header.skin_families_num as usize);
    for _ in 0..header.skin_families_num {
        let mut family = Vec::with_capacity(header.skin_refs_num as usize);
        for _ in 0..header.skin_refs_num {
            family.push(reader.read_u16()?);
        }
        families.push(family);
    }
    Ok(families)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decodes_a_single_2x2_texture() {
        let mut data = Vec::new();
        let mut name = [0u8; 64];
        name[..3].copy_from_slice(b"s.b");
        data.extend_from_slice(&name);
        data.extend_from_slice(&0u32.to_le_bytes()); // flags
        data.extend_from_slice(&2u32.to_le_bytes()); // width
        data.extend_from_slice(&2u32.to_le_bytes()); // height
        let offset = data.len() as u32 + 4; // offset right after this u32
        data.extend_from_slice(&offset.to_le_bytes());
        data.extend_from_slice(&[0, 1, 2, 3]); // 2x2 indices
        data.extend_from_slice(&[0u8; 768]); // palette

        let mut reader = ByteReader::new(Cursor::new(data), "t.mdl");
        let header = MdlHeader {
            textures_num: 1,
            textures_offset: 0,
            ..zero_header()
        };
        let textures = decode_textures(&mut reader, &header).unwrap();
        assert_eq!(textures.len(), 1);
        assert_eq!(textures[0].indices, vec![0, 1, 2, 3]);
        assert_eq!(textures[0].palette.len(), 256);
    }

    fn zero_header() -> MdlHeader {
        MdlHeader {
            magic: 0,
            version: 10,
            name: String::new(),
            length: 0,
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
            hitboxes_num: 0,
            hitboxes_offset: 0,
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
}
