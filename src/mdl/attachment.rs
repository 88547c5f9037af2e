use std::io::{Read, Seek};

use crate::error::Result;
use crate::mdl::header::MdlHeader;
use crate::mdl::reader::ByteReader;

#[derive(Clone, Debug)]
pub struct Attachment {
    pub name: String,
    pub attachment_type: i32,
    pub bone: i32,
    pub origin: [f32; 3],
    pub vectors: [[f32; 3]; 3],
}

impl Attachment {
    fn decode<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<Self> {
        let name = reader.read_name::<32>()?;
        let attachment_type = reader.read_i32()?;
        let bone = reader.read_i32()?;
        let origin = reader.read_vec3()?;
        let mut vectors = [[0f32; 3]; 3];
        for v in vectors.iter_mut() {
            *v = reader.read_vec3()?;
        }
        Ok(Self {
            name,
            attachment_type,
            bone,
            origin,
            vectors,
        })
    }
}

pub fn decode_attachments<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    header: &MdlHeader,
) -> Result<Vec<Attachment>> {
    reader.seek_to(header.attachments_offset)?;
    let mut attachments = Vec::with_capacity(header.attachments_num as usize);
    for _ in 0..header.attachments_num {
        attachments.push(Attachment::decode(reader)?);
    }
    Ok(attachments)
}
