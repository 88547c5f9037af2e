use std::io::{Read, Seek};

use crate::error::Result;
use crate::mdl::header::MdlHeader;
use crate::mdl::reader::ByteReader;

/// A bone weight slot; `bone == -1` marks an unused slot (spec.md's
/// sentinel for "fewer than four bones influence this vertex").
#[derive(Clone, Copy, Debug)]
pub struct BoneWeight {
    pub bone: [i8; 4],
    pub weight: [u8; 4],
}

#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    pub vertex_index: u16,
    pub normal_index: u16,
    pub s: i16,
    pub t: i16,
}

impl Triangle {
    fn decode<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<Self> {
        Ok(Self {
            vertex_index: reader.read_u16()?,
            normal_index: reader.read_u16()?,
            s: reader.read_i16()?,
            t: reader.read_i16()?,
        })
    }
}

/// One triangle-fan or triangle-strip primitive, as decoded from the raw
/// header-prefixed stream. A positive header denotes a fan, negative a
/// strip; the stream terminates on a zero header.
#[derive(Clone, Debug)]
pub enum Primitive {
    Fan(Vec<Triangle>),
    Strip(Vec<Triangle>),
}

fn decode_primitives<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<Vec<Primitive>> {
    let mut primitives = Vec::new();
    loop {
        let header = reader.read_i16()?;
        if header == 0 {
            break;
        }
        let count = header.unsigned_abs() as usize;
        let mut triangles = Vec::with_capacity(count);
        for _ in 0..count {
            triangles.push(Triangle::decode(reader)?);
        }
        primitives.push(if header > 0 {
            Primitive::Fan(triangles)
        } else {
            Primitive::Strip(triangles)
        });
    }
    Ok(primitives)
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub triangles_num: u32,
    pub skin_ref: u32,
    pub normals_num: u32,
    pub primitives: Vec<Primitive>,
}

impl Mesh {
    fn decode_header<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<(Self, u32)> {
        let triangles_num = reader.read_u32()?;
        let triangles_offset = reader.read_u32()?;
        let skin_ref = reader.read_u32()?;
        let normals_num = reader.read_u32()?;
        let _normals_index = reader.read_u32()?;
        Ok((
            Self {
                triangles_num,
                skin_ref,
                normals_num,
                primitives: Vec::new(),
            },
            triangles_offset,
        ))
    }
}

#[derive(Clone, Debug)]
pub struct Model {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub vertex_bones: Vec<i8>,
    pub normals: Vec<[f32; 3]>,
    pub bone_weights: Vec<BoneWeight>,
    pub meshes: Vec<Mesh>,
}

impl Model {
    /// Spec.md's sentinel: a body-part model named exactly "blank" has no
    /// geometry and must be skipped by every downstream emitter.
    pub fn is_blank(&self) -> bool {
        self.name == "blank"
    }

    fn decode<R: Read + Seek>(reader: &mut ByteReader<R>, has_bone_weights: bool) -> Result<Self> {
        let name = reader.read_name::<64>()?;
        let _type = reader.read_i32()?;
        let _bounding_radius = reader.read_f32()?;

        let meshes_num = reader.read_u32()?;
        let meshes_offset = reader.read_u32()?;

        let vertices_num = reader.read_u32()?;
        let vertex_info_offset = reader.read_u32()?;
        let vertices_offset = reader.read_u32()?;

        let normals_num = reader.read_u32()?;
        let _normal_info_offset = reader.read_u32()?;
        let normals_offset = reader.read_u32()?;

        let blend_vert_info_offset = reader.read_u32()?;
        let _blend_norm_info_offset = reader.read_u32()?;

        if name == "blank" {
            return Ok(Self {
                name,
                positions: Vec::new(),
                vertex_bones: Vec::new(),
                normals: Vec::new(),
                bone_weights: Vec::new(),
                meshes: Vec::new(),
            });
        }

        let saved = reader.position()?;

        reader.seek_to(meshes_offset)?;
        let mut mesh_table = Vec::with_capacity(meshes_num as usize);
        for _ in 0..meshes_num {
            mesh_table.push(Mesh::decode_header(reader)?);
        }
        let mut meshes = Vec::with_capacity(mesh_table.len());
        for (mut mesh, triangles_offset) in mesh_table {
            reader.seek_to(triangles_offset)?;
            mesh.primitives = decode_primitives(reader)?;
            meshes.push(mesh);
        }

        reader.seek_to(vertices_offset)?;
        let mut positions = Vec::with_capacity(vertices_num as usize);
        for _ in 0..vertices_num {
            positions.push(reader.read_vec3()?);
        }

        reader.seek_to(vertex_info_offset)?;
        let mut vertex_bones = Vec::with_capacity(vertices_num as usize);
        for _ in 0..vertices_num {
            vertex_bones.push(reader.read_i8()?);
        }

        reader.seek_to(normals_offset)?;
        let mut normals = Vec::with_capacity(normals_num as usize);
        for _ in 0..normals_num {
            normals.push(reader.read_vec3()?);
        }

        let bone_weights = if has_bone_weights {
            reader.seek_to(blend_vert_info_offset)?;
            let mut weights = Vec::with_capacity(vertices_num as usize);
            for _ in 0..vertices_num {
                let mut weight = [0u8; 4];
                for w in weight.iter_mut() {
                    *w = reader.read_u8()?;
                }
                let mut bone = [0i8; 4];
                for b in bone.iter_mut() {
                    *b = reader.read_i8()?;
                }
                weights.push(BoneWeight { bone, weight });
            }
            weights
        } else {
            Vec::new()
        };

        reader.seek_to_raw(saved)?;

        Ok(Self {
            name,
            positions,
            vertex_bones,
            normals,
            bone_weights,
            meshes,
        })
    }
}

#[derive(Clone, Debug)]
pub struct BodyPart {
    pub name: String,
    pub base: u32,
    pub models: Vec<Model>,
}

impl BodyPart {
    fn decode_header<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<(Self, u32, u32)> {
        let name = reader.read_name::<64>()?;
        let models_num = reader.read_u32()?;
        let base = reader.read_u32()?;
        let models_offset = reader.read_u32()?;
        Ok((
            Self {
                name,
                base,
                models: Vec::new(),
            },
            models_num,
            models_offset,
        ))
    }
}

pub fn decode_body_parts<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    header: &MdlHeader,
) -> Result<Vec<BodyPart>> {
    reader.seek_to(header.body_parts_offset)?;
    let mut entries = Vec::with_capacity(header.body_parts_num as usize);
    for _ in 0..header.body_parts_num {
        entries.push(BodyPart::decode_header(reader)?);
    }

    let has_bone_weights = header.has_bone_weights();
    let mut body_parts = Vec::with_capacity(entries.len());
    for (mut part, models_num, models_offset) in entries {
        reader.seek_to(models_offset)?;
        let mut models = Vec::with_capacity(models_num as usize);
        for _ in 0..models_num {
            models.push(Model::decode(reader, has_bone_weights)?);
        }
        part.models = models;
        body_parts.push(part);
    }
    Ok(body_parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn primitive_stream_fan_positive_strip_negative() {
        let mut data = Vec::new();
        // fan of 1 triangle
        data.extend_from_slice(&1i16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&0i16.to_le_bytes());
        data.extend_from_slice(&0i16.to_le_bytes());
        // strip of 1 triangle
        data.extend_from_slice(&(-1i16).to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&0i16.to_le_bytes());
        data.extend_from_slice(&0i16.to_le_bytes());
        // terminator
        data.extend_from_slice(&0i16.to_le_bytes());

        let mut reader = ByteReader::new(Cursor::new(data), "m.mdl");
        let primitives = decode_primitives(&mut reader).unwrap();
        assert_eq!(primitives.len(), 2);
        assert!(matches!(primitives[0], Primitive::Fan(_)));
        assert!(matches!(primitives[1], Primitive::Strip(_)));
    }

    #[test]
    fn blank_model_name_is_detected() {
        let model = Model {
            name: "blank".to_string(),
            positions: Vec::new(),
            vertex_bones: Vec::new(),
            normals: Vec::new(),
            bone_weights: Vec::new(),
            meshes: Vec::new(),
        };
        assert!(model.is_blank());
    }
}
