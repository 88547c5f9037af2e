pub mod attachment;
pub mod bodypart;
pub mod bones;
pub mod external;
pub mod header;
pub mod hitbox;
pub mod names;
pub mod reader;
pub mod sequence;
pub mod texture;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{DecompileError, Result};

use attachment::Attachment;
use bodypart::BodyPart;
use bones::{Bone, BoneController, BoneInfo};
use header::MdlHeader;
use hitbox::HitBox;
use reader::ByteReader;
use sequence::Sequence;
use texture::Texture;

/// The fully decoded model graph: everything downstream emitters need,
/// with all external files (texture-only and sequence-group companions)
/// already folded in and every name already sanitized.
pub struct MdlFile {
    pub source_path: PathBuf,
    pub header: MdlHeader,
    pub bones: Vec<Bone>,
    pub bone_infos: Vec<BoneInfo>,
    pub bone_controllers: Vec<BoneController>,
    pub hitboxes: Vec<HitBox>,
    pub sequences: Vec<Sequence>,
    pub textures: Vec<Texture>,
    pub skin_families: Vec<Vec<u16>>,
    pub body_parts: Vec<BodyPart>,
    pub attachments: Vec<Attachment>,
}

impl MdlFile {
    pub fn open(path: &Path) -> Result<Self> {
        let ext_ok = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("mdl"))
            .unwrap_or(false);
        if !ext_ok {
            return Err(DecompileError::BadExtension {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path).map_err(|source| DecompileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = ByteReader::new(BufReader::new(file), path);

        let header = MdlHeader::decode(&mut reader)?;
        header::validate_main_header(&header, path)?;

        let (bones, bone_infos) = bones::decode_bones(&mut reader, &header)?;
        let bone_controllers = bones::decode_bone_controllers(&mut reader, &header)?;
        let hitboxes = hitbox::decode_hitboxes(&mut reader, &header)?;
        let mut sequences = sequence::decode_sequences(&mut reader, &header, header.bones_num)?;
        let attachments = attachment::decode_attachments(&mut reader, &header)?;
        let body_parts = bodypart::decode_body_parts(&mut reader, &header)?;

        let (mut textures, skin_families) = if header.textures_num == 0 {
            load_external_textures(path)?
        } else {
            (
                texture::decode_textures(&mut reader, &header)?,
                texture::decode_skin_families(&mut reader, &header)?,
            )
        };

        external::resolve_external_sequences(path, &mut sequences, header.bones_num)?;

        let mut body_parts = body_parts;
        sanitize_names(&mut textures, &mut body_parts, &mut sequences);

        Ok(Self {
            source_path: path.to_path_buf(),
            header,
            bones,
            bone_infos,
            bone_controllers,
            hitboxes,
            sequences,
            textures,
            skin_families,
            body_parts,
            attachments,
        })
    }
}

fn sanitize_names(textures: &mut [Texture], body_parts: &mut [BodyPart], sequences: &mut [Sequence]) {
    let mut sanitizer = names::NameSanitizer::new();

    for texture in textures.iter_mut() {
        texture.name = sanitizer.sanitize_texture(&texture.name);
    }

    for (part_index, part) in body_parts.iter_mut().enumerate() {
        part.name = sanitizer.sanitize_bodypart(&part.name, part_index as u32);
        for (model_index, model) in part.models.iter_mut().enumerate() {
            if model.is_blank() {
                continue;
            }
            model.name = sanitizer.sanitize_model(&model.name, part_index as u32, model_index as u32);
        }
    }

    for seq in sequences.iter_mut() {
        seq.label = sanitizer.sanitize_sequence(&seq.label);
    }
}

fn load_external_textures(main_path: &Path) -> Result<(Vec<Texture>, Vec<Vec<u16>>)> {
    let path = external::texture_file_path(main_path);
    let file = File::open(&path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DecompileError::ExternalMissing { path: path.clone() }
        } else {
            DecompileError::Io {
                path: path.clone(),
                source,
            }
        }
    })?;
    let mut reader = ByteReader::new(BufReader::new(file), &path);
    let header = MdlHeader::decode(&mut reader)?;
    header::validate_main_header(&header, &path)?;
    Ok((
        texture::decode_textures(&mut reader, &header)?,
        texture::decode_skin_families(&mut reader, &header)?,
    ))
}
