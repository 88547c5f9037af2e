use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{DecompileError, Result};
use crate::mdl::header::{validate_sequence_header, MdlHeader};
use crate::mdl::reader::ByteReader;
use crate::mdl::sequence::{decode_blend_anim, Sequence};

/// `model.mdl` -> `modelT.mdl`, the separate-textures file GoldSrc loads
/// when the main file's header reports zero embedded textures.
pub fn texture_file_path(main_path: &Path) -> PathBuf {
    companion_path(main_path, "T")
}

/// `model.mdl` -> `model01.mdl`, `model02.mdl`, ... for sequence groups
/// 1..sequence_groups_num (group 0 always lives in the main file).
pub fn sequence_group_path(main_path: &Path, group: u32) -> PathBuf {
    companion_path(main_path, &format!("{:02}", group))
}

fn companion_path(main_path: &Path, suffix: &str) -> PathBuf {
    let stem = main_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = format!("{}{}.mdl", stem, suffix);
    match main_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file_name),
        _ => PathBuf::from(file_name),
    }
}

/// Opens and validates an external sequence group file, returning its
/// reader and header for the caller to pull anim data from. A missing
/// file is a fatal `ExternalMissing`, not a warning: every sequence
/// pointing at this group depends on it for animation data.
pub fn open_sequence_group(path: &Path) -> Result<(ByteReader<BufReader<File>>, MdlHeader)> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DecompileError::ExternalMissing {
                path: path.to_path_buf(),
            }
        } else {
            DecompileError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let mut reader = ByteReader::new(BufReader::new(file), path);
    let header = MdlHeader::decode(&mut reader)?;
    validate_sequence_header(&header, path)?;
    Ok((reader, header))
}

/// Loads anim data for every sequence whose `seq_group` points outside
/// the main file, from the appropriate `<stem>NN.mdl` group file, and
/// folds it back so downstream code can treat every sequence
/// uniformly. A missing or invalid group file is fatal, matching the
/// treatment of a missing external texture file.
pub fn resolve_external_sequences(
    main_path: &Path,
    sequences: &mut [Sequence],
    bones_num: u32,
) -> Result<()> {
    let groups: std::collections::BTreeSet<i32> = sequences
        .iter()
        .filter(|s| s.seq_group > 0)
        .map(|s| s.seq_group)
        .collect();

    for group in groups {
        let path = sequence_group_path(main_path, group as u32);
        let (mut reader, _header) = open_sequence_group(&path)?;

        for seq in sequences.iter_mut().filter(|s| s.seq_group == group) {
            let mut blend_anim = Vec::with_capacity(seq.blends_num as usize);
            for b in 0..seq.blends_num {
                let base = seq.anim_offset + b * bones_num * 12;
                blend_anim.push(decode_blend_anim(&mut reader, base, bones_num, seq.frames_num)?);
            }
            seq.blend_anim = blend_anim;
            seq.seq_group = 0;
        }
    }
    Ok(())
}
