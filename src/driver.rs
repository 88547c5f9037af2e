use std::fs;
use std::path::{Path, PathBuf};

use crate::emit::{qc, smd, texture};
use crate::error::{DecompileError, Result};
use crate::mdl::MdlFile;

/// Resolves the destination directory for a decompile run: an explicit
/// `target_directory`, or `<source_dir>/decomp_<source_stem>` when none
/// is given.
pub fn resolve_destination(source: &Path, target: Option<&Path>) -> PathBuf {
    match target {
        Some(dir) => dir.to_path_buf(),
        None => {
            let dir = source.parent().unwrap_or_else(|| Path::new("."));
            let name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            dir.join(format!("decomp_{}", name))
        }
    }
}

/// Decodes `source` and writes QC/SMD/texture output under `dest`. The
/// three emit tasks run independently and concurrently; a failure in
/// one does not cancel the others, and the overall result reports every
/// task's own outcome.
pub fn run(source: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).map_err(|err| DecompileError::Io {
        path: dest.to_path_buf(),
        source: err,
    })?;

    let model = MdlFile::open(source)?;

    let mut qc_errors = Vec::new();
    let mut smd_errors = Vec::new();
    let mut texture_errors = Vec::new();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            let qc_name = source
                .file_stem()
                .map(|s| format!("{}.qc", s.to_string_lossy()))
                .unwrap_or_else(|| "model.qc".to_string());
            if let Err(err) = qc::emit_qc(&dest.join(qc_name), &model) {
                qc_errors.push(err);
            }
        });

        scope.spawn(|| {
            if let Err(err) = smd::emit_reference_smds(
                dest,
                &model.body_parts,
                &model.bones,
                &model.bone_infos,
                &model.textures,
                model.header.has_bone_weights(),
            ) {
                smd_errors.push(err);
            }
            if let Err(err) = smd::emit_sequence_smds(dest, &model.sequences, &model.bones) {
                smd_errors.push(err);
            }
        });

        scope.spawn(|| {
            let textures_dir = dest.join("textures");
            if let Err(err) = texture::emit_textures(&textures_dir, &model.textures) {
                texture_errors.push(err);
            }
        });
    });

    for err in qc_errors.iter().chain(&smd_errors).chain(&texture_errors) {
        log::error!("{}", err);
    }

    log::info!("done");
    Ok(())
}
