use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::activity::{activity_name, motion_type_string};
use crate::error::{DecompileError, Result};
use crate::mdl::header::{
    MdlHeader, STUDIO_NF_ADDITIVE, STUDIO_NF_CHROME, STUDIO_NF_FLATSHADE, STUDIO_NF_FULLBRIGHT,
    STUDIO_NF_MASKED, STUDIO_NF_NOMIPS, STUDIO_NF_NOSMOOTH, STUDIO_NF_SOLID, STUDIO_NF_TWOSIDE,
    STUDIO_MOTION_RLOOP,
};
use crate::mdl::MdlFile;

fn write_body_group_info(out: &mut String, graph: &MdlFile) {
    out.push_str("\n// reference mesh(es)\n");
    for part in &graph.body_parts {
        let part_name = part.name.strip_suffix(".smd").unwrap_or(&part.name);

        if part.models.len() == 1 {
            let model_name = part.models[0].name.strip_suffix(".smd").unwrap_or(&part.models[0].name);
            let _ = writeln!(out, "$body \"{}\" \"{}\"\n", part_name, model_name);
            continue;
        }

        let _ = writeln!(out, "$bodygroup \"{}\"\n{{", part_name);
        for model in &part.models {
            if model.is_blank() {
                out.push_str("\tblank\n");
                continue;
            }
            let model_name = model.name.strip_suffix(".smd").unwrap_or(&model.name);
            let _ = writeln!(out, "\tstudio \"{}\"", model_name);
        }
        out.push_str("}\n\n");
    }
}

fn write_texture_render_mode(out: &mut String, graph: &MdlFile) {
    for tex in &graph.textures {
        let flags = tex.flags;
        if flags & STUDIO_NF_FLATSHADE != 0 {
            let _ = writeln!(out, "$texrendermode \"{}\" \"flatshade\" ", tex.name);
        }
        if flags & STUDIO_NF_CHROME != 0 {
            let _ = writeln!(out, "$texrendermode \"{}\" \"chrome\" ", tex.name);
        }
        if flags & STUDIO_NF_FULLBRIGHT != 0 {
            let _ = writeln!(out, "$texrendermode \"{}\" \"fullbright\" ", tex.name);
        }
        if flags & STUDIO_NF_NOMIPS != 0 {
            let _ = writeln!(out, "$texrendermode \"{}\" \"nomips\" ", tex.name);
        }
        if flags & STUDIO_NF_NOSMOOTH != 0 {
            let _ = writeln!(out, "$texrendermode \"{}\" \"alpha\" ", tex.name);
            let _ = writeln!(out, "$texrendermode \"{}\" \"nosmooth\" ", tex.name);
        }
        if flags & STUDIO_NF_ADDITIVE != 0 {
            let _ = writeln!(out, "$texrendermode \"{}\" \"additive\" ", tex.name);
        }
        if flags & STUDIO_NF_MASKED != 0 {
            let _ = writeln!(out, "$texrendermode \"{}\" \"masked\" ", tex.name);
        }
        if flags & (STUDIO_NF_MASKED | STUDIO_NF_SOLID) != 0 {
            let _ = writeln!(out, "$texrendermode \"{}\" \"masked_solid\" ", tex.name);
        }
        if flags & STUDIO_NF_TWOSIDE != 0 {
            let _ = writeln!(out, "$texrendermode \"{}\" \"twoside\" ", tex.name);
        }
    }
}

fn write_skin_family_info(out: &mut String, graph: &MdlFile) {
    if graph.skin_families.len() < 2 {
        return;
    }

    let _ = writeln!(out, "\n// {} skin families", graph.skin_families.len());
    out.push_str("$texturegroup skinfamilies \n{\n");

    for family in &graph.skin_families {
        out.push('\t');
        out.push('{');
        for (i, &skin_ref) in family.iter().enumerate() {
            let differs = graph
                .skin_families
                .iter()
                .any(|other| other[i] != skin_ref);
            if differs {
                let _ = write!(out, " \"{}\" ", graph.textures[skin_ref as usize].name);
            }
        }
        out.push_str("}\n");
    }
    out.push_str("}\n");
}

fn write_attachment_info(out: &mut String, graph: &MdlFile) {
    if graph.attachments.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n// {} attachment(s)", graph.attachments.len());
    for (i, attachment) in graph.attachments.iter().enumerate() {
        let bone = &graph.bones[attachment.bone as usize];
        let _ = writeln!(
            out,
            "$attachment {} \"{}\" {:.6} {:.6} {:.6}",
            i, bone.name, attachment.origin[0], attachment.origin[1], attachment.origin[2]
        );
    }
}

fn write_controller_info(out: &mut String, graph: &MdlFile) {
    if graph.bone_controllers.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n// {} bone controller(s)", graph.bone_controllers.len());
    for bc in &graph.bone_controllers {
        let bone = &graph.bones[bc.bone as usize];
        let motion = motion_type_string(bc.motion_type & !STUDIO_MOTION_RLOOP, false);
        let _ = writeln!(
            out,
            "$controller {} \"{}\" {} {:.6} {:.6}",
            bc.index, bone.name, motion, bc.start, bc.end
        );
    }
}

fn write_hitbox_info(out: &mut String, graph: &MdlFile) {
    if graph.hitboxes.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n// {} hit box(es)", graph.hitboxes.len());
    for hb in &graph.hitboxes {
        let bone = &graph.bones[hb.bone as usize];
        let _ = writeln!(
            out,
            "$hbox {} \"{}\" {:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
            hb.group,
            bone.name,
            hb.bbmin[0],
            hb.bbmin[1],
            hb.bbmin[2],
            hb.bbmax[0],
            hb.bbmax[1],
            hb.bbmax[2]
        );
    }
}

fn write_sequence_info(out: &mut String, graph: &MdlFile) {
    if graph.header.sequence_groups_num > 1 {
        out.push_str("\n$sequencegroupsize 64\n");
    }

    if !graph.sequences.is_empty() {
        let _ = writeln!(out, "\n// {} animation sequence(s)", graph.sequences.len());
    }

    for seq in &graph.sequences {
        let _ = write!(out, "$sequence \"{}\" ", seq.label);

        if seq.blends_num > 1 {
            if seq.blends_num > 2 {
                out.push_str("{\n");
                for j in 1..=seq.blends_num {
                    out.push_str("          ");
                    let _ = write!(out, "\"{}_blend{}\" \n", seq.label, j);
                }
                out.push_str("          ");
            } else {
                let _ = write!(out, "\"{}_blend1\" \"{}_blend2\" ", seq.label, seq.label);
            }
            let _ = write!(
                out,
                "blend {} {:.0} {:.0}",
                motion_type_string(seq.blend_ranges[0].blend_type, false),
                seq.blend_ranges[0].start,
                seq.blend_ranges[0].end
            );
        } else {
            let _ = write!(out, "\"{}\"", seq.label);
        }

        if seq.motion_type > 0 {
            out.push_str(&motion_type_string(seq.motion_type, true));
        }

        let _ = write!(out, " fps {:.0} ", seq.fps);

        if seq.flags == 1 {
            out.push_str("loop ");
        }

        if seq.activity > 0 {
            match activity_name(seq.activity) {
                Some(name) => {
                    let _ = write!(out, "{} {} ", name, seq.activity_weight);
                }
                None => {
                    log::warn!(
                        "sequence {} has a custom activity flag (ACT_{} {})",
                        seq.label,
                        seq.activity,
                        seq.activity_weight
                    );
                    let _ = write!(out, "ACT_{} {} ", seq.activity, seq.activity_weight);
                }
            }
        }

        if seq.entry_node != 0 && seq.exit_node != 0 {
            if seq.entry_node == seq.exit_node {
                let _ = write!(out, "node {} ", seq.entry_node);
            } else if seq.node_flags != 0 {
                let _ = write!(out, "rtransition {} {} ", seq.entry_node, seq.exit_node);
            } else {
                let _ = write!(out, "transition {} {} ", seq.entry_node, seq.exit_node);
            }
        }

        if seq.events.len() > 2 {
            out.push_str("{\n ");
            for ev in &seq.events {
                out.push_str(if seq.blends_num <= 2 { " " } else { "          " });
                let _ = write!(out, "{{ event {} {}", ev.event, ev.frame);
                let options = ev.options_str();
                if !options.is_empty() {
                    let _ = write!(out, " \"{}\"", options);
                }
                out.push_str(" }\n ");
            }
            out.push('}');
        } else {
            for ev in &seq.events {
                let _ = write!(out, "{{ event {} {}", ev.event, ev.frame);
                let options = ev.options_str();
                if !options.is_empty() {
                    let _ = write!(out, " \"{}\"", options);
                }
                out.push_str(" } ");
            }
        }

        out.push('\n');

        if seq.blends_num > 2 {
            out.push_str("}\n");
        }

        if seq.pivots_num > 0 {
            log::warn!(
                "sequence {} uses {} foot pivots, feature not supported",
                seq.label,
                seq.pivots_num
            );
        }
    }
}

fn write_header_comment(out: &mut String, header: &MdlHeader, source_path: &Path) {
    out.push_str("/*\n");
    out.push_str("==============================================================================\n\n");
    out.push_str("QC script reconstructed by a Studio MDL decompiler\n\n");
    let _ = writeln!(out, "{}\n", source_path.display());
    out.push_str("Original internal name:\n");
    let _ = writeln!(out, "\"{}\"\n", header.name);
    out.push_str("==============================================================================\n");
    out.push_str("*/\n\n");
}

/// Renders the full QC script for `graph` into `dest_path`.
pub fn emit_qc(dest_path: &Path, graph: &MdlFile) -> Result<()> {
    let mut out = String::new();
    write_header_comment(&mut out, &graph.header, &graph.source_path);

    let model_name = graph
        .source_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let _ = writeln!(out, "$modelname \"{}\"", model_name);
    out.push_str("$cd \".\\\"\n");
    out.push_str("$cdtexture \".\\\"\n");
    out.push_str("$scale 1.0\n");
    out.push_str("$cliptotextures\n\n");

    if graph.header.textures_num == 0 {
        out.push_str("$externaltextures\n");
    }

    if graph.header.flags != 0 {
        let _ = writeln!(out, "$flags {}", graph.header.flags);
        log::warn!("this model uses the $flags keyword set to {}", graph.header.flags);
    }

    out.push('\n');
    let h = &graph.header;
    let _ = writeln!(
        out,
        "$bbox {:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
        h.bbmin[0], h.bbmin[1], h.bbmin[2], h.bbmax[0], h.bbmax[1], h.bbmax[2]
    );
    let _ = writeln!(
        out,
        "$cbox {:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
        h.bbmin[0], h.bbmin[1], h.bbmin[2], h.bbmax[0], h.bbmax[1], h.bbmax[2]
    );
    let _ = writeln!(
        out,
        "$eyeposition {:.6} {:.6} {:.6}",
        h.eye_position[0], h.eye_position[1], h.eye_position[2]
    );
    out.push('\n');

    write_body_group_info(&mut out, graph);
    write_texture_render_mode(&mut out, graph);
    write_skin_family_info(&mut out, graph);
    write_attachment_info(&mut out, graph);
    write_controller_info(&mut out, graph);
    write_hitbox_info(&mut out, graph);
    write_sequence_info(&mut out, graph);

    out.push_str("\n// End of QC script.\n");

    fs::write(dest_path, &out).map_err(|source| DecompileError::Io {
        path: dest_path.to_path_buf(),
        source,
    })?;
    log::info!("QC script: {}", dest_path.display());
    Ok(())
}
