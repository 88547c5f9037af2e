use std::io::{Read, Seek};

use crate::error::Result;
use crate::mdl::header::MdlHeader;
use crate::mdl::reader::ByteReader;

#[derive(Clone, Copy, Debug)]
pub struct Event {
    pub frame: i32,
    pub event: i32,
    pub event_type: i32,
    pub options: [u8; 64],
}

impl Event {
    fn decode<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<Self> {
        Ok(Self {
            frame: reader.read_i32()?,
            event: reader.read_i32()?,
            event_type: reader.read_i32()?,
            options: reader.read_array::<64>()?,
        })
    }

    pub fn options_str(&self) -> String {
        crate::mdl::reader::name_from_bytes(&self.options)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BlendRange {
    pub blend_type: u32,
    pub start: f32,
    pub end: f32,
}

/// One RLE-compressed run of a single bone DoF's per-frame values.
/// `valid` is the number of explicit samples in `values`; `total` is how
/// many frames that run covers (the last sample repeats to fill it).
#[derive(Clone, Debug)]
pub struct AnimValue {
    pub valid: u8,
    pub total: u8,
    pub values: Vec<i16>,
}

impl AnimValue {
    fn decode<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<Self> {
        let valid = reader.read_u8()?;
        let total = reader.read_u8()?;
        let mut values = Vec::with_capacity(valid as usize);
        for _ in 0..valid {
            values.push(reader.read_i16()?);
        }
        Ok(Self {
            valid,
            total,
            values,
        })
    }
}

/// A single bone's decoded anim stream for one blend: up to six DoF
/// channels, each a sequence of RLE runs. An empty channel means the
/// bone is static for this blend (use `Bone::value` unmodified).
#[derive(Clone, Debug, Default)]
pub struct BoneAnimChannels {
    pub channels: [Vec<AnimValue>; 6],
}

fn decode_anim_channel<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    start: u64,
    frames_num: u32,
) -> Result<Vec<AnimValue>> {
    reader.seek_to_raw(start)?;
    let mut runs = Vec::new();
    let mut frames_seen: u32 = 0;
    while frames_seen < frames_num {
        let run = AnimValue::decode(reader)?;
        frames_seen += run.total as u32;
        runs.push(run);
    }
    Ok(runs)
}

/// Decodes one blend's worth of per-bone anim data. `anim_base` is the
/// absolute file offset of the blend's `bones_num`-sized offset table;
/// each entry there is six u16 offsets (one per DoF), relative to the
/// two-byte-aligned start of that bone's own entry, or 0 if the DoF is
/// unanimated for this bone.
pub fn decode_blend_anim<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    anim_base: u32,
    bones_num: u32,
    frames_num: u32,
) -> Result<Vec<BoneAnimChannels>> {
    let mut offsets = Vec::with_capacity(bones_num as usize);
    reader.seek_to(anim_base)?;
    for _ in 0..bones_num {
        let mut bone_offsets = [0u16; 6];
        for o in bone_offsets.iter_mut() {
            *o = reader.read_u16()?;
        }
        offsets.push(bone_offsets);
    }

    let mut result = Vec::with_capacity(bones_num as usize);
    for (i, bone_offsets) in offsets.iter().enumerate() {
        let entry_base = anim_base as u64 + (i as u64) * 12;
        let mut channels: [Vec<AnimValue>; 6] = Default::default();
        for (c, &offset) in bone_offsets.iter().enumerate() {
            if offset == 0 {
                continue;
            }
            channels[c] = decode_anim_channel(reader, entry_base + offset as u64, frames_num)?;
        }
        result.push(BoneAnimChannels { channels });
    }
    Ok(result)
}

#[derive(Clone, Debug)]
pub struct Sequence {
    pub label: String,
    pub fps: f32,
    pub flags: u32,
    pub activity: i32,
    pub activity_weight: i32,

    pub events: Vec<Event>,

    pub frames_num: u32,

    pub pivots_num: u32,
    pub pivots_offset: u32,

    pub motion_type: u32,
    pub motion_bone: i32,
    pub linear_movement: [f32; 3],

    pub bbmin: [f32; 3],
    pub bbmax: [f32; 3],

    pub blends_num: u32,
    pub anim_offset: u32,
    pub blend_ranges: [BlendRange; 2],

    pub blend_parent: i32,
    pub seq_group: i32,

    pub entry_node: i32,
    pub exit_node: i32,
    pub node_flags: i32,

    /// Per blend, per bone, per DoF anim runs. Populated only once the
    /// owning model resolves `seq_group` (either 0, meaning it already
    /// lives in this file, or an external group file).
    pub blend_anim: Vec<Vec<BoneAnimChannels>>,
}

impl Sequence {
    fn decode_header<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<(Self, u32, u32)> {
        let label = reader.read_name::<32>()?;
        let fps = reader.read_f32()?;
        let flags = reader.read_u32()?;
        let activity = reader.read_i32()?;
        let activity_weight = reader.read_i32()?;

        let events_num = reader.read_u32()?;
        let events_offset = reader.read_u32()?;

        let frames_num = reader.read_u32()?;

        let pivots_num = reader.read_u32()?;
        let pivots_offset = reader.read_u32()?;

        let motion_type = reader.read_u32()?;
        let motion_bone = reader.read_i32()?;
        let linear_movement = reader.read_vec3()?;

        let _auto_move_pos_index = reader.read_i32()?;
        let _auto_move_angle_index = reader.read_i32()?;

        let bbmin = reader.read_vec3()?;
        let bbmax = reader.read_vec3()?;

        let blends_num = reader.read_u32()?;
        let anim_offset = reader.read_u32()?;

        let mut blend_ranges = [
            BlendRange {
                blend_type: 0,
                start: 0.0,
                end: 0.0,
            },
            BlendRange {
                blend_type: 0,
                start: 0.0,
                end: 0.0,
            },
        ];
        for range in blend_ranges.iter_mut() {
            range.blend_type = reader.read_u32()?;
        }
        for range in blend_ranges.iter_mut() {
            range.start = reader.read_f32()?;
        }
        for range in blend_ranges.iter_mut() {
            range.end = reader.read_f32()?;
        }

        let blend_parent = reader.read_i32()?;
        let seq_group = reader.read_i32()?;

        let entry_node = reader.read_i32()?;
        let exit_node = reader.read_i32()?;
        let node_flags = reader.read_i32()?;

        let _next_seq = reader.read_i32()?;

        Ok((
            Self {
                label,
                fps,
                flags,
                activity,
                activity_weight,
                events: Vec::new(),
                frames_num,
                pivots_num,
                pivots_offset,
                motion_type,
                motion_bone,
                linear_movement,
                bbmin,
                bbmax,
                blends_num,
                anim_offset,
                blend_ranges,
                blend_parent,
                seq_group,
                entry_node,
                exit_node,
                node_flags,
                blend_anim: Vec::new(),
            },
            events_num,
            events_offset,
        ))
    }

    /// Masked motion type with the shortest-rotation-path bit stripped,
    /// matching `BoneController::primary_motion_type`.
    pub fn primary_motion_type(&self) -> u32 {
        self.motion_type & crate::mdl::header::STUDIO_MOTION_TYPES
    }
}

/// Decodes all sequences whose anim data lives in the main file
/// (`seq_group == 0`); sequences referencing an external group are left
/// with an empty `blend_anim` for the external resolver to fill in.
pub fn decode_sequences<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    header: &MdlHeader,
    bones_num: u32,
) -> Result<Vec<Sequence>> {
    reader.seek_to(header.sequences_offset)?;
    let mut entries = Vec::with_capacity(header.sequences_num as usize);
    for _ in 0..header.sequences_num {
        entries.push(Sequence::decode_header(reader)?);
    }

    let mut sequences = Vec::with_capacity(entries.len());
    for (mut seq, events_num, events_offset) in entries {
        if events_num > 0 {
            reader.seek_to(events_offset)?;
            let mut events = Vec::with_capacity(events_num as usize);
            for _ in 0..events_num {
                events.push(Event::decode(reader)?);
            }
            seq.events = events;
        }

        if seq.seq_group == 0 {
            let mut blend_anim = Vec::with_capacity(seq.blends_num as usize);
            for b in 0..seq.blends_num {
                let base = seq.anim_offset + b * bones_num * 12;
                blend_anim.push(decode_blend_anim(reader, base, bones_num, seq.frames_num)?);
            }
            seq.blend_anim = blend_anim;
        }

        sequences.push(seq);
    }
    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn anim_value_decode_reads_exact_run_length() {
        let data = vec![3u8, 10u8, 1, 0, 2, 0, 3, 0];
        let mut reader = ByteReader::new(Cursor::new(data), "a.mdl");
        let run = AnimValue::decode(&mut reader).unwrap();
        assert_eq!(run.valid, 3);
        assert_eq!(run.total, 10);
        assert_eq!(run.values, vec![1, 2, 3]);
    }

    #[test]
    fn decode_anim_channel_stops_once_frames_covered() {
        // Two runs: total=5 then total=5, covering 10 frames total.
        let mut data = Vec::new();
        data.extend_from_slice(&[1, 5, 7, 0]);
        data.extend_from_slice(&[1, 5, 9, 0]);
        let mut reader = ByteReader::new(Cursor::new(data), "a.mdl");
        let runs = decode_anim_channel(&mut reader, 0, 10).unwrap();
        assert_eq!(runs.len(), 2);
    }

    #[test]
    fn event_options_str_trims_at_null() {
        let mut options = [0u8; 64];
        options[..4].copy_from_slice(b"step");
        let event = Event {
            frame: 0,
            event: 1,
            event_type: 0,
            options,
        };
        assert_eq!(event.options_str(), "step");
    }
}
