//! Per-frame bone DoF reconstruction from the RLE anim streams.

use crate::mdl::bones::Bone;
use crate::mdl::sequence::{BoneAnimChannels, Sequence};

/// Samples a single bone's six DoF values at `frame`, combining the
/// bone's default pose with whatever the anim channels contribute.
pub fn calc_bone_position(channels: &BoneAnimChannels, bone: &Bone, frame: u32) -> [f64; 6] {
    let mut motion = [0.0f64; 6];
    for i in 0..6 {
        motion[i] = bone.value[i] as f64;

        let runs = &channels.channels[i];
        if runs.is_empty() {
            continue;
        }

        let mut j = frame;
        let mut sample = None;
        for run in runs {
            if j >= run.total as u32 {
                j -= run.total as u32;
                continue;
            }
            let value = if (run.valid as u32) > j {
                run.values[j as usize]
            } else {
                run.values[run.valid as usize - 1]
            };
            sample = Some(value as f64);
            break;
        }

        if let Some(value) = sample {
            motion[i] += value * bone.scale[i] as f64;
        }
    }
    motion
}

/// Applies the root-bone axis fixup: GoldSrc stores root-bone motion in
/// an axis convention 270 degrees rotated from SMD's, and linear
/// per-sequence movement accumulates into the root bone's translation
/// rather than being baked in per frame.
pub fn apply_root_rotation_fixup(seq: &Sequence, motion: &mut [f64; 6], frame: u32) {
    let t = frame as f64 / seq.frames_num as f64;
    motion[0] += t * seq.linear_movement[0] as f64;
    motion[1] += t * seq.linear_movement[1] as f64;
    motion[2] += t * seq.linear_movement[2] as f64;

    let rot = 270.0_f64 * std::f64::consts::PI / 180.0;
    let (s, c) = rot.sin_cos();
    let (x, y) = (motion[0], motion[1]);
    motion[0] = c * x - s * y;
    motion[1] = s * x + c * y;
    motion[5] += rot;
}

/// Wraps a rotation value into `(-pi, pi]`.
pub fn clip_rotation(value: &mut f64) {
    while *value >= std::f64::consts::PI {
        *value -= std::f64::consts::PI * 2.0;
    }
    while *value < -std::f64::consts::PI {
        *value += std::f64::consts::PI * 2.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdl::sequence::AnimValue;

    fn bone() -> Bone {
        Bone {
            name: "root".into(),
            parent: -1,
            flags: 0,
            bone_controller: [-1; 6],
            value: [0.0; 6],
            scale: [1.0; 6],
        }
    }

    #[test]
    fn static_channel_returns_default_value() {
        let channels = BoneAnimChannels::default();
        let motion = calc_bone_position(&channels, &bone(), 5);
        assert_eq!(motion, [0.0; 6]);
    }

    #[test]
    fn run_past_its_own_valid_count_repeats_last_sample() {
        let mut channels = BoneAnimChannels::default();
        channels.channels[0] = vec![AnimValue {
            valid: 1,
            total: 10,
            values: vec![7],
        }];
        let motion = calc_bone_position(&channels, &bone(), 9);
        assert_eq!(motion[0], 7.0);
    }

    #[test]
    fn clip_rotation_wraps_into_range() {
        let mut v = std::f64::consts::PI * 3.0;
        clip_rotation(&mut v);
        assert!(v > -std::f64::consts::PI && v <= std::f64::consts::PI);
    }
}
