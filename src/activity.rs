//! The engine's fixed activity-id table and motion-type token names,
//! used verbatim when emitting `$sequence` lines.

use crate::mdl::header::{
    STUDIO_MOTION_AX, STUDIO_MOTION_AXR, STUDIO_MOTION_AY, STUDIO_MOTION_AYR, STUDIO_MOTION_AZ,
    STUDIO_MOTION_AZR, STUDIO_MOTION_LX, STUDIO_MOTION_LY, STUDIO_MOTION_LZ, STUDIO_MOTION_TYPES,
    STUDIO_MOTION_X, STUDIO_MOTION_XR, STUDIO_MOTION_Y, STUDIO_MOTION_YR, STUDIO_MOTION_Z,
    STUDIO_MOTION_ZR,
};

pub const ACTIVITY_NAMES: &[&str] = &[
    "ACT_RESET",
    "ACT_IDLE",
    "ACT_GUARD",
    "ACT_WALK",
    "ACT_RUN",
    "ACT_FLY",
    "ACT_SWIM",
    "ACT_HOP",
    "ACT_LEAP",
    "ACT_FALL",
    "ACT_LAND",
    "ACT_STRAFE_LEFT",
    "ACT_STRAFE_RIGHT",
    "ACT_ROLL_LEFT",
    "ACT_ROLL_RIGHT",
    "ACT_TURN_LEFT",
    "ACT_TURN_RIGHT",
    "ACT_CROUCH",
    "ACT_CROUCHIDLE",
    "ACT_STAND",
    "ACT_USE",
    "ACT_SIGNAL1",
    "ACT_SIGNAL2",
    "ACT_SIGNAL3",
    "ACT_TWITCH",
    "ACT_COWER",
    "ACT_SMALL_FLINCH",
    "ACT_BIG_FLINCH",
    "ACT_RANGE_ATTACK1",
    "ACT_RANGE_ATTACK2",
    "ACT_MELEE_ATTACK1",
    "ACT_MELEE_ATTACK2",
    "ACT_RELOAD",
    "ACT_ARM",
    "ACT_DISARM",
    "ACT_EAT",
    "ACT_DIESIMPLE",
    "ACT_DIEBACKWARD",
    "ACT_DIEFORWARD",
    "ACT_DIEVIOLENT",
    "ACT_BARNACLE_HIT",
    "ACT_BARNACLE_PULL",
    "ACT_BARNACLE_CHOMP",
    "ACT_BARNACLE_CHEW",
    "ACT_SLEEP",
    "ACT_INSPECT_FLOOR",
    "ACT_INSPECT_WALL",
    "ACT_IDLE_ANGRY",
    "ACT_WALK_HURT",
    "ACT_RUN_HURT",
    "ACT_HOVER",
    "ACT_GLIDE",
    "ACT_FLY_LEFT",
    "ACT_FLY_RIGHT",
    "ACT_DETECT_SCENT",
    "ACT_SNIFF",
    "ACT_BITE",
    "ACT_THREAT_DISPLAY",
    "ACT_FEAR_DISPLAY",
    "ACT_EXCITED",
    "ACT_SPECIAL_ATTACK1",
    "ACT_SPECIAL_ATTACK2",
    "ACT_COMBAT_IDLE",
    "ACT_WALK_SCARED",
    "ACT_RUN_SCARED",
    "ACT_VICTORY_DANCE",
    "ACT_DIE_HEADSHOT",
    "ACT_DIE_CHESTSHOT",
    "ACT_DIE_GUTSHOT",
    "ACT_DIE_BACKSHOT",
    "ACT_FLINCH_HEAD",
    "ACT_FLINCH_CHEST",
    "ACT_FLINCH_STOMACH",
    "ACT_FLINCH_LEFTARM",
    "ACT_FLINCH_RIGHTARM",
    "ACT_FLINCH_LEFTLEG",
    "ACT_FLINCH_RIGHTLEG",
    "ACT_VM_NONE",
    "ACT_VM_DEPLOY",
    "ACT_VM_DEPLOY_EMPTY",
    "ACT_VM_HOLSTER",
    "ACT_VM_HOLSTER_EMPTY",
    "ACT_VM_IDLE1",
    "ACT_VM_IDLE2",
    "ACT_VM_IDLE3",
    "ACT_VM_RANGE_ATTACK1",
    "ACT_VM_RANGE_ATTACK2",
    "ACT_VM_RANGE_ATTACK3",
    "ACT_VM_MELEE_ATTACK1",
    "ACT_VM_MELEE_ATTACK2",
    "ACT_VM_MELEE_ATTACK3",
    "ACT_VM_SHOOT_EMPTY",
    "ACT_VM_START_RELOAD",
    "ACT_VM_RELOAD",
    "ACT_VM_RELOAD_EMPTY",
    "ACT_VM_TURNON",
    "ACT_VM_TURNOFF",
    "ACT_VM_PUMP",
    "ACT_VM_PUMP_EMPTY",
    "ACT_VM_START_CHARGE",
    "ACT_VM_CHARGE",
    "ACT_VM_OVERLOAD",
    "ACT_VM_IDLE_EMPTY",
];

const MOTION_BITS: &[(u32, &str)] = &[
    (STUDIO_MOTION_X, "X"),
    (STUDIO_MOTION_Y, "Y"),
    (STUDIO_MOTION_Z, "Z"),
    (STUDIO_MOTION_XR, "XR"),
    (STUDIO_MOTION_YR, "YR"),
    (STUDIO_MOTION_ZR, "ZR"),
    (STUDIO_MOTION_LX, "LX"),
    (STUDIO_MOTION_LY, "LY"),
    (STUDIO_MOTION_LZ, "LZ"),
    (STUDIO_MOTION_AX, "AX"),
    (STUDIO_MOTION_AY, "AY"),
    (STUDIO_MOTION_AZ, "AZ"),
    (STUDIO_MOTION_AXR, "AXR"),
    (STUDIO_MOTION_AYR, "AYR"),
    (STUDIO_MOTION_AZR, "AZR"),
];

/// Renders a motion-type bitmask as QC tokens. `composite` emits every
/// set bit space-separated (for `$sequence`'s trailing motion flags);
/// non-composite emits the single matching token (for `$controller`,
/// which only ever carries one primary axis).
pub fn motion_type_string(motion_type: u32, composite: bool) -> String {
    if composite {
        let mut out = String::new();
        for (bit, name) in MOTION_BITS {
            if motion_type & bit != 0 {
                out.push(' ');
                out.push_str(name);
            }
        }
        out
    } else {
        let masked = motion_type & STUDIO_MOTION_TYPES;
        MOTION_BITS
            .iter()
            .find(|(bit, _)| *bit == masked)
            .map(|(_, name)| name.to_string())
            .unwrap_or_default()
    }
}

/// Looks up the activity name for `activity`, or `None` if it's outside
/// the known table (the caller falls back to an `ACT_<n>` token and logs
/// a warning, per spec).
pub fn activity_name(activity: i32) -> Option<&'static str> {
    ACTIVITY_NAMES.get(activity as usize).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_the_documented_number_of_entries() {
        assert_eq!(ACTIVITY_NAMES.len(), 103);
    }

    #[test]
    fn unknown_activity_returns_none() {
        assert!(activity_name(1000).is_none());
    }

    #[test]
    fn composite_motion_string_lists_every_set_bit() {
        let s = motion_type_string(STUDIO_MOTION_X | STUDIO_MOTION_ZR, true);
        assert_eq!(s, " X ZR");
    }

    #[test]
    fn single_motion_string_matches_one_bit() {
        assert_eq!(motion_type_string(STUDIO_MOTION_YR, false), "YR");
    }
}
