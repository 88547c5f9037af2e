use std::collections::HashSet;

use regex::Regex;

/// Validates and, when necessary, replaces names read from the model so
/// that every emitted file/identifier is a name a QC/SMD toolchain would
/// actually accept, and so that two colliding names in the same
/// namespace never get emitted side by side.
pub struct NameSanitizer {
    valid_name: Regex,
    texture_pattern: Regex,
    body_pattern: Regex,
    seq_pattern: Regex,

    used_textures: HashSet<String>,
    used_models: HashSet<String>,
    used_sequences: HashSet<String>,

    next_texture: u32,
    next_body: u32,
    next_seq: u32,
}

impl Default for NameSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl NameSanitizer {
    pub fn new() -> Self {
        Self {
            valid_name: Regex::new(r"^[\w\-.][\w\-. ]*$").expect("valid static regex"),
            texture_pattern: Regex::new(r"^_texture\d+\.bmp$").expect("valid static regex"),
            body_pattern: Regex::new(r"^_body\d+_\d+$").expect("valid static regex"),
            seq_pattern: Regex::new(r"^_seq\d+$").expect("valid static regex"),
            used_textures: HashSet::new(),
            used_models: HashSet::new(),
            used_sequences: HashSet::new(),
            next_texture: 1,
            next_body: 1,
            next_seq: 1,
        }
    }

    fn is_valid(&self, name: &str) -> bool {
        !name.is_empty() && self.valid_name.is_match(name)
    }

    fn looks_auto_generated(&self, name: &str) -> bool {
        self.texture_pattern.is_match(name)
            || self.body_pattern.is_match(name)
            || self.seq_pattern.is_match(name)
    }

    /// Sanitizes a texture file stem (without extension). Returns the
    /// name to use, guaranteed unique among previously sanitized
    /// textures.
    pub fn sanitize_texture(&mut self, name: &str) -> String {
        let candidate = if self.is_valid(name) && !self.looks_auto_generated(name) {
            name.to_string()
        } else {
            let name = format!("_texture{}.bmp", self.next_texture);
            self.next_texture += 1;
            name
        };
        let mut used = std::mem::take(&mut self.used_textures);
        let result = Self::dedupe_in(&mut used, candidate, &mut self.next_texture);
        self.used_textures = used;
        result
    }

    /// Sanitizes a body-part model name. `part_index` and `model_index`
    /// are both 0-based; the synthetic fallback uses 1-based numbering.
    pub fn sanitize_model(&mut self, name: &str, part_index: u32, model_index: u32) -> String {
        let candidate = if self.is_valid(name) && !self.looks_auto_generated(name) {
            name.to_string()
        } else {
            format!("_body{}_{}", part_index + 1, model_index + 1)
        };
        let mut used = std::mem::take(&mut self.used_models);
        let result = Self::dedupe_in(&mut used, candidate, &mut self.next_body);
        self.used_models = used;
        result
    }

    /// Sanitizes a body-part name itself (used for `$bodygroup` labels).
    pub fn sanitize_bodypart(&mut self, name: &str, part_index: u32) -> String {
        if self.is_valid(name) && !self.looks_auto_generated(name) {
            name.to_string()
        } else {
            format!("_bodypart{}", part_index + 1)
        }
    }

    /// Sanitizes a sequence label.
    pub fn sanitize_sequence(&mut self, name: &str) -> String {
        let candidate = if self.is_valid(name) && !self.looks_auto_generated(name) {
            name.to_string()
        } else {
            format!("_seq{}", self.next_seq)
        };
        let mut used = std::mem::take(&mut self.used_sequences);
        let result = Self::dedupe_in(&mut used, candidate, &mut self.next_seq);
        self.used_sequences = used;
        result
    }

    fn dedupe_in(used: &mut HashSet<String>, candidate: String, counter: &mut u32) -> String {
        if !used.contains(&candidate) {
            used.insert(candidate.clone());
            return candidate;
        }
        loop {
            let alt = format!("{}_{}", candidate, *counter);
            *counter += 1;
            if !used.contains(&alt) {
                used.insert(alt.clone());
                return alt;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names_pass_through_unchanged() {
        let mut sanitizer = NameSanitizer::new();
        assert_eq!(sanitizer.sanitize_model("grunt.reference", 0, 0), "grunt.reference");
    }

    #[test]
    fn auto_generated_looking_names_are_replaced() {
        let mut sanitizer = NameSanitizer::new();
        assert_eq!(sanitizer.sanitize_model("_body1_2", 4, 7), "_body5_8");
    }

    #[test]
    fn empty_names_get_a_synthetic_fallback() {
        let mut sanitizer = NameSanitizer::new();
        assert_eq!(sanitizer.sanitize_sequence(""), "_seq1");
    }

    #[test]
    fn colliding_sequence_names_are_disambiguated() {
        let mut sanitizer = NameSanitizer::new();
        let first = sanitizer.sanitize_sequence("walk");
        let second = sanitizer.sanitize_sequence("walk");
        assert_eq!(first, "walk");
        assert_ne!(second, "walk");
    }
}
