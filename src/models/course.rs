// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared course catalog entry.

use serde::{Deserialize, Serialize};

/// Course in the shared catalog, keyed by `course_code`.
///
/// Accumulated across every account that observes the course: slot
/// tokens are only ever added, and the teacher name keeps its first
/// non-empty value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique course code, e.g. "MATH1"
    pub course_code: String,
    /// Teacher name; first non-empty observation wins
    #[serde(default)]
    pub teacher_name: String,
    /// Distinct "{cycle day}-{period}" slot tokens, in observation order
    #[serde(default)]
    pub known_slots: Vec<String>,
}

impl Course {
    /// Fresh catalog entry with nothing observed yet.
    pub fn new(course_code: &str) -> Self {
        Self {
            course_code: course_code.to_string(),
            teacher_name: String::new(),
            known_slots: Vec::new(),
        }
    }

    /// Merge one timetable observation into the record.
    pub fn observe(&mut self, teacher_name: &str, slot: &str) {
        if self.teacher_name.is_empty() && !teacher_name.is_empty() {
            self.teacher_name = teacher_name.to_string();
        }
        if !self.known_slots.iter().any(|s| s == slot) {
            self.known_slots.push(slot.to_string());
        }
    }
}
