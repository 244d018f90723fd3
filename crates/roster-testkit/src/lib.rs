// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod memory;

pub use memory::{MemoryStore, StoreOp};

use roster_app::{StudentDraft, YearLevel};
use time::OffsetDateTime;
use time::macros::datetime;

const FIRST_NAMES: [&str; 20] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan", "Ana", "Mateo", "Priya", "Wen",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];
const MAJORS: [&str; 12] = [
    "Biology",
    "Chemistry",
    "Computer Science",
    "Economics",
    "English",
    "History",
    "Mathematics",
    "Mechanical Engineering",
    "Music",
    "Philosophy",
    "Physics",
    "Psychology",
];
const EMAIL_DOMAINS: [&str; 3] = ["example.edu", "students.example.edu", "example.com"];

const MIN_GPA_HUNDREDTHS: i64 = 150;
const MAX_GPA_HUNDREDTHS: i64 = 400;

/// Wall clock the in-memory store starts from, so fixture timestamps are
/// stable across runs.
pub const REFERENCE_TIME: OffsetDateTime = datetime!(2026-01-05 09:00 UTC);

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Produces plausible student drafts from a seed. Student IDs are handed out
/// in sequence so one faker never repeats itself.
#[derive(Debug, Clone)]
pub struct StudentFaker {
    rng: DeterministicRng,
    seed: u64,
    issued: u32,
}

impl StudentFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
            issued: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn draft(&mut self) -> StudentDraft {
        self.issued += 1;
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let domain = self.pick(&EMAIL_DOMAINS);
        StudentDraft {
            student_id: format!("STU{:03}", self.issued),
            name: format!("{first} {last}"),
            email: format!(
                "{}.{}@{domain}",
                first.to_ascii_lowercase(),
                last.to_ascii_lowercase()
            ),
            major: self.pick(&MAJORS).to_owned(),
            year: YearLevel::ALL[self.rng.int_n(YearLevel::ALL.len())],
            gpa: self.gpa(),
        }
    }

    pub fn drafts(&mut self, count: usize) -> Vec<StudentDraft> {
        (0..count).map(|_| self.draft()).collect()
    }

    /// A GPA on the 0.01 grid between 1.50 and 4.00.
    pub fn gpa(&mut self) -> f64 {
        let span = (MAX_GPA_HUNDREDTHS - MIN_GPA_HUNDREDTHS + 1) as u64;
        let hundredths = MIN_GPA_HUNDREDTHS + (self.rng.next_u64() % span) as i64;
        hundredths as f64 / 100.0
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

pub fn majors() -> &'static [&'static str] {
    &MAJORS
}

/// A draft with fixed contents, for tests that only care about one field.
pub fn sample_draft(student_id: &str, name: &str, gpa: f64) -> StudentDraft {
    StudentDraft {
        student_id: student_id.to_owned(),
        name: name.to_owned(),
        email: format!(
            "{}@example.edu",
            name.split_whitespace()
                .next()
                .unwrap_or("student")
                .to_ascii_lowercase()
        ),
        major: "Mathematics".to_owned(),
        year: YearLevel::First,
        gpa,
    }
}

#[cfg(test)]
mod tests {
    use super::{StudentFaker, majors, sample_draft};
    use roster_app::{MAX_GPA, YearLevel};
    use std::collections::BTreeSet;

    #[test]
    fn same_seed_same_students() {
        let mut left = StudentFaker::new(42);
        let mut right = StudentFaker::new(42);
        assert_eq!(left.drafts(5), right.drafts(5));
    }

    #[test]
    fn zero_seed_is_normalized() {
        assert_eq!(StudentFaker::new(0).seed(), 1);
        assert_eq!(StudentFaker::new(0).draft(), StudentFaker::new(1).draft());
    }

    #[test]
    fn student_ids_are_sequential_and_unique() {
        let mut faker = StudentFaker::new(3);
        let ids: Vec<String> = faker
            .drafts(12)
            .into_iter()
            .map(|draft| draft.student_id)
            .collect();
        assert_eq!(ids[0], "STU001");
        assert_eq!(ids[11], "STU012");
        assert_eq!(ids.iter().collect::<BTreeSet<_>>().len(), 12);
    }

    #[test]
    fn drafts_hold_valid_values() {
        let mut faker = StudentFaker::new(9);
        for draft in faker.drafts(200) {
            assert!(draft.name.contains(' '));
            assert!(draft.email.contains('@'));
            assert!(majors().contains(&draft.major.as_str()));
            assert!(YearLevel::ALL.contains(&draft.year));
            assert!((1.5..=MAX_GPA).contains(&draft.gpa), "gpa {}", draft.gpa);
            let cents = draft.gpa * 100.0;
            assert!((cents - cents.round()).abs() < 1e-9, "gpa {}", draft.gpa);
        }
    }

    #[test]
    fn sample_draft_derives_email_from_first_name() {
        let draft = sample_draft("STU777", "Ana Lima", 3.9);
        assert_eq!(draft.email, "ana@example.edu");
        assert_eq!(draft.year, YearLevel::First);
    }
}
