// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ids::StudentId;

pub const MIN_GPA: f64 = 0.0;
pub const MAX_GPA: f64 = 4.0;
pub const HONORS_GPA: f64 = 3.5;

/// Year of study. The store column is a plain integer, but only 1 through 4
/// are meaningful; anything else fails to decode.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub enum YearLevel {
    #[default]
    First,
    Second,
    Third,
    Fourth,
}

impl YearLevel {
    pub const ALL: [Self; 4] = [Self::First, Self::Second, Self::Third, Self::Fourth];

    pub const fn number(self) -> i64 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
            Self::Fourth => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::First => "1st Year",
            Self::Second => "2nd Year",
            Self::Third => "3rd Year",
            Self::Fourth => "4th Year",
        }
    }

    pub fn from_number(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::First),
            2 => Some(Self::Second),
            3 => Some(Self::Third),
            4 => Some(Self::Fourth),
            _ => None,
        }
    }

    /// Step through the fixed set, wrapping at both ends.
    pub fn cycle(self, delta: isize) -> Self {
        let index = Self::ALL
            .iter()
            .position(|year| *year == self)
            .unwrap_or(0) as isize;
        let len = Self::ALL.len() as isize;
        Self::ALL[(index + delta).rem_euclid(len) as usize]
    }
}

impl TryFrom<i64> for YearLevel {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_number(value).ok_or_else(|| format!("year must be 1, 2, 3, or 4, got {value}"))
    }
}

impl From<YearLevel> for i64 {
    fn from(value: YearLevel) -> Self {
        value.number()
    }
}

/// Display band for a GPA. Cosmetic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    Honors,
    Good,
    Fair,
    Low,
}

impl ScoreTier {
    pub fn for_gpa(gpa: f64) -> Self {
        if gpa >= HONORS_GPA {
            Self::Honors
        } else if gpa >= 3.0 {
            Self::Good
        } else if gpa >= 2.5 {
            Self::Fair
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub major: String,
    pub year: YearLevel,
    pub gpa: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Student {
    pub fn is_honors(&self) -> bool {
        self.gpa >= HONORS_GPA
    }

    pub fn tier(&self) -> ScoreTier {
        ScoreTier::for_gpa(self.gpa)
    }
}

/// Row body for insert and update. The server owns `id` and both
/// timestamps, so they never appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDraft {
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub major: String,
    pub year: YearLevel,
    pub gpa: f64,
}

impl Default for StudentDraft {
    fn default() -> Self {
        Self {
            student_id: String::new(),
            name: String::new(),
            email: String::new(),
            major: String::new(),
            year: YearLevel::First,
            gpa: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ScoreTier, Student, StudentDraft, YearLevel};

    #[test]
    fn year_level_accepts_only_one_through_four() {
        for year in YearLevel::ALL {
            assert_eq!(YearLevel::from_number(year.number()), Some(year));
        }
        assert!(YearLevel::try_from(0).is_err());
        assert!(YearLevel::try_from(5).is_err());
        assert!(YearLevel::try_from(-1).is_err());
    }

    #[test]
    fn year_level_cycle_wraps() {
        assert_eq!(YearLevel::Fourth.cycle(1), YearLevel::First);
        assert_eq!(YearLevel::First.cycle(-1), YearLevel::Fourth);
        assert_eq!(YearLevel::Second.cycle(1), YearLevel::Third);
    }

    #[test]
    fn score_tier_thresholds_are_inclusive() {
        assert_eq!(ScoreTier::for_gpa(4.0), ScoreTier::Honors);
        assert_eq!(ScoreTier::for_gpa(3.5), ScoreTier::Honors);
        assert_eq!(ScoreTier::for_gpa(3.49), ScoreTier::Good);
        assert_eq!(ScoreTier::for_gpa(3.0), ScoreTier::Good);
        assert_eq!(ScoreTier::for_gpa(2.5), ScoreTier::Fair);
        assert_eq!(ScoreTier::for_gpa(2.49), ScoreTier::Low);
        assert_eq!(ScoreTier::for_gpa(0.0), ScoreTier::Low);
    }

    #[test]
    fn student_row_decodes_from_store_json() {
        let raw = r#"{
            "id": "8f14e45f-ceea-467f-a0e6-0b0b5c9b1a11",
            "student_id": "STU001",
            "name": "Ana Lima",
            "email": "ana@example.com",
            "major": "Physics",
            "year": 3,
            "gpa": 3.9,
            "created_at": "2026-01-09T14:03:11.482913+00:00",
            "updated_at": "2026-01-09T14:03:11.482913+00:00"
        }"#;
        let student: Student = serde_json::from_str(raw).expect("row should decode");
        assert_eq!(student.id.as_str(), "8f14e45f-ceea-467f-a0e6-0b0b5c9b1a11");
        assert_eq!(student.year, YearLevel::Third);
        assert!(student.is_honors());
    }

    #[test]
    fn student_row_with_out_of_range_year_is_rejected() {
        let raw = r#"{
            "id": "x", "student_id": "STU002", "name": "Bob", "email": "bob@example.com",
            "major": "Math", "year": 7, "gpa": 3.2,
            "created_at": "2026-01-09T14:03:11Z", "updated_at": "2026-01-09T14:03:11Z"
        }"#;
        assert!(serde_json::from_str::<Student>(raw).is_err());
    }

    #[test]
    fn draft_serializes_the_six_editable_columns() {
        let draft = StudentDraft {
            student_id: "STU003".to_owned(),
            name: "Cleo".to_owned(),
            email: "cleo@example.com".to_owned(),
            major: "History".to_owned(),
            year: YearLevel::Second,
            gpa: 2.75,
        };
        let value = serde_json::to_value(&draft).expect("draft should encode");
        let object = value.as_object().expect("draft encodes as object");
        assert_eq!(object.len(), 6);
        assert_eq!(object["year"], serde_json::json!(2));
        assert!(!object.contains_key("id"));
        assert!(!object.contains_key("created_at"));
    }
}
