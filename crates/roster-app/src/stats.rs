// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::Student;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub mean_gpa: String,
    pub honors_count: usize,
}

impl Stats {
    pub fn from_students(students: &[Student]) -> Self {
        Self {
            total: students.len(),
            mean_gpa: format_mean_gpa(students),
            honors_count: students.iter().filter(|student| student.is_honors()).count(),
        }
    }
}

/// Half-up on the exact decimal mean. GPAs sit on the 0.01 grid, so the
/// sum is taken in integer hundredths before dividing.
fn format_mean_gpa(students: &[Student]) -> String {
    if students.is_empty() {
        return "0.00".to_owned();
    }
    let count = students.len() as i64;
    let hundredths: i64 = students
        .iter()
        .map(|student| (student.gpa * 100.0).round() as i64)
        .sum();
    let mean = (2 * hundredths + count).div_euclid(2 * count);
    let sign = if mean < 0 { "-" } else { "" };
    let mean = mean.abs();
    format!("{sign}{}.{:02}", mean / 100, mean % 100)
}
