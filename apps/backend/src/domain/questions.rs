//! The prompt corpus drawn from at the start of every writing phase.

use std::fs;
use std::path::Path;

use rand::seq::IndexedRandom;

use crate::error::AppError;

const EMBEDDED_QUESTIONS: &str = include_str!("../../assets/questions.txt");

/// Read-only list of prompts, one per non-blank line of the source text.
///
/// Built once at startup and shared behind an `Arc`; lookups need no lock.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<String>,
}

impl QuestionBank {
    pub fn from_lines(text: &str) -> Result<Self, AppError> {
        let questions: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if questions.is_empty() {
            return Err(AppError::config("question corpus is empty"));
        }
        Ok(Self { questions })
    }

    /// The corpus compiled into the binary.
    pub fn embedded() -> Result<Self, AppError> {
        Self::from_lines(EMBEDDED_QUESTIONS)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("cannot read questions from {}: {e}", path.display()))
        })?;
        Self::from_lines(&text)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Pick a prompt uniformly at random.
    pub fn draw(&self) -> &str {
        self.questions
            .choose(&mut rand::rng())
            .map(String::as_str)
            .unwrap_or_default()
    }
}
