//! Review records and the fixed label mapping

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary review label
///
/// Raw dataset labels are 1 (fake / negative) and 2 (genuine / positive);
/// they map to class indices 0 and 1 and are never inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Fake = 0,
    Genuine = 1,
}

impl Label {
    /// Both labels in class-index order
    pub const ALL: [Label; 2] = [Label::Fake, Label::Genuine];

    /// Map a raw dataset label ("1" or "2")
    pub fn from_raw(raw: &str, row: usize) -> Result<Self> {
        match raw.trim() {
            "1" => Ok(Self::Fake),
            "2" => Ok(Self::Genuine),
            other => Err(Error::InvalidLabel { row, value: other.to_string() }),
        }
    }

    /// Class index used by the models (0 or 1)
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Label for a class index; anything non-zero is genuine
    pub fn from_index(index: usize) -> Self {
        if index == 0 {
            Self::Fake
        } else {
            Self::Genuine
        }
    }

    /// Display name used in reports
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fake => "Fake",
            Self::Genuine => "Genuine",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.index())
    }
}

/// One labeled review
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    /// Zero-based row position in the source file
    pub row: usize,
    pub title: String,
    pub body: String,
    pub label: Label,
}

impl ReviewRecord {
    /// Title and body joined by a single space
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}
