//! # Effects
//!
//! Core records of the catalog.
//!
//! ## Layout
//! - One effect per claim, two competing variants
//! - Only `votes_a`/`votes_b` ever change, and only upwards
//! - JSON keys are camelCase so the catalog file stays interchangeable with the frontend payloads
use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    pub id: u32,
    pub category: String,
    pub category_emoji: String,
    pub category_name: String,
    pub title: String,
    pub question: String,
    pub variant_a: String,
    pub variant_b: String,
    pub votes_a: u64,
    pub votes_b: u64,
    pub current_state: String,
    pub source_link: String,
    pub date_added: NaiveDate,
}

impl Effect {
    pub fn votes(&self, variant: Variant) -> u64 {
        match variant {
            Variant::A => self.votes_a,
            Variant::B => self.votes_b,
        }
    }

    pub fn votes_mut(&mut self, variant: Variant) -> &mut u64 {
        match variant {
            Variant::A => &mut self.votes_a,
            Variant::B => &mut self.votes_b,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    #[serde(alias = "a")]
    A,
    #[serde(alias = "b")]
    B,
}

impl Variant {
    /// Short lowercase tag, used for storage keys and columns.
    pub fn tag(self) -> &'static str {
        match self {
            Variant::A => "a",
            Variant::B => "b",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Variant::A => Variant::B,
            Variant::B => Variant::A,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::A => f.write_str("A"),
            Variant::B => f.write_str("B"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant {:?}, expected A or B", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

impl FromStr for Variant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Variant::A),
            "B" | "b" => Ok(Variant::B),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
}

/// User proposed effect waiting for moderation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub title: String,
    pub question: String,
    pub variant_a: String,
    pub variant_b: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_link: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
}
