// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Patterns, projects and the references used to look them up

use serde::{Deserialize, Serialize};

/// Numeric identifier of a pattern row
pub type PatternId = i64;

/// Numeric identifier of a project row
pub type ProjectId = i64;

/// How the pattern document is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    #[default]
    Pdf,
    Markdown,
}

/// A craft pattern as returned by the library backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub id: PatternId,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub kind: PatternKind,
    /// 1-based page the user was last on
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default)]
    pub timer_seconds: u64,
    #[serde(default)]
    pub in_progress: bool,
}

fn first_page() -> u32 {
    1
}

/// A project groups several patterns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub pattern_ids: Vec<PatternId>,
}

/// Reference to a pattern as it appears in a URL fragment
///
/// Old links carry the numeric id, newer ones the slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternRef {
    Id(PatternId),
    Slug(String),
}

impl PatternRef {
    /// Parse a fragment segment: all-digit values are ids, anything else a slug
    pub fn parse(segment: &str) -> Option<Self> {
        let segment = segment.trim();
        if segment.is_empty() {
            return None;
        }
        if segment.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = segment.parse::<PatternId>() {
                return Some(PatternRef::Id(id));
            }
        }
        Some(PatternRef::Slug(segment.to_string()))
    }
}

impl std::fmt::Display for PatternRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternRef::Id(id) => write!(f, "{}", id),
            PatternRef::Slug(slug) => write!(f, "{}", slug),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_segments_are_ids() {
        assert_eq!(PatternRef::parse("42"), Some(PatternRef::Id(42)));
        assert_eq!(
            PatternRef::parse("cabled-socks"),
            Some(PatternRef::Slug("cabled-socks".to_string()))
        );
        assert_eq!(PatternRef::parse("  "), None);
    }

    #[test]
    fn pattern_defaults_fill_missing_fields() {
        let pattern: Pattern =
            serde_json::from_str(r#"{"id":7,"slug":"hat","name":"Hat"}"#).expect("parse");
        assert_eq!(pattern.current_page, 1);
        assert_eq!(pattern.timer_seconds, 0);
        assert!(!pattern.in_progress);
        assert_eq!(pattern.kind, PatternKind::Pdf);
    }
}
