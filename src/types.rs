// src/types.rs
use serde::{Deserialize, Serialize};

/// The two kinds of content the board aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fixture,
    Article,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fixture => "fixture",
            Category::Article => "article",
        }
    }
}

/// Hint for what shape of payload a source usually returns. The extraction
/// cascade sniffs the body anyway; the hint only decides what to try first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Html,
    Xml,
    Json,
    #[default]
    Unknown,
}

/// Field names for JSON sources: where the item list lives and which keys
/// map onto draft fields. Dots in `list` descend into nested objects.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JsonMap {
    pub list: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// Static configuration for one upstream site/feed. Loaded once at startup,
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub url: String,
    /// Base used to resolve relative links; defaults to the origin of `url`.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub kind: PayloadKind,
    /// Cap on accepted drafts per run, protecting downstream stages from
    /// pathological matches.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default)]
    pub json_map: Option<JsonMap>,
}

fn default_max_items() -> usize {
    10
}

/// A partially-normalized candidate item as the extraction cascade emits it.
/// Only the title is guaranteed; everything else is best-effort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftRecord {
    pub title: String,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub date_raw: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub venue: Option<String>,
    pub status: Option<String>,
    pub author: Option<String>,
}

/// Fixture-specific fields of a canonical item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureDetails {
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub home_score: Option<u32>,
    #[serde(default)]
    pub away_score: Option<u32>,
    #[serde(default)]
    pub venue: Option<String>,
    pub status: String,
}

/// The fully normalized output unit. Plain data, immutable once created,
/// suitable for direct serialization to the board UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalItem {
    pub id: String,
    pub category: Category,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub link: String,
    pub source: String,
    /// Unix seconds, UTC. Kickoff time for fixtures, publication for articles.
    pub published_at: u64,
    #[serde(default)]
    pub fixture: Option<FixtureDetails>,
    #[serde(default)]
    pub author: Option<String>,
    /// True when produced by the degraded-mode synthesizer.
    #[serde(default)]
    pub synthetic: bool,
}
