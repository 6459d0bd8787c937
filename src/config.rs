// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::{Category, JsonMap, PayloadKind, SourceDescriptor};

const ENV_PATH: &str = "MATCHWIRE_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/pipeline.toml";

/// Everything the pipeline needs to run: the ordered proxy endpoint list,
/// the per-source descriptors, TTLs, and time budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Ordered CORS proxy templates; the target URL is percent-encoded and
    /// appended to each.
    pub proxies: Vec<String>,
    pub sources: Vec<SourceDescriptor>,
    #[serde(default = "default_fixtures_ttl")]
    pub fixtures_ttl_secs: u64,
    #[serde(default = "default_news_ttl")]
    pub news_ttl_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Upper bound on one whole aggregation run. 0 means "2x request timeout".
    #[serde(default)]
    pub aggregation_budget_secs: u64,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_fixtures_ttl() -> u64 {
    15 * 60
}
fn default_news_ttl() -> u64 {
    5 * 60
}
fn default_request_timeout() -> u64 {
    12
}
fn default_refresh_interval() -> u64 {
    10 * 60
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; matchwire/0.1)".to_string()
}

impl PipelineConfig {
    pub fn ttl_secs(&self, category: Category) -> u64 {
        match category {
            Category::Fixture => self.fixtures_ttl_secs,
            Category::Article => self.news_ttl_secs,
        }
    }

    pub fn budget_secs(&self) -> u64 {
        if self.aggregation_budget_secs == 0 {
            self.request_timeout_secs * 2
        } else {
            self.aggregation_budget_secs
        }
    }

    pub fn sources_for(&self, category: Category) -> Vec<SourceDescriptor> {
        self.sources
            .iter()
            .filter(|s| s.category == category)
            .cloned()
            .collect()
    }

    /// Startup validation. A config that cannot aggregate anything is the one
    /// failure that must be reported immediately instead of degrading.
    pub fn validate(&self) -> Result<()> {
        if self.proxies.is_empty() {
            return Err(anyhow!("config: proxy endpoint list is empty"));
        }
        if self.sources.is_empty() {
            return Err(anyhow!("config: source list is empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("config: request timeout must be non-zero"));
        }
        for s in &self.sources {
            if s.url.is_empty() {
                return Err(anyhow!("config: source '{}' has an empty url", s.id));
            }
        }
        Ok(())
    }
}

/// Load config from an explicit path. Supports TOML or JSON.
pub fn load_from(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading pipeline config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg: PipelineConfig = if ext == "json" {
        serde_json::from_str(&content).context("parsing pipeline config json")?
    } else {
        toml::from_str(&content).context("parsing pipeline config toml")?
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Load config using env var + fallbacks:
/// 1) $MATCHWIRE_CONFIG_PATH
/// 2) config/pipeline.toml
/// 3) compiled-in defaults
pub fn load_default() -> Result<PipelineConfig> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        }
        return Err(anyhow!("MATCHWIRE_CONFIG_PATH points to non-existent path"));
    }
    let toml_p = PathBuf::from(DEFAULT_PATH);
    if toml_p.exists() {
        return load_from(&toml_p);
    }
    let cfg = builtin_config();
    cfg.validate()?;
    Ok(cfg)
}

/// Curated defaults: the public CORS proxies the board has always leaned on,
/// plus a spread of fixture and news sources in different payload shapes.
pub fn builtin_config() -> PipelineConfig {
    PipelineConfig {
        proxies: vec![
            "https://api.allorigins.win/raw?url=".to_string(),
            "https://corsproxy.io/?".to_string(),
            "https://api.codetabs.com/v1/proxy?quest=".to_string(),
        ],
        sources: vec![
            SourceDescriptor {
                id: "espn-epl-scoreboard".to_string(),
                name: "ESPN".to_string(),
                category: Category::Fixture,
                url: "https://site.api.espn.com/apis/site/v2/sports/soccer/eng.1/scoreboard"
                    .to_string(),
                base_url: Some("https://www.espn.com".to_string()),
                kind: PayloadKind::Json,
                max_items: 10,
                json_map: Some(JsonMap {
                    list: "events".to_string(),
                    title: Some("name".to_string()),
                    date: Some("date".to_string()),
                    ..JsonMap::default()
                }),
            },
            SourceDescriptor {
                id: "bbc-fixtures".to_string(),
                name: "BBC Sport".to_string(),
                category: Category::Fixture,
                url: "https://www.bbc.com/sport/football/premier-league/scores-fixtures"
                    .to_string(),
                base_url: Some("https://www.bbc.com".to_string()),
                kind: PayloadKind::Html,
                max_items: 10,
                json_map: None,
            },
            SourceDescriptor {
                id: "bbc-football-rss".to_string(),
                name: "BBC Sport".to_string(),
                category: Category::Article,
                url: "https://feeds.bbci.co.uk/sport/football/rss.xml".to_string(),
                base_url: Some("https://www.bbc.com".to_string()),
                kind: PayloadKind::Xml,
                max_items: 6,
                json_map: None,
            },
            SourceDescriptor {
                id: "guardian-football-rss".to_string(),
                name: "The Guardian".to_string(),
                category: Category::Article,
                url: "https://www.theguardian.com/football/rss".to_string(),
                base_url: Some("https://www.theguardian.com".to_string()),
                kind: PayloadKind::Xml,
                max_items: 6,
                json_map: None,
            },
            SourceDescriptor {
                id: "sky-football".to_string(),
                name: "Sky Sports".to_string(),
                category: Category::Article,
                url: "https://www.skysports.com/football/news".to_string(),
                base_url: Some("https://www.skysports.com".to_string()),
                kind: PayloadKind::Html,
                max_items: 4,
                json_map: None,
            },
        ],
        fixtures_ttl_secs: default_fixtures_ttl(),
        news_ttl_secs: default_news_ttl(),
        request_timeout_secs: default_request_timeout(),
        aggregation_budget_secs: 0,
        refresh_interval_secs: default_refresh_interval(),
        user_agent: default_user_agent(),
    }
}
