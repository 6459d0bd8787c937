// src/extract/mod.rs
pub mod html;
pub mod json;
pub mod rss;

use metrics::{counter, histogram};

use crate::types::{Category, DraftRecord, PayloadKind, SourceDescriptor};

/// Articles whose title is shorter than this are navigation or boilerplate
/// misread as a headline.
const MIN_ARTICLE_TITLE_CHARS: usize = 12;

/// Turn one raw payload into zero or more draft records.
///
/// The cascade: XML/RSS when hinted or sniffed (an XML-hinted body that is
/// actually an HTML document is an upstream error page and short-circuits
/// to empty), then JSON, then the ordered HTML strategy list where the
/// first strategy yielding a structurally valid record wins. Every parse
/// failure is absorbed here; this function never errors.
pub fn extract(descriptor: &SourceDescriptor, body: &str) -> Vec<DraftRecord> {
    let t0 = std::time::Instant::now();
    let drafts = run_cascade(descriptor, body);

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("aggregate_parse_ms").record(ms);
    counter!("aggregate_drafts_total").increment(drafts.len() as u64);
    drafts
}

fn run_cascade(descriptor: &SourceDescriptor, body: &str) -> Vec<DraftRecord> {
    let category = descriptor.category;

    // Step 1: structured XML.
    let xml_hinted = descriptor.kind == PayloadKind::Xml || sniffs_xml(body);
    if xml_hinted {
        if looks_like_html(body) {
            tracing::warn!(
                target: "aggregate",
                source = %descriptor.id,
                "xml-hinted source returned an html document, treating as error page"
            );
            return Vec::new();
        }
        match rss::extract_items(body) {
            Ok(items) => {
                let kept = accept(category, items, descriptor.max_items);
                if !kept.is_empty() {
                    return kept;
                }
            }
            Err(e) => {
                tracing::warn!(target: "aggregate", source = %descriptor.id, error = ?e, "rss parse failed");
                counter!("aggregate_parse_errors_total").increment(1);
            }
        }
    }

    // Step 2: structured JSON.
    if descriptor.kind == PayloadKind::Json || sniffs_json(body) {
        if let Some(map) = &descriptor.json_map {
            match json::extract_items(body, map) {
                Ok(items) => {
                    let kept = accept(category, items, descriptor.max_items);
                    if !kept.is_empty() {
                        return kept;
                    }
                }
                Err(e) => {
                    tracing::warn!(target: "aggregate", source = %descriptor.id, error = ?e, "json parse failed");
                    counter!("aggregate_parse_errors_total").increment(1);
                }
            }
        }
    }

    // Step 3: HTML strategies, first valid match wins.
    let strategies = match category {
        Category::Fixture => html::fixture_strategies(),
        Category::Article => html::article_strategies(),
    };
    for strategy in &strategies {
        let kept = accept(category, html::run_strategy(strategy, category, body), descriptor.max_items);
        if !kept.is_empty() {
            return kept;
        }
    }

    Vec::new()
}

/// Category validation plus the per-source quantity cap.
fn accept(category: Category, drafts: Vec<DraftRecord>, cap: usize) -> Vec<DraftRecord> {
    drafts
        .into_iter()
        .map(|d| enrich(category, d))
        .filter(|d| is_valid(category, d))
        .take(cap)
        .collect()
}

/// Fixture feeds often carry the pairing only in the title ("Arsenal vs
/// Chelsea"); split it into team fields when they are missing.
fn enrich(category: Category, mut draft: DraftRecord) -> DraftRecord {
    if category == Category::Fixture && (draft.home_team.is_none() || draft.away_team.is_none()) {
        for sep in [" vs ", " v ", " at ", " - ", " – "] {
            if let Some((home, away)) = draft.title.split_once(sep) {
                let (home, away) = (home.trim(), away.trim());
                if !home.is_empty() && !away.is_empty() {
                    draft.home_team = Some(home.to_string());
                    draft.away_team = Some(away.to_string());
                    break;
                }
            }
        }
    }
    if draft.title.trim().is_empty() {
        if let (Some(h), Some(a)) = (&draft.home_team, &draft.away_team) {
            draft.title = format!("{h} vs {a}");
        }
    }
    draft
}

fn is_valid(category: Category, draft: &DraftRecord) -> bool {
    if draft.title.trim().is_empty() {
        return false;
    }
    match category {
        Category::Fixture => match (&draft.home_team, &draft.away_team) {
            (Some(h), Some(a)) => {
                let (h, a) = (h.trim(), a.trim());
                !h.is_empty() && !a.is_empty() && !h.eq_ignore_ascii_case(a)
            }
            _ => false,
        },
        Category::Article => draft.title.trim().chars().count() >= MIN_ARTICLE_TITLE_CHARS,
    }
}

pub(crate) fn looks_like_html(body: &str) -> bool {
    let head: String = body.chars().take(512).collect::<String>().to_ascii_lowercase();
    head.contains("<!doctype") || head.contains("<html")
}

fn sniffs_xml(body: &str) -> bool {
    let trimmed = body.trim_start();
    trimmed.starts_with("<?xml") || trimmed.starts_with("<rss") || trimmed.starts_with("<feed")
}

fn sniffs_json(body: &str) -> bool {
    let trimmed = body.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}
