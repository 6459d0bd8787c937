// src/normalize.rs
//! Field normalizer: the last stop before a draft becomes a canonical
//! item. Cleans text, runs the date-format cascade, resolves links, and
//! assigns run-unique ids. A record is discarded here only when its title
//! is empty after cleaning.

use chrono::NaiveDateTime;
use once_cell::sync::OnceCell;
use rand::Rng;
use sha2::{Digest, Sha256};
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::types::{Category, CanonicalItem, DraftRecord, FixtureDetails, SourceDescriptor};

/// Character budget for summaries before the ellipsis.
const SUMMARY_BUDGET: usize = 220;

/// Normalize text: decode entities, strip tags, collapse whitespace, trim.
pub fn clean_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

fn truncate_summary(s: &str) -> String {
    if s.chars().count() <= SUMMARY_BUDGET {
        return s.to_string();
    }
    let mut out: String = s.chars().take(SUMMARY_BUDGET).collect();
    out.push('…');
    out
}

/// Date cascade, tried in priority order:
/// ISO `YYYY-MM-DD[ HH:MM[:SS]]`, dotted `YYYY.MM.DD HH:MM`, compact
/// `YYYYMMDDHHMMSS`, RFC 2822 (RSS `pubDate`), then a free-text scan.
/// Offset-free formats are read as UTC. `None` means every strategy
/// failed; the caller substitutes "now" rather than dropping the record.
pub fn parse_date(raw: &str) -> Option<u64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return u64::try_from(dt.timestamp()).ok();
    }

    let bare = s.trim_end_matches(['Z', 'z']);
    const NAIVE_FORMATS: [&str; 6] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y.%m.%d %H:%M:%S",
        "%Y.%m.%d %H:%M",
    ];
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(bare, fmt) {
            return u64::try_from(dt.and_utc().timestamp()).ok();
        }
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(bare, "%Y-%m-%d") {
        return u64::try_from(d.and_hms_opt(0, 0, 0)?.and_utc().timestamp()).ok();
    }

    if let Some(ts) = parse_compact(bare) {
        return Some(ts);
    }

    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc2822) {
        return u64::try_from(dt.to_offset(UtcOffset::UTC).unix_timestamp()).ok();
    }
    // Obsolete RFC-822 zone names ("GMT", "EST") that strict parsers reject.
    if let Ok(dt) = chrono::DateTime::parse_from_rfc2822(s) {
        return u64::try_from(dt.timestamp()).ok();
    }

    // Last resort: an ISO-looking date buried in free text.
    static RE_EMBEDDED: OnceCell<regex::Regex> = OnceCell::new();
    let re = RE_EMBEDDED.get_or_init(|| {
        regex::Regex::new(r"\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2})?)?").unwrap()
    });
    if let Some(m) = re.find(s) {
        if m.as_str() != s {
            return parse_date(m.as_str());
        }
    }
    None
}

/// Compact `YYYYMMDDHHMMSS`. Sliced by hand: fixed-width digit runs are
/// ambiguous to format-string parsers.
fn parse_compact(s: &str) -> Option<u64> {
    if s.len() != 14 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let num = |r: std::ops::Range<usize>| s[r].parse::<u32>().ok();
    let date = chrono::NaiveDate::from_ymd_opt(s[0..4].parse().ok()?, num(4..6)?, num(6..8)?)?;
    let dt = date.and_hms_opt(num(8..10)?, num(10..12)?, num(12..14)?)?;
    u64::try_from(dt.and_utc().timestamp()).ok()
}

/// Resolve a possibly-relative link against the source base. Failures fall
/// back to the base itself: a wrong-but-real landing page beats a dropped
/// record.
pub fn resolve_link(link: Option<&str>, base: &str) -> String {
    let Some(link) = link.map(str::trim).filter(|l| !l.is_empty()) else {
        return base.to_string();
    };
    if let Ok(abs) = url::Url::parse(link) {
        return abs.to_string();
    }
    match url::Url::parse(base).and_then(|b| b.join(link)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => base.to_string(),
    }
}

/// Run-unique id: source slug + sequence index + random suffix, digested.
/// Uniqueness across runs is not required.
fn make_id(source: &str, seq: usize) -> String {
    let nonce: u64 = rand::rng().random();
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(seq.to_le_bytes());
    hasher.update(nonce.to_le_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().take(6).map(|b| format!("{b:02x}")).collect();
    format!("{}-{}-{}", slug(source), seq, hex)
}

fn slug(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// Draft → canonical item. `seq` is the record's index within this run's
/// merge; `now` is the fallback timestamp for unparseable dates.
pub fn normalize(
    draft: &DraftRecord,
    descriptor: &SourceDescriptor,
    seq: usize,
    now: u64,
) -> Option<CanonicalItem> {
    let title = clean_text(&draft.title);
    if title.is_empty() {
        return None;
    }

    let base = descriptor.base_url.as_deref().unwrap_or(&descriptor.url);
    let published_at = draft
        .date_raw
        .as_deref()
        .and_then(parse_date)
        .unwrap_or(now);

    let fixture = match descriptor.category {
        Category::Fixture => match (&draft.home_team, &draft.away_team) {
            (Some(h), Some(a)) => Some(FixtureDetails {
                home_team: clean_text(h),
                away_team: clean_text(a),
                home_score: draft.home_score,
                away_score: draft.away_score,
                venue: draft.venue.as_deref().map(clean_text).filter(|v| !v.is_empty()),
                status: draft
                    .status
                    .as_deref()
                    .map(clean_text)
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "scheduled".to_string()),
            }),
            _ => None,
        },
        Category::Article => None,
    };

    Some(CanonicalItem {
        id: make_id(&descriptor.name, seq),
        category: descriptor.category,
        title,
        summary: draft
            .summary
            .as_deref()
            .map(clean_text)
            .filter(|s| !s.is_empty())
            .map(|s| truncate_summary(&s)),
        link: resolve_link(draft.link.as_deref(), base),
        source: descriptor.name.clone(),
        published_at,
        fixture,
        author: draft
            .author
            .as_deref()
            .map(clean_text)
            .filter(|a| !a.is_empty()),
        synthetic: false,
    })
}
