// src/extract/html.rs
//! Ordered HTML extraction strategies. Target sites change markup without
//! notice, so each category carries a cascade: semantic CSS selectors
//! first, then regex patterns over the raw body, then a loose heuristic
//! over text fragments. The cascade driver in `mod.rs` stops at the first
//! strategy that yields a structurally valid record.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::types::{Category, DraftRecord};

/// A single way of reading drafts out of an HTML document.
pub enum HtmlStrategy {
    BySelector(SelectorSpec),
    ByPattern(&'static Lazy<Regex>),
    ByHeuristic,
}

/// CSS-selector-driven extraction: one container per record, field
/// selectors scoped inside it. Any `None` selector falls back to container
/// text.
pub struct SelectorSpec {
    pub container: &'static str,
    pub title: Option<&'static str>,
    pub home_team: Option<&'static str>,
    pub away_team: Option<&'static str>,
    pub summary: Option<&'static str>,
    pub time: Option<&'static str>,
}

// A "team" is one to four capitalized words; the lowercase word after the
// pair ("kicks", "meet", ...) stops the second capture.
static FIXTURE_PAIR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"([A-Z][A-Za-z'&.\-]*(?:\s[A-Z][A-Za-z'&.\-]*){0,3})\s+(?:vs?\.?|at|–)\s+([A-Z][A-Za-z'&.\-]*(?:\s[A-Z][A-Za-z'&.\-]*){0,3})",
    )
    .unwrap()
});

static HEADLINE_ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<h[1-4][^>]*>\s*<a[^>]+href\s*=\s*["']([^"']+)["'][^>]*>(.+?)</a>"#).unwrap()
});

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").unwrap());

/// Strategies for fixture pages, in the order they are tried.
pub fn fixture_strategies() -> Vec<HtmlStrategy> {
    vec![
        HtmlStrategy::BySelector(SelectorSpec {
            container: ".fixture, .match, [class*=fixture], [class*=match-row]",
            title: None,
            home_team: Some("[class*=home] [class*=team-name], [class*=home-team], .team-home"),
            away_team: Some("[class*=away] [class*=team-name], [class*=away-team], .team-away"),
            summary: None,
            time: Some("time, [class*=kickoff], [class*=match-time]"),
        }),
        HtmlStrategy::ByPattern(&FIXTURE_PAIR_RE),
        HtmlStrategy::ByHeuristic,
    ]
}

/// Strategies for article/news pages, in the order they are tried.
pub fn article_strategies() -> Vec<HtmlStrategy> {
    vec![
        HtmlStrategy::BySelector(SelectorSpec {
            container: "article, .news-item, [class*=news-list] li, [class*=site-tile]",
            title: Some("h1, h2, h3, [class*=headline]"),
            home_team: None,
            away_team: None,
            summary: Some("p, [class*=summary], [class*=standfirst]"),
            time: Some("time"),
        }),
        HtmlStrategy::ByPattern(&HEADLINE_ANCHOR_RE),
        HtmlStrategy::ByHeuristic,
    ]
}

/// Run one strategy against a document. Selector parse failures and
/// pattern misses both come back as an empty list; the caller decides
/// whether to move on to the next strategy.
pub fn run_strategy(strategy: &HtmlStrategy, category: Category, body: &str) -> Vec<DraftRecord> {
    match strategy {
        HtmlStrategy::BySelector(spec) => by_selector(spec, body),
        HtmlStrategy::ByPattern(re) => by_pattern(re, category, body),
        HtmlStrategy::ByHeuristic => by_heuristic(category, body),
    }
}

fn by_selector(spec: &SelectorSpec, body: &str) -> Vec<DraftRecord> {
    let Ok(container_sel) = Selector::parse(spec.container) else {
        return Vec::new();
    };
    let doc = Html::parse_document(body);

    let mut out = Vec::new();
    for el in doc.select(&container_sel) {
        let title = spec
            .title
            .and_then(|css| select_text(&el, css))
            .unwrap_or_default();
        let home_team = spec.home_team.and_then(|css| select_text(&el, css));
        let away_team = spec.away_team.and_then(|css| select_text(&el, css));

        let title = if title.is_empty() {
            match (&home_team, &away_team) {
                (Some(h), Some(a)) => format!("{h} vs {a}"),
                _ => continue,
            }
        } else {
            title
        };

        out.push(DraftRecord {
            title,
            summary: spec.summary.and_then(|css| select_text(&el, css)),
            link: first_href(&el),
            date_raw: spec.time.and_then(|css| select_datetime(&el, css)),
            home_team,
            away_team,
            ..DraftRecord::default()
        });
    }
    out
}

fn by_pattern(re: &Regex, category: Category, body: &str) -> Vec<DraftRecord> {
    let mut out = Vec::new();
    match category {
        Category::Fixture => {
            // Strip tags first so a pair split across elements still matches.
            let text = TAG_RE.replace_all(body, " ");
            for cap in re.captures_iter(&text) {
                let home = cap[1].trim().to_string();
                let away = cap[2].trim().to_string();
                out.push(DraftRecord {
                    title: format!("{home} vs {away}"),
                    home_team: Some(home),
                    away_team: Some(away),
                    ..DraftRecord::default()
                });
            }
        }
        Category::Article => {
            for cap in re.captures_iter(body) {
                let title = TAG_RE.replace_all(&cap[2], " ").trim().to_string();
                if title.is_empty() {
                    continue;
                }
                out.push(DraftRecord {
                    title,
                    link: Some(cap[1].to_string()),
                    ..DraftRecord::default()
                });
            }
        }
    }
    out
}

/// Last resort: walk the tag-stripped text fragments and keep whatever
/// still looks like the category's shape. Deliberately loose; validation
/// in the cascade driver discards the junk.
fn by_heuristic(category: Category, body: &str) -> Vec<DraftRecord> {
    match category {
        Category::Fixture => {
            let fragments: Vec<String> = body
                .split(|c| c == '<')
                .filter_map(|chunk| chunk.split_once('>').map(|(_, text)| text))
                .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
                .filter(|t| !t.is_empty())
                .collect();

            let mut out = Vec::new();
            let mut i = 0;
            while i + 1 < fragments.len() {
                if looks_like_team(&fragments[i]) && looks_like_team(&fragments[i + 1]) {
                    let (home, away) = (fragments[i].clone(), fragments[i + 1].clone());
                    out.push(DraftRecord {
                        title: format!("{home} vs {away}"),
                        home_team: Some(home),
                        away_team: Some(away),
                        ..DraftRecord::default()
                    });
                    i += 2;
                } else {
                    i += 1;
                }
            }
            out
        }
        Category::Article => {
            static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
                Regex::new(r#"(?is)<a[^>]+href\s*=\s*["']([^"']+)["'][^>]*>(.+?)</a>"#).unwrap()
            });
            ANCHOR_RE
                .captures_iter(body)
                .filter_map(|cap| {
                    let title = TAG_RE.replace_all(&cap[2], " ").trim().to_string();
                    // Long anchor text is the only signal that this is a
                    // headline and not navigation.
                    (title.chars().count() >= 25).then(|| DraftRecord {
                        title,
                        link: Some(cap[1].to_string()),
                        ..DraftRecord::default()
                    })
                })
                .collect()
        }
    }
}

fn looks_like_team(s: &str) -> bool {
    let len = s.chars().count();
    (3..=30).contains(&len)
        && s.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && s.chars()
            .all(|c| c.is_alphabetic() || matches!(c, ' ' | '.' | '\'' | '-' | '&'))
}

fn select_text(scope: &ElementRef, css: &str) -> Option<String> {
    let sel = Selector::parse(css).ok()?;
    let el = scope.select(&sel).next()?;
    let text = el.text().collect::<String>();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

fn select_datetime(scope: &ElementRef, css: &str) -> Option<String> {
    let sel = Selector::parse(css).ok()?;
    let el = scope.select(&sel).next()?;
    if let Some(dt) = el.value().attr("datetime") {
        return Some(dt.to_string());
    }
    let text = el.text().collect::<String>();
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn first_href(scope: &ElementRef) -> Option<String> {
    if let Some(href) = scope.value().attr("href") {
        return Some(href.to_string());
    }
    let sel = Selector::parse("a[href]").ok()?;
    scope
        .select(&sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_strategy_reads_fixture_containers() {
        let body = r#"<html><body>
            <div class="fixture">
              <span class="home-team">Arsenal</span>
              <span class="away-team">Chelsea</span>
              <time datetime="2025-08-16T10:12:00Z">Sat</time>
            </div>
        </body></html>"#;
        let out = run_strategy(&fixture_strategies()[0], Category::Fixture, body);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].home_team.as_deref(), Some("Arsenal"));
        assert_eq!(out[0].away_team.as_deref(), Some("Chelsea"));
        assert_eq!(out[0].date_raw.as_deref(), Some("2025-08-16T10:12:00Z"));
    }

    #[test]
    fn pattern_strategy_pairs_teams_from_flat_text() {
        let body = "<p>Manchester United vs Liverpool kicks off Saturday</p>";
        let out = run_strategy(&fixture_strategies()[1], Category::Fixture, body);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].home_team.as_deref(), Some("Manchester United"));
        assert_eq!(out[0].away_team.as_deref(), Some("Liverpool"));
    }

    #[test]
    fn article_pattern_reads_headline_anchors() {
        let body = r#"<h2 class="headline"><a href="/football/12345">Club confirms record signing after medical</a></h2>"#;
        let out = run_strategy(&article_strategies()[1], Category::Article, body);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].link.as_deref(), Some("/football/12345"));
    }

    #[test]
    fn heuristic_ignores_short_navigation_anchors() {
        let body = r#"<a href="/home">Home</a>
            <a href="/story">Manager hails youth academy graduates after cup run</a>"#;
        let out = run_strategy(&article_strategies()[2], Category::Article, body);
        assert_eq!(out.len(), 1);
        assert!(out[0].title.starts_with("Manager hails"));
    }

    #[test]
    fn strategies_return_empty_on_unmatched_markup() {
        let body = "<html><body><div>nothing to see</div></body></html>";
        for s in fixture_strategies() {
            assert!(run_strategy(&s, Category::Fixture, body).is_empty());
        }
    }
}
