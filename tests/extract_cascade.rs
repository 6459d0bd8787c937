// tests/extract_cascade.rs
use matchwire::extract::extract;
use matchwire::types::{Category, JsonMap, PayloadKind, SourceDescriptor};

fn source(id: &str, category: Category, kind: PayloadKind) -> SourceDescriptor {
    SourceDescriptor {
        id: id.to_string(),
        name: id.to_string(),
        category,
        url: format!("https://example.test/{id}"),
        base_url: Some("https://example.test".to_string()),
        kind,
        max_items: 10,
        json_map: None,
    }
}

#[test]
fn rss_payload_yields_article_drafts() {
    let body = include_str!("fixtures/bbc_football_rss.xml");
    let src = source("bbc-rss", Category::Article, PayloadKind::Xml);
    let drafts = extract(&src, body);
    assert_eq!(drafts.len(), 2);
    assert_eq!(
        drafts[0].title,
        "Champions stumble as promoted side snatch late draw"
    );
    assert_eq!(drafts[0].link.as_deref(), Some("/sport/football/articles/c1001"));
    assert!(drafts[0].date_raw.as_deref().unwrap().contains("2025"));
}

#[test]
fn xml_hinted_error_page_short_circuits_to_empty() {
    let body = include_str!("fixtures/error_page.html");
    let src = source("bbc-rss", Category::Article, PayloadKind::Xml);
    assert!(extract(&src, body).is_empty());
}

#[test]
fn fixture_page_yields_team_pairs_via_selectors() {
    let body = include_str!("fixtures/fixtures_page.html");
    let src = source("bbc-fixtures", Category::Fixture, PayloadKind::Html);
    let drafts = extract(&src, body);
    assert_eq!(drafts.len(), 3);
    assert_eq!(drafts[0].home_team.as_deref(), Some("Arsenal"));
    assert_eq!(drafts[0].away_team.as_deref(), Some("Chelsea"));
    assert_eq!(drafts[0].date_raw.as_deref(), Some("2025-08-16T11:30:00Z"));
}

#[test]
fn json_scoreboard_yields_fixtures_via_field_map() {
    let body = include_str!("fixtures/espn_scoreboard.json");
    let mut src = source("espn", Category::Fixture, PayloadKind::Json);
    src.json_map = Some(JsonMap {
        list: "events".to_string(),
        title: Some("name".to_string()),
        date: Some("date".to_string()),
        status: Some("status.type.description".to_string()),
        ..JsonMap::default()
    });
    let drafts = extract(&src, body);
    assert_eq!(drafts.len(), 2);
    assert_eq!(drafts[0].home_team.as_deref(), Some("Arsenal"));
    assert_eq!(drafts[0].away_team.as_deref(), Some("Chelsea"));
    assert_eq!(drafts[0].status.as_deref(), Some("Scheduled"));
}

#[test]
fn max_items_caps_each_source() {
    let body = include_str!("fixtures/bbc_football_rss.xml");
    let mut src = source("bbc-rss", Category::Article, PayloadKind::Xml);
    src.max_items = 1;
    assert_eq!(extract(&src, body).len(), 1);
}
