// src/extract/rss.rs
use anyhow::{Context, Result};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::types::DraftRecord;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    #[serde(rename = "creator")]
    creator: Option<String>,
    author: Option<String>,
}

/// Parse an RSS channel into draft records. Feeds in the wild embed bare
/// HTML entities that are not valid XML, so those are scrubbed first.
pub fn extract_items(body: &str) -> Result<Vec<DraftRecord>> {
    let xml_clean = scrub_html_entities_for_xml(body);
    let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        let title = it.title.unwrap_or_default();
        if title.trim().is_empty() {
            continue;
        }
        out.push(DraftRecord {
            title,
            summary: it.description,
            link: it.link,
            date_raw: it.pub_date,
            author: it.creator.or(it.author),
            ..DraftRecord::default()
        });
    }
    Ok(out)
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel>
  <title>Football</title>
  <item>
    <title>Late winner seals derby &ndash; report</title>
    <link>https://example.test/report</link>
    <pubDate>Sat, 16 Aug 2025 10:12:00 GMT</pubDate>
    <description>Injury-time drama at the derby.</description>
  </item>
  <item>
    <title></title>
    <link>https://example.test/empty</link>
  </item>
</channel></rss>"#;

    #[test]
    fn parses_items_and_skips_empty_titles() {
        let items = extract_items(FEED).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Late winner seals derby - report");
        assert_eq!(items[0].link.as_deref(), Some("https://example.test/report"));
        assert_eq!(
            items[0].date_raw.as_deref(),
            Some("Sat, 16 Aug 2025 10:12:00 GMT")
        );
    }

    #[test]
    fn malformed_xml_is_an_error_not_a_panic() {
        assert!(extract_items("<rss><channel><item>").is_err());
    }
}
