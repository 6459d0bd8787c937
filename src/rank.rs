// src/rank.rs
//! Deduplicate and order a merged run. Pure functions, no side effects,
//! so every property here is unit-testable in isolation.

use std::collections::HashSet;

use crate::types::{CanonicalItem, Category};

/// Collapse near-duplicates and impose the category's total order.
///
/// The dedup key is the case-folded, whitespace-collapsed title combined
/// with the source name; first occurrence wins. Source-aware on purpose:
/// the same headline from two outlets is independent coverage and both
/// stay. Fixtures sort ascending by kickoff, articles descending by
/// publication; the sort is stable so ties keep merge order.
pub fn finalize(category: Category, items: Vec<CanonicalItem>) -> Vec<CanonicalItem> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut out: Vec<CanonicalItem> = Vec::with_capacity(items.len());
    for item in items {
        let key = (fold_title(&item.title), item.source.clone());
        if seen.insert(key) {
            out.push(item);
        }
    }

    match category {
        Category::Fixture => out.sort_by_key(|i| i.published_at),
        Category::Article => out.sort_by_key(|i| std::cmp::Reverse(i.published_at)),
    }
    out
}

/// Cap the list length. Only valid after sorting; truncating pre-sort
/// would bias toward whichever source ran first.
pub fn truncate_top(mut items: Vec<CanonicalItem>, cap: usize) -> Vec<CanonicalItem> {
    items.truncate(cap);
    items
}

fn fold_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, source: &str, ts: u64) -> CanonicalItem {
        CanonicalItem {
            id: format!("{source}-{ts}"),
            category: Category::Article,
            title: title.to_string(),
            summary: None,
            link: "https://example.test/".to_string(),
            source: source.to_string(),
            published_at: ts,
            fixture: None,
            author: None,
            synthetic: false,
        }
    }

    #[test]
    fn duplicate_titles_from_one_source_collapse_first_wins() {
        let out = finalize(
            Category::Article,
            vec![
                item("Big  Derby Win", "BBC Sport", 100),
                item("big derby win", "BBC Sport", 90),
                item("Big Derby Win", "Sky Sports", 95),
            ],
        );
        assert_eq!(out.len(), 2);
        // Same headline from a different outlet survives.
        assert!(out.iter().any(|i| i.source == "Sky Sports"));
        let bbc = out.iter().find(|i| i.source == "BBC Sport").unwrap();
        assert_eq!(bbc.published_at, 100);
    }

    #[test]
    fn no_output_pair_shares_a_dedup_key() {
        let out = finalize(
            Category::Article,
            vec![
                item("A", "s1", 1),
                item("a", "s1", 2),
                item("A", "s2", 3),
                item("B", "s1", 4),
            ],
        );
        let mut keys: Vec<_> = out
            .iter()
            .map(|i| (fold_title(&i.title), i.source.clone()))
            .collect();
        let before = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), before);
    }

    #[test]
    fn fixtures_sort_ascending_articles_descending() {
        let fixtures = finalize(
            Category::Fixture,
            vec![item("c", "s", 300), item("a", "s", 100), item("b", "s", 200)],
        );
        assert!(fixtures.windows(2).all(|w| w[0].published_at <= w[1].published_at));

        let articles = finalize(
            Category::Article,
            vec![item("a", "s", 100), item("c", "s", 300), item("b", "s", 200)],
        );
        assert!(articles.windows(2).all(|w| w[0].published_at >= w[1].published_at));
    }

    #[test]
    fn ties_keep_merge_order() {
        let out = finalize(
            Category::Article,
            vec![item("first", "s", 100), item("second", "s", 100)],
        );
        assert_eq!(out[0].title, "first");
        assert_eq!(out[1].title, "second");
    }

    #[test]
    fn finalize_is_idempotent() {
        let once = finalize(
            Category::Article,
            vec![
                item("A", "s1", 5),
                item("a", "s1", 4),
                item("B", "s2", 9),
                item("C", "s1", 7),
            ],
        );
        let twice = finalize(Category::Article, once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn truncation_applies_after_sorting() {
        let sorted = finalize(
            Category::Article,
            vec![item("old", "s", 1), item("new", "s", 9), item("mid", "s", 5)],
        );
        let top = truncate_top(sorted, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].title, "new");
        assert_eq!(top[1].title, "mid");
    }
}
