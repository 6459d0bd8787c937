// src/cache.rs
use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::types::{CanonicalItem, Category};

/// Last good aggregation for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub items: Vec<CanonicalItem>,
    pub fetched_at: u64,
}

/// Per-category TTL cache. Process-wide, keyed strictly by category so
/// concurrent fixture and news aggregations cannot interfere. Callers pass
/// `now` explicitly, which keeps expiry deterministic in tests.
#[derive(Debug)]
pub struct TtlCache {
    inner: Mutex<HashMap<Category, CacheEntry>>,
    fixtures_ttl_secs: u64,
    news_ttl_secs: u64,
}

impl TtlCache {
    pub fn new(fixtures_ttl_secs: u64, news_ttl_secs: u64) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            fixtures_ttl_secs,
            news_ttl_secs,
        }
    }

    fn ttl(&self, category: Category) -> u64 {
        match category {
            Category::Fixture => self.fixtures_ttl_secs,
            Category::Article => self.news_ttl_secs,
        }
    }

    /// Fresh entry or miss.
    pub fn get(&self, category: Category, now: u64) -> Option<Vec<CanonicalItem>> {
        let map = self.inner.lock().expect("cache mutex poisoned");
        let entry = map.get(&category)?;
        if now.saturating_sub(entry.fetched_at) < self.ttl(category) {
            Some(entry.items.clone())
        } else {
            None
        }
    }

    /// Last good entry regardless of age. Stale-but-real beats no data.
    pub fn get_stale(&self, category: Category) -> Option<Vec<CanonicalItem>> {
        let map = self.inner.lock().expect("cache mutex poisoned");
        map.get(&category).map(|e| e.items.clone())
    }

    /// Store a successful aggregation. Empty lists are ignored: an empty
    /// run must never overwrite a previously good entry.
    pub fn put(&self, category: Category, items: Vec<CanonicalItem>, now: u64) {
        if items.is_empty() {
            return;
        }
        let mut map = self.inner.lock().expect("cache mutex poisoned");
        map.insert(
            category,
            CacheEntry {
                items,
                fetched_at: now,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str) -> CanonicalItem {
        CanonicalItem {
            id: title.to_string(),
            category: Category::Article,
            title: title.to_string(),
            summary: None,
            link: "https://example.test/".to_string(),
            source: "s".to_string(),
            published_at: 0,
            fixture: None,
            author: None,
            synthetic: false,
        }
    }

    #[test]
    fn hit_within_ttl_miss_after() {
        let cache = TtlCache::new(900, 300);
        cache.put(Category::Article, vec![item("a")], 1_000);
        assert!(cache.get(Category::Article, 1_299).is_some());
        assert!(cache.get(Category::Article, 1_300).is_none());
        assert!(cache.get_stale(Category::Article).is_some());
    }

    #[test]
    fn empty_put_never_overwrites_good_data() {
        let cache = TtlCache::new(900, 300);
        cache.put(Category::Article, vec![item("a")], 1_000);
        cache.put(Category::Article, Vec::new(), 1_100);
        let items = cache.get(Category::Article, 1_100).unwrap();
        assert_eq!(items[0].title, "a");
    }

    #[test]
    fn categories_do_not_interfere() {
        let cache = TtlCache::new(900, 300);
        cache.put(Category::Fixture, vec![item("f")], 1_000);
        assert!(cache.get(Category::Article, 1_000).is_none());
        assert!(cache.get(Category::Fixture, 1_000).is_some());
    }
}
