// src/extract/json.rs
use anyhow::{anyhow, Context, Result};
use serde_json::Value;

use crate::types::{DraftRecord, JsonMap};

/// Extract drafts from a JSON payload using the source's field map. The map
/// names where the item list lives and which keys hold which fields; paths
/// use dots to descend into nested objects.
pub fn extract_items(body: &str, map: &JsonMap) -> Result<Vec<DraftRecord>> {
    let root: Value = serde_json::from_str(body).context("parsing json payload")?;
    let list = lookup(&root, &map.list)
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("json payload has no list at '{}'", map.list))?;

    let mut out = Vec::with_capacity(list.len());
    for el in list {
        if !el.is_object() {
            continue;
        }
        let title = pick(el, map.title.as_deref()).unwrap_or_default();
        let home_team = pick(el, map.home_team.as_deref());
        let away_team = pick(el, map.away_team.as_deref());
        if title.trim().is_empty() && home_team.is_none() {
            continue;
        }
        out.push(DraftRecord {
            title,
            summary: pick(el, map.summary.as_deref()),
            link: pick(el, map.link.as_deref()),
            date_raw: pick(el, map.date.as_deref()),
            home_team,
            away_team,
            venue: pick(el, map.venue.as_deref()),
            status: pick(el, map.status.as_deref()),
            author: pick(el, map.author.as_deref()),
            ..DraftRecord::default()
        });
    }
    Ok(out)
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut cur = root;
    for seg in path.split('.') {
        cur = cur.get(seg)?;
    }
    Some(cur)
}

fn pick(el: &Value, path: Option<&str>) -> Option<String> {
    let v = lookup(el, path?)?;
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
