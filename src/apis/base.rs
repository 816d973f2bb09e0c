//! Extraction helpers shared by the platform adapters.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::types::{Platform, RemoteMetadata, ScrapedMetadata};

static BR_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?\s*>").expect("valid regex"));
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(lt|gt|amp|quot|#39|nbsp);").expect("valid regex"));
static JSON_LD_SCRIPT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector")
});

/// Decodes the handful of entities third-party pages use in review text.
/// Single pass, so `&amp;lt;` becomes `&lt;`.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| match &caps[1] {
            "lt" => "<",
            "gt" => ">",
            "amp" => "&",
            "quot" => "\"",
            "#39" => "'",
            _ => " ",
        })
        .into_owned()
}

/// Turns an HTML fragment into plain text: line breaks and tags become
/// whitespace, whitespace runs collapse to one space, entities are decoded.
pub fn clean_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let text = BR_TAG.replace_all(html, "\n");
    let text = ANY_TAG.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    decode_entities(text.trim())
}

/// Returns the first JSON-LD object on the page that satisfies `predicate`.
///
/// Every `application/ld+json` script is tried in document order; blocks that
/// are not valid JSON are skipped and top-level arrays are searched item by item.
pub fn find_json_ld<P>(html: &str, predicate: P) -> Option<Value>
where
    P: Fn(&Value) -> bool,
{
    let document = Html::parse_document(html);
    for script in document.select(&JSON_LD_SCRIPT) {
        let raw = script.text().collect::<String>();
        let parsed: Value = match serde_json::from_str(raw.trim()) {
            Ok(value) => value,
            Err(e) => {
                debug!("Skipping invalid JSON-LD block: {}", e);
                continue;
            }
        };

        match parsed {
            Value::Array(items) => {
                if let Some(found) = items.into_iter().find(|item| predicate(item)) {
                    return Some(found);
                }
            }
            other if predicate(&other) => return Some(other),
            _ => {}
        }
    }
    None
}

/// True when `field` is present and not JSON-falsy
pub fn has_truthy(value: &Value, field: &str) -> bool {
    match value.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0),
        Some(_) => true,
    }
}

/// True when `@type` equals `kind`, or is an array containing it
pub fn has_type(value: &Value, kind: &str) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == kind,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(kind)),
        _ => false,
    }
}

/// Reads a number that structured data may encode as a JSON number or a string
pub fn number_field(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Reads a non-negative count, accepting `"1,234"` style strings
pub fn count_field(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().replace(',', "").parse::<u64>().ok(),
        _ => None,
    }
}

/// Rating scale from `bestRating`; absent, zero or unparseable means 10
pub fn scale_field(value: Option<&Value>, default: f64) -> f64 {
    number_field(value).filter(|s| *s != 0.0).unwrap_or(default)
}

/// An `image` property: a URL string, an object with `url`, or a list of those
pub fn image_url(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(obj) => image_url(obj.get("url")),
        Value::Array(items) => items.iter().find_map(|item| image_url(Some(item))),
        _ => None,
    }
}

/// Converts an adapter's internal result into the record handed to the orchestrator
pub fn into_remote(
    platform: Platform,
    url: &str,
    result: Result<ScrapedMetadata, FetchError>,
) -> RemoteMetadata {
    match result {
        Ok(meta) => {
            debug!(
                platform = %platform,
                url,
                rating = ?meta.rating,
                comments = meta.hot_comments.len(),
                "Scrape succeeded"
            );
            meta.into()
        }
        Err(err) => {
            warn!(platform = %platform, url, error = %err, "Scrape failed");
            RemoteMetadata::failed(platform, err)
        }
    }
}
