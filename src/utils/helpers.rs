use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use regex::Regex;
use sha1::{Digest, Sha1};
use std::sync::LazyLock;

/// Reading speed used for the reading-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// Password reset tokens stay valid for this many minutes.
pub const RESET_TOKEN_EXPIRATION_MINUTES: i64 = 15;

const RESET_TOKEN_LENGTH: usize = 32;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Derive a URL-safe slug: lowercase, non-alphanumeric runs become one hyphen,
/// no leading or trailing hyphens.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    NON_ALPHANUMERIC
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Naive whitespace split, tags included.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn strip_html(html: &str) -> String {
    HTML_TAG.replace_all(html, " ").into_owned()
}

/// Escape text for interpolation into HTML bodies and attribute values.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Whole minutes needed to read an HTML body, never less than one.
pub fn reading_time_minutes(html: &str) -> i32 {
    let words = count_words(&strip_html(html));
    words.div_ceil(WORDS_PER_MINUTE).max(1) as i32
}

/// Lowercase, trim and deduplicate hashtags, keeping first-seen order.
pub fn normalize_hashtags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().trim_start_matches('#').trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

/// `YYYY-MM` key for the monthly word tally.
pub fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

pub fn generate_reset_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Only the digest of a reset token is persisted.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
