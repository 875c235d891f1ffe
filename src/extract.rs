//! # Symbol Extractor
//!
//! Pulls `$`-prefixed ticker candidates out of free text.
//!
//! - Whitespace tokenization, trailing `.,!?;:` stripped.
//! - Monetary amounts (`$100`, `$69k`, `$1.5M`) are not tickers.
//! - Output keeps first-occurrence order and drops later duplicates.
//!
//! Pure and infallible: no candidates simply yields an empty `Vec`.

use std::collections::HashSet;

pub const TICKER_SIGIL: char = '$';

const TRAILING_PUNCT: [char; 6] = ['.', ',', '!', '?', ';', ':'];

/// Extract ticker candidates, case preserved as written.
pub fn extract_tickers(text: &str) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();

    for raw in text.split_whitespace() {
        let token = raw.trim_end_matches(TRAILING_PUNCT);
        let Some(body) = token.strip_prefix(TICKER_SIGIL) else {
            continue;
        };
        if is_monetary(body) {
            continue;
        }
        if seen.insert(token) {
            out.push(token.to_string());
        }
    }

    out
}

/// `true` when the sigil-less remainder reads as an amount of money.
///
/// A bare `$` (empty remainder) is not monetary and passes through as a candidate.
pub fn is_monetary(body: &str) -> bool {
    match body.chars().last() {
        Some(last) if is_magnitude_suffix(last) => {
            is_plain_number(&body[..body.len() - last.len_utf8()])
        }
        Some(_) => is_plain_number(body),
        None => false,
    }
}

fn is_magnitude_suffix(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'k' | 'm' | 'b' | 't')
}

/// Digits with at most one interior `.`.
fn is_plain_number(s: &str) -> bool {
    if s.is_empty() || s.starts_with('.') || s.ends_with('.') {
        return false;
    }
    let mut dots = 0usize;
    for c in s.chars() {
        match c {
            '0'..='9' => {}
            '.' => {
                dots += 1;
                if dots > 1 {
                    return false;
                }
            }
            _ => return false,
        }
    }
    true
}
