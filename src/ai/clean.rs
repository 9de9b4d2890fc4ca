use regex::Regex;
use std::sync::OnceLock;

use crate::news::Summary;

struct EdgePatterns {
    leading_tokens: Regex,
    trailing_tokens: Regex,
    leading_junk: Regex,
    trailing_junk: Regex,
}

fn patterns() -> &'static EdgePatterns {
    static PATTERNS: OnceLock<EdgePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| EdgePatterns {
        leading_tokens: Regex::new(r"(?i)^\s*(?:(?:undefined|null)\s*)+")
            .expect("static regex"),
        trailing_tokens: Regex::new(r"(?i)(?:\s*(?:undefined|null))+\s*$")
            .expect("static regex"),
        leading_junk: Regex::new(r"^[^\p{L}\p{M}\p{N}\p{P}\p{S}]+").expect("static regex"),
        trailing_junk: Regex::new(r"[^\p{L}\p{M}\p{N}\p{P}\p{S}]+$").expect("static regex"),
    })
}

fn strip_edges_once(s: &str) -> &str {
    let p = patterns();
    let s = p.leading_tokens.find(s).map_or(s, |m| &s[m.end()..]);
    let s = p.trailing_tokens.find(s).map_or(s, |m| &s[..m.start()]);
    let s = p.leading_junk.find(s).map_or(s, |m| &s[m.end()..]);
    let s = p.trailing_junk.find(s).map_or(s, |m| &s[..m.start()]);
    s.trim()
}

/// Trim the junk models wrap around an answer.
///
/// Removes stray `undefined`/`null` tokens at either end, even when glued
/// to the adjacent word, then any leading
/// or trailing run of characters that are not letters, numbers,
/// punctuation or symbols (whitespace, control and format characters).
/// Repeats until nothing changes, so the result is stable under a second
/// pass. Text in the middle is never touched.
///
/// Combining marks count as letters: Telugu and Hindi words often end in a
/// vowel sign.
pub fn clean_output(raw: &str) -> String {
    let mut current = raw.trim();
    loop {
        let next = strip_edges_once(current);
        if next.len() == current.len() {
            return current.to_string();
        }
        current = next;
    }
}

/// Remove a surrounding Markdown code fence (```` ```json ... ``` ````).
pub fn strip_code_fences(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```") {
        // Drop the info string ("json") along with the opening fence
        s = rest
            .split_once('\n')
            .map_or_else(|| rest.trim_start_matches("json"), |(_, body)| body);
    }
    if let Some(rest) = s.trim_end().strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Parse a summary answer: fences stripped, edges cleaned, then JSON.
///
/// Falls back to the outermost `{...}` when the model adds prose around
/// the object.
pub fn parse_summary(raw: &str) -> Option<Summary> {
    let cleaned = clean_output(strip_code_fences(raw));
    if let Ok(summary) = serde_json::from_str::<Summary>(&cleaned) {
        return Some(summary);
    }

    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&cleaned[start..=end]).ok()
}
