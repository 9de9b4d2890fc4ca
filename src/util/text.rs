use std::borrow::Cow;

/// Ellipsis appended to previews
const ELLIPSIS: &str = "...";

/// First `max_chars` characters of `s` followed by "...".
///
/// Counts Unicode scalar values rather than bytes, so a preview never splits
/// a multi-byte character. The ellipsis is always appended, matching the
/// "read more" style previews on the home listing.
pub fn preview(s: &str, max_chars: usize) -> String {
    let end = s
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len());
    format!("{}{}", &s[..end], ELLIPSIS)
}

/// Uppercases the first character: `"positive"` becomes `"Positive"`.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strip terminal control characters and ANSI escape sequences from text.
///
/// Model output and user comments are printed straight to the terminal, so
/// anything that could move the cursor, retitle the window or recolour the
/// screen is removed before display.
///
/// Strips:
/// - ASCII control chars: 0x00-0x08, 0x0B-0x0C, 0x0E-0x1F, 0x7F
/// - ANSI CSI sequences: `\x1b[` ... (terminal byte 0x40-0x7E)
/// - ANSI OSC sequences: `\x1b]` ... (until BEL 0x07 or ST `\x1b\\`)
/// - Bare ESC (0x1b) not followed by `[` or `]`
///
/// Preserves tab, newline and carriage return. Returns `Cow::Borrowed` when
/// nothing needs stripping.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let len = bytes.len();

    if !bytes.iter().any(|&b| is_stripped_byte(b)) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(len);
    let mut i = 0;

    while i < len {
        let b = bytes[i];

        if b == 0x1b {
            if i + 1 < len && bytes[i + 1] == b'[' {
                i += 2;
                while i < len {
                    let c = bytes[i];
                    i += 1;
                    if (0x40..=0x7e).contains(&c) {
                        break;
                    }
                }
            } else if i + 1 < len && bytes[i + 1] == b']' {
                i += 2;
                while i < len {
                    if bytes[i] == 0x07 {
                        i += 1;
                        break;
                    }
                    if bytes[i] == 0x1b && i + 1 < len && bytes[i + 1] == b'\\' {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            } else {
                i += 1;
            }
        } else if is_stripped_byte(b) {
            i += 1;
        } else {
            let start = i;
            i += 1;
            while i < len && !is_stripped_byte(bytes[i]) {
                i += 1;
            }
            // Only ASCII bytes end a run, and those never occur mid-codepoint.
            out.push_str(&s[start..i]);
        }
    }

    Cow::Owned(out)
}

fn is_stripped_byte(b: u8) -> bool {
    b == 0x1b || b == 0x7f || (b < 0x20 && b != 0x09 && b != 0x0a && b != 0x0d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_counts_chars_not_bytes() {
        assert_eq!(preview("हृदय स्वास्थ्य", 4), "हृदय...");
        assert_eq!(preview("abc", 100), "abc...");
        assert_eq!(preview("", 10), "...");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("neutral"), "Neutral");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("é"), "É");
    }

    #[test]
    fn test_strip_clean_text_returns_borrowed() {
        let input = "Drink water.\n\tStay active.";
        let result = strip_control_chars(input);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, input);
    }

    #[test]
    fn test_strip_control_chars_removes_controls() {
        let input = "he\x00ll\x07o\x08 w\x0bor\x0cld\x01!";
        assert_eq!(strip_control_chars(input), "hello world!");
        assert_eq!(strip_control_chars("delete\x7fme"), "deleteme");
    }

    #[test]
    fn test_strip_ansi_sequences() {
        assert_eq!(strip_control_chars("\x1b[31mRed text\x1b[0m"), "Red text");
        assert_eq!(strip_control_chars("before\x1b[2Aafter"), "beforeafter");
        assert_eq!(
            strip_control_chars("\x1b]0;malicious title\x07safe text"),
            "safe text"
        );
        assert_eq!(
            strip_control_chars("\x1b]0;malicious title\x1b\\safe text"),
            "safe text"
        );
        assert_eq!(strip_control_chars("before\x1bafter"), "beforeafter");
    }

    #[test]
    fn test_strip_unicode_preserved() {
        let input = "स्वास्थ्य \x1b[31mటిప్\x1b[0m tip";
        assert_eq!(strip_control_chars(input), "स्वास्थ्य టిప్ tip");
    }
}
