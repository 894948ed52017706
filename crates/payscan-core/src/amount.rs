//! Amount normalizer: keeps a typed currency amount in canonical, editable form
//!
//! The display normalizer runs on every keystroke; the parser runs once on
//! submit. They deliberately disagree on what "nothing usable" means: the
//! display goes blank while the parsed value is `0`.
//!
//! # Pipeline
//!
//! `keystrokes → normalize_display → AmountText → parse_amount → f64 → format_two_decimals`
//!
//! # Guarantees
//!
//! - **Idempotent**: `normalize_display(normalize_display(x)) == normalize_display(x)`
//! - **Total**: every function accepts any string and never panics
//! - **Bounded**: at most one separator and two fractional digits survive

/// Separator glyphs accepted when no explicit set is given.
pub const DEFAULT_SEPARATORS: &[char] = &['.', ','];

/// Glyph handed to the float conversion
const CANONICAL_SEPARATOR: char = '.';

const MAX_FRACTION_DIGITS: usize = 2;

// ── Display normalizer ─────────────────────────────────────

/// Normalize raw amount input using [`DEFAULT_SEPARATORS`].
pub fn normalize_display(raw: &str) -> String {
    normalize_display_with(raw, DEFAULT_SEPARATORS)
}

/// Normalize raw amount input to an `AmountText`.
///
/// Steps:
/// 1. Drop everything but ASCII digits and accepted separators
/// 2. Keep the first separator only
/// 3. Truncate the fraction to two digits, keeping the glyph the user typed
/// 4. Collapse leading zeros of a separator-free string (`"00012"` → `"12"`)
///
/// A lone separator is kept so typing can continue into the fraction.
pub fn normalize_display_with(raw: &str, separators: &[char]) -> String {
    let is_separator = |c: char| separators.contains(&c);

    // ── Step 1: digits and separators only ─────────────
    let kept: String = raw
        .chars()
        .filter(|&c| c.is_ascii_digit() || is_separator(c))
        .collect();

    // ── Step 2: first separator wins ───────────────────
    let Some((idx, glyph)) = kept.char_indices().find(|&(_, c)| is_separator(c)) else {
        // ── Step 4: integer only ───────────────────────
        if kept.is_empty() {
            return String::new();
        }
        let trimmed = kept.trim_start_matches('0');
        return if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        };
    };

    let integer = &kept[..idx];
    let mut fraction: String = kept[idx + glyph.len_utf8()..]
        .chars()
        .filter(|&c| !is_separator(c))
        .collect();

    // ── Step 3: two fractional digits ──────────────────
    // fraction holds ASCII digits only, so byte truncation is char-safe
    fraction.truncate(MAX_FRACTION_DIGITS);

    format!("{integer}{glyph}{fraction}")
}

// ── Parser ─────────────────────────────────────────────────

/// Parse an `AmountText` using [`DEFAULT_SEPARATORS`].
pub fn parse_amount(text: &str) -> f64 {
    parse_amount_with(text, DEFAULT_SEPARATORS)
}

/// Convert amount text to a non-negative finite number.
///
/// Whitespace is removed, the first alternate separator becomes `.`, and the
/// longest leading decimal number is parsed (trailing garbage is ignored).
/// Anything unparseable, signed, or non-finite yields `0.0`.
pub fn parse_amount_with(text: &str, separators: &[char]) -> f64 {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let canonical = replace_first_alternate(&compact, separators);

    let value = leading_number(&canonical)
        .and_then(|number| number.parse::<f64>().ok())
        .unwrap_or(0.0);

    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn replace_first_alternate(text: &str, separators: &[char]) -> String {
    let alternate = text
        .char_indices()
        .find(|&(_, c)| c != CANONICAL_SEPARATOR && separators.contains(&c));

    match alternate {
        Some((idx, glyph)) => {
            let mut out = String::with_capacity(text.len());
            out.push_str(&text[..idx]);
            out.push(CANONICAL_SEPARATOR);
            out.push_str(&text[idx + glyph.len_utf8()..]);
            out
        }
        None => text.to_string(),
    }
}

/// Longest prefix shaped like `digits[.digits][e[+-]digits]` with at least
/// one mantissa digit.
fn leading_number(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = digits_from(0);
    let mut has_digits = end > 0;

    // a trailing `.` still belongs to the mantissa when digits precede it
    if bytes.get(end) == Some(&b'.') {
        let fraction_end = digits_from(end + 1);
        if has_digits || fraction_end > end + 1 {
            has_digits = true;
            end = fraction_end;
        }
    }

    if !has_digits {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut start = end + 1;
        if matches!(bytes.get(start), Some(b'+' | b'-')) {
            start += 1;
        }
        let exponent_end = digits_from(start);
        if exponent_end > start {
            end = exponent_end;
        }
    }

    Some(&text[..end])
}

// ── Formatter ──────────────────────────────────────────────

/// Fixed two-decimal currency text (`12.5` → `"12.50"`).
///
/// Non-finite input formats as `"0.00"`. Ties round half-to-even on the
/// exact binary value; normalized input never carries a third decimal, so
/// ties do not arise from typed amounts.
pub fn format_two_decimals(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "0.00".to_string();
    }
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separator_count(s: &str) -> usize {
        s.chars().filter(|c| DEFAULT_SEPARATORS.contains(c)).count()
    }

    fn fraction_len(s: &str) -> usize {
        match s.find(|c| DEFAULT_SEPARATORS.contains(&c)) {
            Some(idx) => s[idx + 1..].len(),
            None => 0,
        }
    }

    /// Every string up to length 4 over a small alphabet of digits,
    /// both separators, noise and whitespace.
    fn exhaustive_inputs() -> Vec<String> {
        let alphabet = ['0', '1', '5', '.', ',', 'x', ' '];
        let mut all = vec![String::new()];
        let mut frontier = vec![String::new()];
        for _ in 0..4 {
            let mut next = Vec::new();
            for prefix in &frontier {
                for c in alphabet {
                    let mut s = prefix.clone();
                    s.push(c);
                    next.push(s);
                }
            }
            all.extend(next.iter().cloned());
            frontier = next;
        }
        all
    }

    // ── normalize_display ──────────────────────────────

    #[test]
    fn test_normalize_collapses_leading_zeros() {
        assert_eq!(normalize_display("00045"), "45");
        assert_eq!(normalize_display("0"), "0");
        assert_eq!(normalize_display("0000"), "0");
    }

    #[test]
    fn test_normalize_truncates_fraction() {
        assert_eq!(normalize_display("12.345"), "12.34");
        assert_eq!(normalize_display("12,999"), "12,99");
    }

    #[test]
    fn test_normalize_keeps_first_separator_only() {
        assert_eq!(normalize_display("1.2,3.4"), "1.23");
        assert_eq!(normalize_display("1,,5"), "1,5");
        assert_eq!(normalize_display(",.,"), ",");
    }

    #[test]
    fn test_normalize_preserves_user_glyph() {
        assert_eq!(normalize_display("12,5"), "12,5");
        assert_eq!(normalize_display("12.5"), "12.5");
        assert_eq!(normalize_display("7,1234"), "7,12");
    }

    #[test]
    fn test_normalize_lone_separator_survives() {
        assert_eq!(normalize_display(","), ",");
        assert_eq!(normalize_display("."), ".");
        assert_eq!(normalize_display(",5"), ",5");
    }

    #[test]
    fn test_normalize_strips_noise() {
        assert_eq!(normalize_display("abc"), "");
        assert_eq!(normalize_display(""), "");
        assert_eq!(normalize_display("€ 1 2 3"), "123");
        assert_eq!(normalize_display("-5"), "5");
        assert_eq!(normalize_display("1e5"), "15");
    }

    #[test]
    fn test_normalize_keeps_zeros_before_separator() {
        assert_eq!(normalize_display("00,5"), "00,5");
        assert_eq!(normalize_display("0."), "0.");
    }

    #[test]
    fn test_normalize_ignores_non_ascii_digits() {
        assert_eq!(normalize_display("١٢3"), "3");
    }

    #[test]
    fn test_normalize_custom_separators() {
        let arabic = &['٫', '.'];
        assert_eq!(normalize_display_with("12٫345", arabic), "12٫34");
        assert_eq!(normalize_display_with("12,5", arabic), "125");
        assert_eq!(normalize_display_with("1.2٫3", arabic), "1.23");
    }

    #[test]
    fn test_normalize_idempotent() {
        for input in exhaustive_inputs() {
            let once = normalize_display(&input);
            let twice = normalize_display(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_normalize_output_shape() {
        for input in exhaustive_inputs() {
            let out = normalize_display(&input);
            assert!(separator_count(&out) <= 1, "{:?} -> {:?}", input, out);
            assert!(fraction_len(&out) <= 2, "{:?} -> {:?}", input, out);
            assert!(
                out.chars()
                    .all(|c| c.is_ascii_digit() || DEFAULT_SEPARATORS.contains(&c)),
                "{:?} -> {:?}",
                input,
                out
            );
        }
    }

    // ── parse_amount ───────────────────────────────────

    #[test]
    fn test_parse_clean_amounts() {
        assert_eq!(parse_amount("12.34"), 12.34);
        assert_eq!(parse_amount("12,5"), 12.5);
        assert_eq!(parse_amount("45"), 45.0);
    }

    #[test]
    fn test_parse_unusable_is_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount(","), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("1e999"), 0.0);
    }

    #[test]
    fn test_parse_never_negative() {
        assert_eq!(parse_amount("-5"), 0.0);
        assert_eq!(parse_amount("+5"), 0.0);
    }

    #[test]
    fn test_parse_prefix_semantics() {
        assert_eq!(parse_amount("12."), 12.0);
        assert_eq!(parse_amount(",5"), 0.5);
        assert_eq!(parse_amount("1.2,5"), 1.2);
        assert_eq!(parse_amount("3abc"), 3.0);
        assert_eq!(parse_amount("1e3"), 1000.0);
        assert_eq!(parse_amount("2e"), 2.0);
        assert_eq!(parse_amount("1.e5"), 100000.0);
        assert_eq!(parse_amount("1,e2"), 100.0);
        assert_eq!(parse_amount("12.x"), 12.0);
        assert_eq!(parse_amount(".e5"), 0.0);
    }

    #[test]
    fn test_parse_removes_whitespace() {
        assert_eq!(parse_amount(" 1 234,5 "), 1234.5);
        assert_eq!(parse_amount("\t7\n"), 7.0);
    }

    #[test]
    fn test_parse_custom_separators() {
        assert_eq!(parse_amount_with("12٫5", &['٫']), 12.5);
        assert_eq!(parse_amount_with("12,5", &['٫']), 12.0);
    }

    #[test]
    fn test_parse_of_normalized_is_finite_non_negative() {
        for input in exhaustive_inputs() {
            let value = parse_amount(&normalize_display(&input));
            assert!(value.is_finite() && value >= 0.0, "{:?} -> {}", input, value);
        }
    }

    // ── format_two_decimals ────────────────────────────

    #[test]
    fn test_format_two_decimals() {
        assert_eq!(format_two_decimals(12.34), "12.34");
        assert_eq!(format_two_decimals(12.5), "12.50");
        assert_eq!(format_two_decimals(45.0), "45.00");
        assert_eq!(format_two_decimals(0.0), "0.00");
        assert_eq!(format_two_decimals(-0.0), "0.00");
        assert_eq!(format_two_decimals(f64::NAN), "0.00");
    }

    #[test]
    fn test_tap_scenario_end_to_end() {
        let mut display = String::new();
        for tap in ["1", "2", ",", "5"] {
            display = normalize_display(&format!("{display}{tap}"));
        }
        assert_eq!(display, "12,5");
        let value = parse_amount(&display);
        assert_eq!(value, 12.5);
        assert_eq!(format_two_decimals(value), "12.50");
    }
}
