//! Small text helpers shared by the segmenters, the assembler, and the extractors.

/// Join block lines into a single space-separated string.
pub fn combine_lines<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Title-case every word ("fire bolt" -> "Fire Bolt").
pub fn capitalize_all(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.to_lowercase().chars() {
        if at_word_start && !c.is_whitespace() {
            result.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            result.push(c);
        }
        if c.is_whitespace() {
            at_word_start = true;
        }
    }

    result
}

/// Convert a camelCase identifier to a title ("legendaryActions" -> "Legendary Actions").
pub fn camel_to_title(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 4);
    for (i, c) in text.chars().enumerate() {
        if i == 0 {
            result.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            result.push(' ');
            result.push(c);
        } else {
            result.push(c);
        }
    }
    result
}

/// Parse a "1/4" style fraction.
pub fn parse_fraction(text: &str) -> Option<f64> {
    let (num, denom) = text.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let denom: f64 = denom.trim().parse().ok()?;
    if denom.abs() < f64::EPSILON {
        return None;
    }
    Some(num / denom)
}

/// Parse a signed integer, accepting typographic minus signs and inner spaces ("+ 3", "−1").
pub fn parse_signed(text: &str) -> Option<i32> {
    let normalized: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '−' | '–' | '—' => '-',
            other => other,
        })
        .collect();
    normalized.trim_start_matches('+').parse().ok()
}

/// Split on `separator` only where it is not inside parentheses.
pub fn split_outside_parens(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    parts
}

/// Remove one trailing occurrence of `suffix`.
pub fn trim_suffix<'a>(text: &'a str, suffix: &str) -> &'a str {
    text.strip_suffix(suffix).unwrap_or(text)
}
