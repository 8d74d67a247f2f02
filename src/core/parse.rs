// src/core/parse.rs
//
// Loose text → numbers. The host page renders everything as prose with
// currency symbols, thousands separators and unit suffixes mixed in, so all
// of these are best-effort scanners that answer NaN/None instead of erroring.

use crate::config::consts::{RED_B_MAX, RED_G_MAX, RED_R_MIN};

/// First decimal number in `text`, thousands separators stripped, optional
/// leading sign (a `$` may sit between the sign and the digits).
/// NaN when no number is present.
pub fn parse_number(text: &str) -> f64 {
    let s: String = text.chars().filter(|&c| c != ',').collect();
    let bytes = s.as_bytes();

    let Some(start) = bytes.iter().position(|b| b.is_ascii_digit()) else {
        return f64::NAN;
    };

    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }

    let mag: f64 = match s[start..end].parse() {
        Ok(v) => v,
        Err(_) => return f64::NAN,
    };

    // Walk back over whitespace and a currency symbol to find a sign.
    let mut neg = false;
    let mut prefix = &s[..start];
    while let Some(c) = prefix.chars().next_back() {
        if c.is_whitespace() || c == '$' {
            prefix = &prefix[..prefix.len() - c.len_utf8()];
            continue;
        }
        neg = c == '-' || c == '\u{2212}';
        break;
    }

    if neg { -mag } else { mag }
}

fn duration_component(s: &str, unit: u8) -> Option<f64> {
    let b = s.as_bytes();
    let mut i = 0;
    while i < b.len() {
        if b[i].is_ascii_digit() {
            let start = i;
            while i < b.len() && b[i].is_ascii_digit() {
                i += 1;
            }
            let mut j = i;
            while j < b.len() && b[j].is_ascii_whitespace() {
                j += 1;
            }
            if j < b.len() && b[j].to_ascii_lowercase() == unit {
                return s[start..i].parse().ok();
            }
        } else {
            i += 1;
        }
    }
    None
}

/// Sum of independently matched `Nd`/`Nh`/`Nm`/`Ns` components, in seconds.
/// Any subset, any order, case-insensitive, separators tolerated.
///
/// Known limitation: a total of exactly zero reads as NaN, so a genuine
/// zero-length duration is indistinguishable from "nothing matched".
pub fn parse_duration_secs(text: &str) -> f64 {
    let mut total = 0.0;
    if let Some(d) = duration_component(text, b'd') {
        total += d * 86_400.0;
    }
    if let Some(h) = duration_component(text, b'h') {
        total += h * 3_600.0;
    }
    if let Some(m) = duration_component(text, b'm') {
        total += m * 60.0;
    }
    if let Some(s) = duration_component(text, b's') {
        total += s;
    }
    if total > 0.0 { total } else { f64::NAN }
}

pub fn format_money(x: f64) -> String {
    if !x.is_finite() {
        return "—".to_string();
    }
    let sign = if x < 0.0 { "-" } else { "" };
    format!("{}${:.2}", sign, x.abs())
}

/// `format_money` with a rate suffix, e.g. `$12.00/min`.
pub fn format_money_rate(x: f64, unit: &str) -> String {
    if !x.is_finite() {
        return "—".to_string();
    }
    format!("{}/{}", format_money(x), unit)
}

/// Recipe quantity grammar: `"3x"`, `"1/2x"`, `"0.1x"` (trailing x optional).
pub fn parse_quantity_x(text: &str) -> Option<f64> {
    let t = text.trim();
    let t = t
        .strip_suffix('x')
        .or_else(|| t.strip_suffix('X'))
        .unwrap_or(t)
        .trim();
    if t.is_empty() {
        return None;
    }
    if let Some((num, den)) = t.split_once('/') {
        let n: f64 = num.trim().parse().ok()?;
        let d: f64 = den.trim().parse().ok()?;
        if d == 0.0 {
            return None;
        }
        return Some(n / d);
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Byte range of the first currency-shaped token (`-?$?digits[.digits]`).
pub fn first_money_token(s: &str) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    let d0 = bytes.iter().position(|b| b.is_ascii_digit())?;

    let mut end = d0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }

    let mut start = d0;
    if start > 0 && bytes[start - 1] == b'$' {
        start -= 1;
    }
    let prefix = &s[..start];
    if let Some(c) = prefix.chars().next_back() {
        if c == '-' || c == '\u{2212}' {
            start -= c.len_utf8();
        }
    }
    Some((start, end))
}

/// Explicit-negative detection for a money token inside `s`: a leading minus
/// on the token itself, or an opening parenthesis just before it.
pub fn has_explicit_minus(s: &str, token: (usize, usize)) -> bool {
    let (start, _) = token;
    let tok = &s[start..];
    if tok.starts_with('-') || tok.starts_with('\u{2212}') {
        return true;
    }
    let mut prefix = &s[..start];
    while let Some(c) = prefix.chars().next_back() {
        if c.is_whitespace() || c == '$' {
            prefix = &prefix[..prefix.len() - c.len_utf8()];
            continue;
        }
        return c == '(' || c == '-' || c == '\u{2212}';
    }
    false
}

/// The `color:` declaration of an inline style, as RGB.
/// Understands `rgb()`, `rgba()` and `#hex`; skips `background-color` etc.
pub fn css_color(style: &str) -> Option<(u8, u8, u8)> {
    let lower = style.to_ascii_lowercase();
    let mut from = 0;
    while let Some(rel) = lower[from..].find("color") {
        let at = from + rel;
        let standalone = at == 0
            || matches!(lower.as_bytes()[at - 1], b';' | b' ' | b'\t' | b'{' | b'"' | b'\'');
        let after = lower[at + 5..].trim_start();
        if standalone && after.starts_with(':') {
            let val = after[1..].split(';').next().unwrap_or("").trim();
            return parse_color_value(val);
        }
        from = at + 5;
    }
    None
}

fn parse_color_value(val: &str) -> Option<(u8, u8, u8)> {
    if let Some(rest) = val.strip_prefix("rgba").or_else(|| val.strip_prefix("rgb")) {
        let inner = rest.trim_start().strip_prefix('(')?;
        let inner = inner.split(')').next()?;
        let mut parts = inner.split(',');
        let mut chan = || -> Option<u8> {
            let v: f64 = parts.next()?.trim().parse().ok()?;
            Some(v.clamp(0.0, 255.0) as u8)
        };
        let r = chan()?;
        let g = chan()?;
        let b = chan()?;
        return Some((r, g, b));
    }
    if let Some(hex) = val.strip_prefix('#') {
        let h = hex.trim();
        if h.len() == 6 {
            let r = u8::from_str_radix(&h[0..2], 16).ok()?;
            let g = u8::from_str_radix(&h[2..4], 16).ok()?;
            let b = u8::from_str_radix(&h[4..6], 16).ok()?;
            return Some((r, g, b));
        }
        if h.len() == 3 {
            let d = |i: usize| u8::from_str_radix(&h[i..i + 1], 16).ok().map(|v| v * 17);
            return Some((d(0)?, d(1)?, d(2)?));
        }
    }
    None
}

/// The host renders losses in red without a minus sign.
pub fn is_loss_red((r, g, b): (u8, u8, u8)) -> bool {
    r > RED_R_MIN && g < RED_G_MAX && b < RED_B_MAX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_with_prose() {
        assert_eq!(parse_number("$1,234.50"), 1234.50);
        assert_eq!(parse_number("cost is $3.00 total"), 3.0);
        assert_eq!(parse_number("-$3.00"), -3.0);
        assert_eq!(parse_number("- 17"), -17.0);
        assert!(parse_number("no digits here").is_nan());
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration_secs("1d 5h"), 104_400.0);
        assert_eq!(parse_duration_secs("8m"), 480.0);
        assert_eq!(parse_duration_secs("12s"), 12.0);
        assert_eq!(parse_duration_secs("done in (12s) or so"), 12.0);
        assert_eq!(parse_duration_secs("5H 30M"), 19_800.0);
        assert!(parse_duration_secs("").is_nan());
        assert!(parse_duration_secs("soon").is_nan());
    }

    #[test]
    fn money_formatting() {
        assert_eq!(format_money(3.5), "$3.50");
        assert_eq!(format_money(-3.5), "-$3.50");
        assert_eq!(format_money(f64::NAN), "—");
        assert_eq!(format_money_rate(12.0, "min"), "$12.00/min");
    }

    #[test]
    fn recipe_quantities() {
        assert_eq!(parse_quantity_x("3x"), Some(3.0));
        assert_eq!(parse_quantity_x("1/2x"), Some(0.5));
        assert_eq!(parse_quantity_x("0.1x"), Some(0.1));
        assert_eq!(parse_quantity_x("1/0"), None);
        assert_eq!(parse_quantity_x("x"), None);
    }

    #[test]
    fn money_tokens_and_signs() {
        let s = " -$3.00 each";
        let tok = first_money_token(s).unwrap();
        assert_eq!(&s[tok.0..tok.1], "-$3.00");
        assert!(has_explicit_minus(s, tok));

        let s = " ($4.20)";
        let tok = first_money_token(s).unwrap();
        assert!(has_explicit_minus(s, tok));

        let s = "$5.00";
        let tok = first_money_token(s).unwrap();
        assert!(!has_explicit_minus(s, tok));
    }

    #[test]
    fn colors() {
        assert_eq!(css_color("color: rgb(200, 40, 40)"), Some((200, 40, 40)));
        assert_eq!(
            css_color("background-color: rgb(255,0,0); color: #c62828"),
            Some((0xc6, 0x28, 0x28))
        );
        assert_eq!(css_color("font-weight: 600"), None);
        assert!(is_loss_red((200, 40, 40)));
        assert!(!is_loss_red((40, 200, 40)));
    }
}
