use crate::Value;

/// Render `value` as minified JSON text.
///
/// - No whitespace between tokens.
/// - Strings escape only `"`, `\`, `\n`, `\r`, `\t` — the minimum needed to
///   stay valid JSON.
/// - Numbers render with exactly 17 significant digits worth of precision
///   (trailing zeros trimmed), matching `printf("%.17g", n)` rather than
///   the shortest round-tripping decimal — `3.14` renders as
///   `3.1400000000000001`, its true 17-significant-digit expansion.
/// - Object key order follows insertion order; callers must not rely on it.
pub fn stringify(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(&format_number(*n)),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::Object(entries) => {
            out.push('{');
            for (i, (key, val)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_value(val, out);
            }
            out.push('}');
        }
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
}

/// Format a finite `f64` with 17 significant digits, the same rendering
/// `printf("%.17g", n)` produces: fixed-point when the decimal exponent
/// falls in `[-4, 17)`, scientific otherwise, trailing zeros trimmed from
/// the fractional part either way. NaN/Inf are not part of the value
/// domain this stringifier promises to round-trip (see the JSON
/// round-trip invariant); they render as `0` rather than producing
/// invalid JSON.
fn format_number(n: f64) -> String {
    const SIG_DIGITS: i32 = 17;

    if !n.is_finite() {
        return "0".to_string();
    }
    if n == 0.0 {
        return if n.is_sign_negative() { "-0".to_string() } else { "0".to_string() };
    }

    let sign = if n.is_sign_negative() { "-" } else { "" };
    let abs = n.abs();

    let sci = format!("{:.*e}", (SIG_DIGITS - 1) as usize, abs);
    let Some((mantissa, exp_str)) = sci.split_once('e') else {
        return format!("{sign}{abs}");
    };
    let exp: i32 = exp_str.parse().unwrap_or(0);

    if exp < -4 || exp >= SIG_DIGITS {
        let mantissa = trim_trailing_zeros(mantissa);
        let exp_sign = if exp < 0 { "-" } else { "+" };
        format!("{sign}{mantissa}e{exp_sign}{:02}", exp.abs())
    } else {
        let frac_digits = (SIG_DIGITS - 1 - exp).max(0) as usize;
        let fixed = format!("{abs:.frac_digits$}");
        format!("{sign}{}", trim_trailing_zeros(&fixed))
    }
}

/// Strip trailing zeros after a decimal point, and the point itself if
/// nothing remains after it.
fn trim_trailing_zeros(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    let trimmed = s.trim_end_matches('0');
    trimmed.trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn minifies_and_escapes() {
        let v = parse(r#"{"a": "x\ny", "b": [1, true, null]}"#).unwrap();
        let s = stringify(&v);
        assert!(!s.contains(' '));
        assert!(s.contains("x\\ny"));
    }

    #[test]
    fn whole_numbers_have_no_decimal_point() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn fractional_numbers_render_with_17_significant_digits() {
        // 3.14 has no exact binary representation; %.17g exposes the
        // double's true expansion instead of the shortest round-trip form.
        assert_eq!(format_number(3.14), "3.1400000000000001");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(100.25), "100.25");
    }

    #[test]
    fn very_small_and_very_large_numbers_use_scientific_notation() {
        assert_eq!(format_number(1.23456789012345e20), "1.23456789012345e+20");
        assert_eq!(format_number(0.0000001234), "1.2340000000000001e-07");
    }

    #[test]
    fn roundtrip_via_parse_and_stringify() {
        let v = parse(r#"{"x":1,"y":[1,2,3],"z":"hi","w":null,"t":true}"#).unwrap();
        let s = stringify(&v);
        let v2 = parse(&s).unwrap();
        assert_eq!(v, v2);
    }
}
