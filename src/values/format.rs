//! Display formatting for resolved values.

use chrono::NaiveDate;
use serde_json::Value;

use crate::model::FieldDefinition;

/// Strings that check a checkbox, compared trimmed and lowercased.
const TRUTHY: [&str; 6] = ["x", "yes", "true", "1", "✓", "check"];

/// Accepted input date layouts, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y"];

/// Output date layout.
const DISPLAY_DATE_FORMAT: &str = "%m/%d/%Y";

/// Turns a resolved value into the text drawn on the page.
pub trait DisplayFormatter {
    /// Format `value`, found at `schema_path`, for display.
    fn format(&self, value: &Value, schema_path: &str) -> String;
}

impl<F> DisplayFormatter for F
where
    F: Fn(&Value, &str) -> String,
{
    fn format(&self, value: &Value, schema_path: &str) -> String {
        self(value, schema_path)
    }
}

/// Formatting keyed off the data path.
///
/// - `*.value` paths mentioning `amount` are grouped by thousands
///   (`1,000,000`, `1,234.50`); `$` and `,` in string input are ignored.
/// - Paths mentioning `date` (any case) are shown as `MM/DD/YYYY`.
/// - Anything else is its plain string form, trimmed.
///
/// Values that do not parse as the expected kind fall back to the plain
/// string form.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

impl DefaultFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl DisplayFormatter for DefaultFormatter {
    fn format(&self, value: &Value, schema_path: &str) -> String {
        if value.is_null() {
            return String::new();
        }
        if schema_path.ends_with(".value") && schema_path.contains("amount") {
            return format_amount(value).unwrap_or_else(|| display_string(value).trim().to_string());
        }
        if schema_path.to_lowercase().contains("date") {
            let s = display_string(value);
            let s = s.trim();
            return format_date(s).unwrap_or_else(|| s.to_string());
        }
        display_string(value).trim().to_string()
    }
}

/// Plain string form: strings without quotes, `null` as empty, anything
/// else as compact JSON.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Thousands-grouped amount, whole numbers without decimals.
pub fn format_amount(value: &Value) -> Option<String> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_start_matches('$')
                .chars()
                .filter(|c| *c != ',')
                .collect();
            if cleaned.contains('.') {
                cleaned.parse::<f64>().ok()?
            } else {
                cleaned.parse::<i64>().ok()? as f64
            }
        }
        _ => return None,
    };
    if !n.is_finite() {
        return None;
    }

    let formatted = if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        format!("{:.2}", n)
    };
    Some(group_thousands(&formatted))
}

/// Insert `,` every three digits of the integer part.
fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Re-render a recognised date string as `MM/DD/YYYY`.
pub fn format_date(s: &str) -> Option<String> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(|date| date.format(DISPLAY_DATE_FORMAT).to_string())
}

/// Whether a checkbox field is drawn checked for `value`.
///
/// With `checked_when_equals` set, the value's plain string form must equal
/// the predicate after trimming both; the comparison is case-sensitive and
/// booleans compare as `True`/`False`.
/// Otherwise booleans use their value, numbers are checked when nonzero and
/// strings when they match a fixed set of affirmative words.
pub fn is_checked(field: &FieldDefinition, value: Option<&Value>) -> bool {
    let value = match value {
        Some(v) if !v.is_null() => v,
        _ => return false,
    };

    if let Some(expected) = &field.checked_when_equals {
        let actual = match value {
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            other => display_string(other),
        };
        return actual.trim() == expected.trim();
    }

    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        other => {
            let s = display_string(other).trim().to_lowercase();
            TRUTHY.contains(&s.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, FieldKind};
    use serde_json::json;

    fn checkbox() -> FieldDefinition {
        FieldDefinition::new(
            FieldKind::Checkbox,
            0,
            BBox::new(0.0, 0.0, 10.0, 10.0),
            "investor.is_accredited",
        )
    }

    #[test]
    fn test_amounts() {
        let f = DefaultFormatter::new();
        let path = "investment.amount.value";
        assert_eq!(f.format(&json!(1000000), path), "1,000,000");
        assert_eq!(f.format(&json!(1234.5), path), "1,234.50");
        assert_eq!(f.format(&json!(250.0), path), "250");
        assert_eq!(f.format(&json!("$1,000,000"), path), "1,000,000");
        assert_eq!(f.format(&json!("$2,500.75"), path), "2,500.75");
        assert_eq!(f.format(&json!(-1234567), path), "-1,234,567");
        assert_eq!(f.format(&json!(" one million "), path), "one million");
        // Not a `.value` path
        assert_eq!(f.format(&json!(1000000), "investment.amount"), "1000000");
    }

    #[test]
    fn test_dates() {
        let f = DefaultFormatter::new();
        assert_eq!(f.format(&json!("2024-03-05"), "signatures[0].signed_date"), "03/05/2024");
        assert_eq!(f.format(&json!("03-05-2024"), "Signed_Date"), "03/05/2024");
        assert_eq!(f.format(&json!("03/05/2024"), "date"), "03/05/2024");
        assert_eq!(f.format(&json!("next Tuesday"), "date"), "next Tuesday");
        assert_eq!(f.format(&json!("  "), "date"), "");
    }

    #[test]
    fn test_plain_values() {
        let f = DefaultFormatter::new();
        assert_eq!(f.format(&json!("  Acme  "), "investor.name"), "Acme");
        assert_eq!(f.format(&json!(42), "count"), "42");
        assert_eq!(f.format(&json!(true), "flag"), "true");
        assert_eq!(f.format(&Value::Null, "investor.name"), "");
    }

    #[test]
    fn test_closure_formatter() {
        let upper = |v: &Value, _: &str| display_string(v).to_uppercase();
        assert_eq!(upper.format(&json!("abc"), "x"), "ABC");
    }

    #[test]
    fn test_truthy_values() {
        let field = checkbox();
        for v in [json!(true), json!(1), json!(-2.5), json!("X"), json!(" yes "), json!("✓"), json!("Check")] {
            assert!(is_checked(&field, Some(&v)), "{} should check", v);
        }
        for v in [json!(false), json!(0), json!(0.0), json!("no"), json!(""), json!([1])] {
            assert!(!is_checked(&field, Some(&v)), "{} should not check", v);
        }
        assert!(!is_checked(&field, None));
        assert!(!is_checked(&field, Some(&Value::Null)));
    }

    #[test]
    fn test_checked_when_equals_is_exact() {
        let field = checkbox().with_checked_when_equals("Yes");
        assert!(is_checked(&field, Some(&json!(" Yes "))));
        assert!(!is_checked(&field, Some(&json!("yes"))));
        assert!(!is_checked(&field, Some(&json!(true))));

        let by_bool = checkbox().with_checked_when_equals("True");
        assert!(is_checked(&by_bool, Some(&json!(true))));
        assert!(!is_checked(&by_bool, Some(&json!(false))));
        assert!(!is_checked(&checkbox().with_checked_when_equals("true"), Some(&json!(true))));
        assert!(is_checked(&checkbox().with_checked_when_equals("False"), Some(&json!(false))));

        let by_number = checkbox().with_checked_when_equals("2");
        assert!(is_checked(&by_number, Some(&json!(2))));
        assert!(!is_checked(&by_number, Some(&json!(1))));
    }
}
