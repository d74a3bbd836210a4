use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Day/month order for the two-part numeric date pattern (`5/3/2024`).
/// The upstream sheets are Khmer and write day first; month-first is
/// accepted as an explicit configuration, never guessed per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateOrder {
    #[default]
    DayFirst,
    MonthFirst,
}

/// Tolerant numeric coercion. The sheets mix raw numbers with display text
/// like "1,200 ៛"; everything that is not a digit, `.` or `-` is stripped
/// before parsing. Anything unparseable coerces to 0.
pub fn to_number(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(n) => {
            let n = n.as_f64().unwrap_or(0.0);
            if n.is_finite() {
                n
            } else {
                0.0
            }
        }
        serde_json::Value::String(s) => to_number_str(s),
        _ => 0.0,
    }
}

pub fn to_number_str(s: &str) -> f64 {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Best-effort payment-date parsing. Tried in order:
/// strict `YYYY-MM-DD`, then `D/M/YYYY` / `D-M-YYYY` (order per config),
/// then a small set of fallback shapes the sheets have been seen to hold.
/// Unparseable input is `None`; date-bounded filters exclude such records.
pub fn parse_date(value: &str, order: DateOrder) -> Option<NaiveDate> {
    let t = value.trim();
    if t.is_empty() {
        return None;
    }

    if let Ok(d) = NaiveDate::parse_from_str(t, "%Y-%m-%d") {
        return Some(d);
    }

    let two_part: [&str; 2] = match order {
        DateOrder::DayFirst => ["%d/%m/%Y", "%d-%m-%Y"],
        DateOrder::MonthFirst => ["%m/%d/%Y", "%m-%d-%Y"],
    };
    for fmt in two_part {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return Some(d);
        }
    }

    for fmt in ["%Y/%m/%d", "%d %B %Y", "%d %b %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(t) {
        return Some(dt.date_naive());
    }

    None
}

/// Whole-riel display formatting: en-US style thousands grouping plus the
/// riel sign, matching what the sheets themselves show.
pub fn format_khr(n: f64) -> String {
    let x = if n.is_finite() { n.round() as i64 } else { 0 };
    format!("{} ៛", group_thousands(x))
}

fn group_thousands(x: i64) -> String {
    let digits = x.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if x < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
