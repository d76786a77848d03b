//! Number formatting for text reports

fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// `$1,234.56`
pub fn format_currency(value: f64) -> String {
    let cents_total = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 { "-" } else { "" };
    format!(
        "{sign}${}.{:02}",
        group_thousands(cents_total / 100),
        cents_total % 100
    )
}

/// Signed currency change, `+$1,234` or `-$1,234`
pub fn format_currency_delta(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "+" };
    format!("{sign}${}", group_thousands(value.abs().round() as u64))
}

/// `$2.1M`, `$450K`, `$50`
pub fn format_compact_currency(value: f64) -> String {
    let abs_value = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };

    if abs_value >= 1_000_000.0 {
        format!("{sign}${:.1}M", abs_value / 1_000_000.0)
    } else if abs_value >= 1_000.0 {
        format!("{sign}${:.0}K", abs_value / 1_000.0)
    } else {
        format!("{sign}${abs_value:.0}")
    }
}

/// Whole units with separators; `∞` for an unbounded count
pub fn format_units(value: f64) -> String {
    if value.is_infinite() {
        return "∞".to_string();
    }
    group_thousands(value.max(0.0).round() as u64)
}

/// Fraction as a percentage, `0.0433` -> `4.33%`
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}
