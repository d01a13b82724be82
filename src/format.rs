//! Currency formatting for reports

/// Format with two decimals and Indian digit grouping: 12,34,567.89
pub fn format_inr(value: f64) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let grouped = group_indian(whole);
    let sign = if value < 0.0 && rounded != "0.00" { "-" } else { "" };
    format!("{}₹{}.{}", sign, grouped, fraction)
}

/// Last three digits, then groups of two
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// Percentage with two decimals
pub fn format_pct(value: f64) -> String {
    format!("{:.2}%", value)
}
