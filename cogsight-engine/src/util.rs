//! Small shared formatting helpers.

/// Format a monetary amount with comma thousands separators. No currency
/// symbol; the presentation layer owns that.
pub fn format_amount(amount: f64) -> String {
    let whole = amount.abs() as u64;
    let sign = if amount < 0.0 { "-" } else { "" };

    if whole < 1_000 {
        return format!("{}{}", sign, whole);
    }

    let s = whole.to_string();
    let mut grouped = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}", sign, grouped.chars().rev().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_amounts_have_no_separator() {
        assert_eq!(format_amount(999.4), "999");
    }

    #[test]
    fn large_amounts_are_grouped() {
        assert_eq!(format_amount(1_234_567.0), "1,234,567");
        assert_eq!(format_amount(-45_000.9), "-45,000");
    }
}
