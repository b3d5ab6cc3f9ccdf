//! Fixed-locale presentation formatting: Egyptian-Arabic digits, Egyptian
//! Pound currency, Arabic month names. Only the presentation and export
//! boundaries call into this module; stored values stay unformatted.

use chrono::{Datelike, NaiveDate};

/// ISO date format used everywhere an invoice date is stored.
pub const ISO_DATE: &str = "%Y-%m-%d";

const CURRENCY_SUFFIX: &str = "ج.م.";

const MONTHS: [&str; 12] = [
    "يناير",
    "فبراير",
    "مارس",
    "أبريل",
    "مايو",
    "يونيو",
    "يوليو",
    "أغسطس",
    "سبتمبر",
    "أكتوبر",
    "نوفمبر",
    "ديسمبر",
];

/// Map ASCII digits and separators to their Arabic-Indic counterparts.
fn arabic_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '0' => '٠',
            '1' => '١',
            '2' => '٢',
            '3' => '٣',
            '4' => '٤',
            '5' => '٥',
            '6' => '٦',
            '7' => '٧',
            '8' => '٨',
            '9' => '٩',
            ',' => '٬',
            '.' => '٫',
            other => other,
        })
        .collect()
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Render an amount the way the invoice has always shown Egyptian Pounds:
/// Arabic-Indic digits, Arabic group/decimal separators, two fraction
/// digits, `ج.م.` suffix.
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let western = format!("{}{}.{}", sign, group_thousands(int_part), frac_part);
    format!("{} {}", arabic_digits(&western), CURRENCY_SUFFIX)
}

/// Long Arabic date from a stored ISO string. An empty string formats to an
/// empty string; anything unparseable is shown as typed instead of failing.
pub fn format_date(iso: &str) -> String {
    if iso.is_empty() {
        return String::new();
    }
    let Ok(date) = NaiveDate::parse_from_str(iso, ISO_DATE) else {
        return iso.to_string();
    };
    let month = MONTHS[date.month0() as usize];
    format!(
        "{} {} {}",
        arabic_digits(&date.day().to_string()),
        month,
        arabic_digits(&date.year().to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_plain_amount() {
        assert_eq!(format_currency(250.0), "٢٥٠٫٠٠ ج.م.");
    }

    #[test]
    fn formats_grouped_amount_with_fraction() {
        assert_eq!(format_currency(1234.56), "١٬٢٣٤٫٥٦ ج.م.");
        assert_eq!(format_currency(1000000.0), "١٬٠٠٠٬٠٠٠٫٠٠ ج.م.");
    }

    #[test]
    fn rounds_to_two_fraction_digits() {
        assert_eq!(format_currency(0.005), "٠٫٠١ ج.م.");
        assert_eq!(format_currency(99.999), "١٠٠٫٠٠ ج.م.");
    }

    #[test]
    fn formats_date_long_form() {
        assert_eq!(format_date("2026-08-06"), "٦ أغسطس ٢٠٢٦");
        assert_eq!(format_date("2025-01-15"), "١٥ يناير ٢٠٢٥");
    }

    #[test]
    fn empty_date_formats_to_empty() {
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn malformed_date_is_shown_as_typed() {
        assert_eq!(format_date("next tuesday"), "next tuesday");
    }
}
