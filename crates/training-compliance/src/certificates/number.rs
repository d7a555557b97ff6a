use chrono::{Datelike, NaiveDate};

/// Issuer code leading every certificate number.
pub const CERTIFICATE_ISSUER: &str = "GLC";

const PREFIX_LEN: usize = 3;

/// First three ASCII letters of the training-type name, uppercased and padded with `X`.
pub fn certificate_prefix(training_type_name: &str) -> String {
    let mut prefix: String = training_type_name
        .chars()
        .filter(char::is_ascii_alphabetic)
        .take(PREFIX_LEN)
        .map(|letter| letter.to_ascii_uppercase())
        .collect();
    while prefix.len() < PREFIX_LEN {
        prefix.push('X');
    }
    prefix
}

/// `GLC/<PFX>-<seq:06>/<MM>/<YYYY>`, dated by the record's issue date.
pub fn format_certificate_number(
    training_type_name: &str,
    sequence: u32,
    issue_date: NaiveDate,
) -> String {
    format!(
        "{CERTIFICATE_ISSUER}/{}-{sequence:06}/{:02}/{}",
        certificate_prefix(training_type_name),
        issue_date.month(),
        issue_date.year()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sequence_month_and_year() {
        let issued = NaiveDate::from_ymd_opt(2025, 8, 12).expect("valid date");
        assert_eq!(
            format_certificate_number("Aviation Safety", 1, issued),
            "GLC/AVI-000001/08/2025"
        );
        assert_eq!(
            format_certificate_number("Aviation Safety", 1234567, issued),
            "GLC/AVI-1234567/08/2025"
        );
    }

    #[test]
    fn prefix_skips_non_letters_and_pads() {
        assert_eq!(certificate_prefix("K3 Umum"), "KUM");
        assert_eq!(certificate_prefix("5S"), "SXX");
        assert_eq!(certificate_prefix("Ávsec"), "VSE");
        assert_eq!(certificate_prefix(""), "XXX");
    }
}
