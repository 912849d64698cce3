//! Calendar-month cycle labels. A draw is keyed by its `"YYYY-MM"` label,
//! one per calendar month.

use crate::settlement::SettlementError;

/// Parse and validate a `"YYYY-MM"` label. Returns `(year, month)`.
pub fn parse_month_year(label: &str) -> Result<(u16, u8), SettlementError> {
    let invalid = || SettlementError::InvalidMonthYear {
        label: label.to_string(),
    };

    let bytes = label.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return Err(invalid());
    }
    if !bytes[..4].iter().all(|b| b.is_ascii_digit())
        || !bytes[5..].iter().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let year: u16 = label[..4].parse().map_err(|_| invalid())?;
    let month: u8 = label[5..].parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) || year == 0 {
        return Err(invalid());
    }
    Ok((year, month))
}

pub fn validate_month_year(label: &str) -> Result<(), SettlementError> {
    parse_month_year(label).map(|_| ())
}

/// The label of the calendar month after `label`.
pub fn next_month_year(label: &str) -> Result<String, SettlementError> {
    let (year, month) = parse_month_year(label)?;
    let (year, month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    Ok(format!("{year:04}-{month:02}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_year() {
        assert_eq!(parse_month_year("2026-08").unwrap(), (2026, 8));
        assert_eq!(parse_month_year("2026-12").unwrap(), (2026, 12));

        for bad in ["2026-13", "2026-00", "2026-8", "202608", "26-08", "abcd-ef", ""] {
            assert!(
                parse_month_year(bad).is_err(),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn test_next_month_year() {
        assert_eq!(next_month_year("2026-08").unwrap(), "2026-09");
        assert_eq!(next_month_year("2026-12").unwrap(), "2027-01");
        assert_eq!(next_month_year("2026-01").unwrap(), "2026-02");
    }
}
