//! Calendar months and the compact `YYMM` tokens used to address monthly trip files.

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::fmt::{Display, Formatter};

/// A calendar month, stored as `(year, month)`.
///
/// Note the argument order of [`Month::new`]: month first, then year.
///
/// # Examples
///
/// ```
/// use citibike::Month;
///
/// let april_2016 = Month::new(4, 2016);
/// assert_eq!(april_2016.year(), 2016);
/// assert_eq!(april_2016.month(), 4);
/// assert_eq!(april_2016.token().as_str(), "1604");
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Month(pub i32, pub u32);

impl Month {
    pub fn new(month: u32, year: i32) -> Self {
        Self(year, month)
    }
    pub fn year(self) -> i32 {
        self.0
    }
    pub fn month(self) -> u32 {
        self.1
    }

    /// Absolute month index, `12 * year + month - 1`.
    fn index(self) -> i64 {
        12 * i64::from(self.0) + i64::from(self.1) - 1
    }

    fn from_index(index: i64) -> Self {
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) + 1;
        Self(year as i32, month as u32)
    }

    pub fn token(self) -> YearMonthToken {
        YearMonthToken::from(self)
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0, self.1)
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        Self(date.year(), date.month())
    }
}

/// A four character `YYMM` token, e.g. `"1403"` for March 2014.
///
/// The year is truncated to its last two digits, so tokens are only unambiguous
/// for years 2000 through 2099. Monthly file names prepend a literal `20`.
#[derive(Debug, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct YearMonthToken(String);

impl YearMonthToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Month> for YearMonthToken {
    fn from(month: Month) -> Self {
        YearMonthToken(format!(
            "{:02}{:02}",
            month.year().rem_euclid(100),
            month.month()
        ))
    }
}

impl Display for YearMonthToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for YearMonthToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Tokens for every month from `start` (inclusive) up to `end` (exclusive).
///
/// A reversed or empty range yields an empty vector.
///
/// # Examples
///
/// ```
/// use citibike::{month_range, Month};
///
/// let tokens = month_range(Month::new(11, 2019), Month::new(2, 2020));
/// let tokens: Vec<&str> = tokens.iter().map(|t| t.as_str()).collect();
/// assert_eq!(tokens, ["1911", "1912", "2001"]);
/// ```
pub fn month_range(start: Month, end: Month) -> Vec<YearMonthToken> {
    (start.index()..end.index())
        .map(|index| Month::from_index(index).token())
        .collect()
}

/// Same as [`month_range`], taking the bounds as loose integers.
pub fn year_month_tokens(
    start_month: u32,
    start_year: i32,
    end_month: u32,
    end_year: i32,
) -> Vec<YearMonthToken> {
    month_range(
        Month::new(start_month, start_year),
        Month::new(end_month, end_year),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_strs(tokens: &[YearMonthToken]) -> Vec<&str> {
        tokens.iter().map(|t| t.as_str()).collect()
    }

    #[test]
    fn test_one_year_range() {
        let tokens = year_month_tokens(4, 2016, 4, 2017);
        assert_eq!(
            as_strs(&tokens),
            [
                "1604", "1605", "1606", "1607", "1608", "1609", "1610", "1611", "1612", "1701",
                "1702", "1703"
            ]
        );
    }

    #[test]
    fn test_empty_and_reversed_ranges() {
        assert!(year_month_tokens(1, 2021, 1, 2021).is_empty());
        assert!(year_month_tokens(6, 2021, 1, 2021).is_empty());
        assert!(year_month_tokens(1, 2022, 12, 2021).is_empty());
    }

    #[test]
    fn test_token_count_and_order() {
        let cases = [
            (1, 2014, 2, 2014),
            (12, 2015, 1, 2016),
            (4, 2016, 4, 2021),
            (7, 2013, 3, 2024),
        ];
        for (sm, sy, em, ey) in cases {
            let tokens = year_month_tokens(sm, sy, em, ey);
            let expected = 12 * (ey - sy) + (em as i32 - sm as i32);
            assert_eq!(tokens.len() as i32, expected, "range {sm}/{sy}..{em}/{ey}");
            for token in &tokens {
                assert_eq!(token.as_str().len(), 4);
                assert!(token.as_str().chars().all(|c| c.is_ascii_digit()));
            }
            // Within 2000-2099 tokens sort the same way as months.
            assert!(tokens.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_year_boundary_and_padding() {
        let tokens = month_range(Month::new(12, 2009), Month::new(2, 2010));
        assert_eq!(as_strs(&tokens), ["0912", "1001"]);
    }

    #[test]
    fn test_century_truncation_collides() {
        assert_eq!(Month::new(5, 1999).token(), Month::new(5, 2099).token());
        assert_eq!(Month::new(5, 1999).token().as_str(), "9905");
    }

    #[test]
    fn test_month_from_date() {
        let date = NaiveDate::from_ymd_opt(2021, 7, 21).unwrap();
        assert_eq!(Month::from(date), Month::new(7, 2021));
        assert_eq!(Month::from(date).to_string(), "2021-07");
    }
}
