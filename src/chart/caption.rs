use crate::foundation::core::Timestamp;

/// How precisely the timestamp caption is printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DateGranularity {
    /// `2021`
    Year,
    /// `2021-04` (also used for quarters)
    Month,
    /// `2021-04-17`
    #[default]
    Day,
}

impl DateGranularity {
    /// Pick a granularity from the date column's display name.
    ///
    /// Hosts name grouped date columns like `"Year of Order Date"` or `"Quarter of Ship Date"`.
    pub fn from_column_name(name: Option<&str>) -> Self {
        let Some(name) = name else {
            return Self::Day;
        };
        if name.contains("Year") {
            Self::Year
        } else if name.contains("Month") || name.contains("Quarter") {
            Self::Month
        } else {
            Self::Day
        }
    }

    /// chrono format pattern.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Year => "%Y",
            Self::Month => "%Y-%m",
            Self::Day => "%Y-%m-%d",
        }
    }

    /// Format `ts` in UTC. Timestamps outside chrono's range print as raw milliseconds.
    pub fn format(self, ts: Timestamp) -> String {
        ts.to_datetime()
            .map(|dt| dt.format(self.pattern()).to_string())
            .unwrap_or_else(|| ts.as_millis().to_string())
    }
}

/// Round to an integer and group thousands with commas (`1234.6` -> `"1,235"`).
pub fn format_thousands(v: f64) -> String {
    let r = if v.is_finite() { v.round() } else { 0.0 };
    let digits = format!("{:.0}", r.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if r < 0.0 {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granularity_follows_column_name() {
        assert_eq!(
            DateGranularity::from_column_name(Some("Year of Date")),
            DateGranularity::Year
        );
        assert_eq!(
            DateGranularity::from_column_name(Some("Month of Date")),
            DateGranularity::Month
        );
        assert_eq!(
            DateGranularity::from_column_name(Some("Quarter of Date")),
            DateGranularity::Month
        );
        assert_eq!(
            DateGranularity::from_column_name(Some("Order Date")),
            DateGranularity::Day
        );
        assert_eq!(DateGranularity::from_column_name(None), DateGranularity::Day);
    }

    #[test]
    fn formats_utc_dates() {
        // 2020-03-01T00:00:00Z
        let ts = Timestamp(1_583_020_800_000);
        assert_eq!(DateGranularity::Year.format(ts), "2020");
        assert_eq!(DateGranularity::Month.format(ts), "2020-03");
        assert_eq!(DateGranularity::Day.format(ts), "2020-03-01");
        assert_eq!(DateGranularity::Day.format(Timestamp(i64::MAX)), i64::MAX.to_string());
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1234.6), "1,235");
        assert_eq!(format_thousands(1_000_000.0), "1,000,000");
        assert_eq!(format_thousands(-45_678.0), "-45,678");
        assert_eq!(format_thousands(-0.2), "0");
        assert_eq!(format_thousands(f64::NAN), "0");
    }
}
