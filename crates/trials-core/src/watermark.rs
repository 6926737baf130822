//! Since-date computation for incremental syncs.
//!
//! The reference time zone is UTC. An incremental sync started at any moment
//! of UTC day `D` asks for every trial whose `last_updated` is on or after
//! `D - 1`. The bound is inclusive, so a trial updated on `D - 1` is fetched
//! by the syncs of both `D - 1` and `D`; reconciliation is idempotent, so the
//! overlap costs requests and nothing else.

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::{Error, Result};

/// Wire and storage format of the watermark.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// "Yesterday" relative to `now`, on the UTC calendar.
pub fn since_for(now: DateTime<Utc>) -> NaiveDate {
  let today = now.date_naive();
  today.checked_sub_days(Days::new(1)).unwrap_or(today)
}

pub fn format_date(date: NaiveDate) -> String { date.format(DATE_FORMAT).to_string() }

/// Parse an operator- or client-supplied `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
    .map_err(|_| Error::InvalidDate(s.to_owned()))
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn since_is_previous_utc_day() {
    let now = Utc.with_ymd_and_hms(2026, 2, 21, 0, 0, 1).unwrap();
    assert_eq!(since_for(now), NaiveDate::from_ymd_opt(2026, 2, 20).unwrap());

    let late = Utc.with_ymd_and_hms(2026, 2, 21, 23, 59, 59).unwrap();
    assert_eq!(since_for(late), NaiveDate::from_ymd_opt(2026, 2, 20).unwrap());
  }

  #[test]
  fn since_crosses_month_and_year_boundaries() {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 6, 0, 0).unwrap();
    assert_eq!(since_for(now), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());

    let leap = Utc.with_ymd_and_hms(2028, 3, 1, 6, 0, 0).unwrap();
    assert_eq!(since_for(leap), NaiveDate::from_ymd_opt(2028, 2, 29).unwrap());
  }

  #[test]
  fn parse_and_format_agree() {
    let d = parse_date("2026-02-20").unwrap();
    assert_eq!(format_date(d), "2026-02-20");
    assert_eq!(parse_date(" 2026-02-20 ").unwrap(), d);
  }

  #[test]
  fn parse_rejects_other_shapes() {
    assert!(matches!(parse_date("20/02/2026"), Err(Error::InvalidDate(_))));
    assert!(matches!(parse_date("2026-02"), Err(Error::InvalidDate(_))));
    assert!(matches!(parse_date(""), Err(Error::InvalidDate(_))));
  }
}
