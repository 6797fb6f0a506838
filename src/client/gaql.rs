//! Query construction helpers
//!
//! Values interpolated into GAQL strings are validated here first: dates are
//! typed and rendered as `YYYY-MM-DD`, account ids are reduced to digits.

use chrono::{Days, Local, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

lazy_static! {
    static ref CUSTOMER_ID: Regex = Regex::new(r"^\d{10}$").unwrap();
    static ref ISO_DATE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
}

pub const CONNECTION_QUERY: &str = "SELECT customer.id, customer.descriptive_name FROM customer";

pub const CAMPAIGNS_QUERY: &str = "SELECT campaign.id, campaign.name, campaign.status, \
campaign.advertising_channel_type FROM campaign WHERE campaign.status != 'REMOVED'";

/// Inclusive date range interpolated into reporting queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// `[end - days_back, end]`; fails when the start falls outside the calendar
    pub fn last_days(days_back: u32, end: NaiveDate) -> Result<Self, String> {
        let start = end
            .checked_sub_days(Days::new(u64::from(days_back)))
            .ok_or_else(|| format!("{} days before {} is out of range", days_back, end))?;
        Ok(Self { start, end })
    }

    /// `[today - days_back, today]` in local time
    pub fn ending_today(days_back: u32) -> Result<Self, String> {
        Self::last_days(days_back, Local::now().date_naive())
    }

    /// Parse user-supplied bounds; both must be `YYYY-MM-DD` and `start <= end`
    pub fn parse(start: &str, end: &str) -> Result<Self, String> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        if start > end {
            return Err(format!("start date {} is after end date {}", start, end));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    if !ISO_DATE.is_match(value) {
        return Err(format!("'{}' is not a YYYY-MM-DD date", value));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| format!("'{}': {}", value, e))
}

/// Account performance query over `range`
pub fn performance_query(range: &DateRange) -> String {
    format!(
        "SELECT metrics.impressions, metrics.clicks, metrics.cost_micros, \
metrics.conversions, segments.date FROM customer \
WHERE segments.date >= '{}' AND segments.date <= '{}'",
        range.start.format(DATE_FORMAT),
        range.end.format(DATE_FORMAT)
    )
}

/// Strip dashes from an account id and check it is 10 digits
///
/// # Examples
///
/// ```
/// use ads_reporter::client::gaql::normalize_customer_id;
///
/// assert_eq!(normalize_customer_id("638-529-5998").as_deref(), Ok("6385295998"));
/// assert!(normalize_customer_id("12345").is_err());
/// ```
pub fn normalize_customer_id(raw: &str) -> Result<String, String> {
    let digits: String = raw.trim().chars().filter(|c| *c != '-').collect();
    if CUSTOMER_ID.is_match(&digits) {
        Ok(digits)
    } else {
        Err(format!("'{}' is not a 10-digit account id", raw))
    }
}
