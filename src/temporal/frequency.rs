use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Months, NaiveDate};

use crate::error::{Error, Result};

/// Sampling frequency of a regular series
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    /// Fixed custom step such as "3D"
    Custom(Duration),
}

impl Frequency {
    /// Observations per seasonal cycle, where one is conventional
    /// (12 for monthly data, 4 for quarterly, 7 for daily).
    pub fn seasonal_period(&self) -> Option<usize> {
        match self {
            Frequency::Daily => Some(7),
            Frequency::Weekly => Some(52),
            Frequency::Monthly => Some(12),
            Frequency::Quarterly => Some(4),
            Frequency::Hourly => Some(24),
            _ => None,
        }
    }

    /// Calendar-aware step applied `steps` times to a date
    fn advance(&self, date: NaiveDate, steps: u32) -> Option<NaiveDate> {
        match self {
            Frequency::Daily => date.checked_add_signed(Duration::days(steps as i64)),
            Frequency::Weekly => date.checked_add_signed(Duration::weeks(steps as i64)),
            Frequency::Monthly => date.checked_add_months(Months::new(steps)),
            Frequency::Quarterly => date.checked_add_months(Months::new(steps.checked_mul(3)?)),
            Frequency::Yearly => date.checked_add_months(Months::new(steps.checked_mul(12)?)),
            Frequency::Custom(step) if step.num_seconds() % 86_400 == 0 && step.num_days() > 0 => {
                date.checked_add_signed(Duration::days(step.num_days().checked_mul(steps as i64)?))
            }
            _ => None,
        }
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "S" | "SEC" | "SECOND" | "SECONDS" => Ok(Frequency::Secondly),
            "T" | "MIN" | "MINUTE" | "MINUTES" => Ok(Frequency::Minutely),
            "H" | "HOUR" | "HOURS" => Ok(Frequency::Hourly),
            "D" | "DAY" | "DAYS" | "DAILY" => Ok(Frequency::Daily),
            "W" | "WEEK" | "WEEKS" | "WEEKLY" => Ok(Frequency::Weekly),
            "M" | "MONTH" | "MONTHS" | "MONTHLY" => Ok(Frequency::Monthly),
            "Q" | "QUARTER" | "QUARTERS" | "QUARTERLY" => Ok(Frequency::Quarterly),
            "Y" | "YEAR" | "YEARS" | "A" | "ANNUAL" | "YEARLY" => Ok(Frequency::Yearly),
            _ => parse_custom_frequency(s).ok_or_else(|| {
                Error::InvalidConfiguration(format!("unrecognised frequency {:?}", s))
            }),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Secondly => write!(f, "S"),
            Frequency::Minutely => write!(f, "T"),
            Frequency::Hourly => write!(f, "H"),
            Frequency::Daily => write!(f, "D"),
            Frequency::Weekly => write!(f, "W"),
            Frequency::Monthly => write!(f, "M"),
            Frequency::Quarterly => write!(f, "Q"),
            Frequency::Yearly => write!(f, "Y"),
            Frequency::Custom(duration) => write!(f, "{}s", duration.num_seconds()),
        }
    }
}

/// Parse "<count><unit>" forms such as "3D" or "2H"
fn parse_custom_frequency(s: &str) -> Option<Frequency> {
    let split = s.find(|c: char| !c.is_ascii_digit())?;
    let (digits, unit) = s.split_at(split);
    let count: i64 = digits.parse().ok()?;
    if count <= 0 {
        return None;
    }

    let step = match unit.to_uppercase().as_str() {
        "S" | "SEC" | "SECOND" | "SECONDS" => Duration::seconds(count),
        "T" | "MIN" | "MINUTE" | "MINUTES" => Duration::minutes(count),
        "H" | "HOUR" | "HOURS" => Duration::hours(count),
        "D" | "DAY" | "DAYS" => Duration::days(count),
        "W" | "WEEK" | "WEEKS" => Duration::weeks(count),
        _ => return None,
    };
    Some(Frequency::Custom(step))
}

/// `periods` consecutive dates starting at `start`, spaced by `freq`.
///
/// Only day-or-coarser frequencies make sense for dates; anything finer is an
/// `InvalidConfiguration`.
pub fn date_range(start: NaiveDate, periods: usize, freq: &Frequency) -> Result<Vec<NaiveDate>> {
    (0..periods)
        .map(|step| {
            let step = u32::try_from(step).ok();
            step.and_then(|n| freq.advance(start, n)).ok_or_else(|| {
                Error::InvalidConfiguration(format!(
                    "cannot build {} periods from {} at frequency {}",
                    periods, start, freq
                ))
            })
        })
        .collect()
}
