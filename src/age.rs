use jiff::civil::Date;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a month when turning months into calendar days.
pub const DAYS_PER_MONTH: i64 = 30;

/// Age window, in months, during which a scheduled vaccine should be given.
///
/// Parsed from the human readable `recommended_age` of a schedule entry. Only
/// the "A-B años" form carries an upper bound.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct AgeSpec {
    min_months: u32,
    max_months: Option<u32>,
}

impl AgeSpec {
    pub fn at_birth() -> Self {
        Self::default()
    }

    pub fn new(min_months: u32, max_months: Option<u32>) -> Self {
        Self {
            min_months,
            max_months,
        }
    }

    /// Accepts "<N> meses", "<N> años", "<A>-<B> años" and "Al nacer" (and
    /// their English spellings). Anything else is logged and treated as
    /// eligible from birth.
    pub fn parse(recommended_age: &str) -> Self {
        let text = recommended_age.trim().to_lowercase();
        let parsed = if text.contains("mes") || text.contains("month") {
            leading_integer(&text).map(|months| Self::new(months, None))
        } else if ["año", "anio", "year"].iter().any(|unit| text.contains(unit)) {
            Self::parse_years(&text)
        } else if text == "al nacer" || text == "at birth" {
            Some(Self::at_birth())
        } else {
            None
        };
        parsed.unwrap_or_else(|| {
            warn!("unrecognized recommended age {recommended_age:?}; treating it as due at birth");
            Self::at_birth()
        })
    }

    fn parse_years(text: &str) -> Option<Self> {
        match text.split_once('-') {
            Some((low, high)) => {
                let min_months = leading_integer(low)?.checked_mul(12)?;
                let max_months = leading_integer(high)
                    .and_then(|years| years.checked_mul(12))
                    .filter(|max| *max >= min_months);
                if max_months.is_none() {
                    warn!("ignoring upper bound of age range {text:?}");
                }
                Some(Self::new(min_months, max_months))
            }
            None => Some(Self::new(leading_integer(text)?.checked_mul(12)?, None)),
        }
    }

    pub fn min_months(&self) -> u32 {
        self.min_months
    }

    pub fn max_months(&self) -> Option<u32> {
        self.max_months
    }

    pub fn contains(&self, age_months: i32) -> bool {
        i64::from(age_months) >= i64::from(self.min_months)
            && self
                .max_months
                .is_none_or(|max| i64::from(age_months) <= i64::from(max))
    }

    pub fn is_past(&self, age_months: i32) -> bool {
        self.max_months
            .is_some_and(|max| i64::from(age_months) > i64::from(max))
    }
}

impl fmt::Display for AgeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max_months {
            Some(max) => write!(f, "{}-{}mo", self.min_months, max),
            None => write!(f, "{}mo+", self.min_months),
        }
    }
}

// Like `parseInt`: skip leading whitespace, then read decimal digits.
fn leading_integer(text: &str) -> Option<u32> {
    let digits = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>();
    digits.parse().ok()
}

/// Whole months between the two dates, ignoring the day of the month.
pub fn age_in_months(birth: Date, today: Date) -> i32 {
    (i32::from(today.year()) - i32::from(birth.year())) * 12
        + (i32::from(today.month()) - i32::from(birth.month()))
}
