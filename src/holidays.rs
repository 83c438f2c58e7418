//! Dominican Republic non-working days.
//!
//! Appointments are never booked on a weekend or on one of the national
//! holidays: eight fixed dates plus Good Friday, which moves with Easter.

use jiff::civil::{date, Date, Weekday};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    ops::RangeInclusive,
};

const FIXED_HOLIDAYS: [(i8, i8, &str); 8] = [
    (1, 1, "Año Nuevo"),
    (1, 6, "Día de los Santos Reyes"),
    (1, 21, "Día de la Altagracia"),
    (2, 27, "Día de la Independencia"),
    (5, 1, "Día del Trabajo"),
    (8, 16, "Día de la Restauración"),
    (9, 24, "Día de las Mercedes"),
    (12, 25, "Navidad"),
];

const GOOD_FRIDAY: &str = "Viernes Santo";

// Largest year a civil date can carry.
const MAX_YEAR: i16 = 9999;

/// Easter Sunday of the Gregorian `year` (Meeus/Jones/Butcher).
///
/// Total over every year jiff can represent. Floor division and modulo are
/// euclidean so the arithmetic stays correct for negative years too.
pub fn easter_sunday(year: i16) -> Date {
    let y = i32::from(year);
    let g = y.rem_euclid(19);
    let c = y.div_euclid(100);
    let h = (c - c.div_euclid(4) - (8 * c + 13).div_euclid(25) + 19 * g + 15).rem_euclid(30);
    let i = h - (h / 28) * (1 - (29 / (h + 1)) * ((21 - g) / 11));
    let j = (y + y.div_euclid(4) + i + 2 - c + c.div_euclid(4)).rem_euclid(7);
    let l = i - j;
    let month = 3 + (l + 40).div_euclid(44);
    let day = l + 28 - 31 * (month / 4);
    // month is 3 or 4; day lands in 22..=31 for March and 1..=25 for April.
    date(year, month as i8, day as i8)
}

/// Good Friday, two days before Easter Sunday.
pub fn good_friday(year: i16) -> Date {
    let easter = easter_sunday(year);
    if easter.day() > 2 {
        date(year, easter.month(), easter.day() - 2)
    } else {
        // Easter on April 1st or 2nd pushes Good Friday back into March.
        date(year, 3, 29 + easter.day())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Holiday {
    date: Date,
    name: &'static str,
}

impl Holiday {
    pub fn date(&self) -> Date {
        self.date
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for Holiday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.date.strftime("%d %b %Y"))
    }
}

/// All national holidays of `year` with their names, in date order.
pub fn named_holidays(year: i16) -> Vec<Holiday> {
    let mut out = FIXED_HOLIDAYS
        .iter()
        .map(|&(month, day, name)| Holiday {
            date: date(year, month, day),
            name,
        })
        .collect::<Vec<_>>();
    out.push(Holiday {
        date: good_friday(year),
        name: GOOD_FRIDAY,
    });
    out.sort_by_key(|holiday| holiday.date);
    out
}

pub fn holidays_for_year(year: i16) -> BTreeSet<Date> {
    named_holidays(year)
        .into_iter()
        .map(|holiday| holiday.date)
        .collect()
}

pub fn is_weekend(day: Date) -> bool {
    matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday)
}

pub fn is_holiday(day: Date) -> bool {
    FIXED_HOLIDAYS
        .iter()
        .any(|&(month, d, _)| day.month() == month && day.day() == d)
        || day == good_friday(day.year())
}

/// Holiday lookups with the per-year sets computed up front.
///
/// Years outside the precomputed range are still answered, just without
/// the cache. The value is immutable once built, so one calendar can be
/// shared across threads.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    years: BTreeMap<i16, BTreeSet<Date>>,
}

impl HolidayCalendar {
    pub fn for_years(years: RangeInclusive<i16>) -> Self {
        Self {
            years: years.map(|year| (year, holidays_for_year(year))).collect(),
        }
    }

    /// Calendar covering the year of `today` and the next one, which is
    /// enough for any appointment booked from `today`.
    pub fn around(today: Date) -> Self {
        let year = today.year();
        Self::for_years(year..=(year + 1).min(MAX_YEAR))
    }

    pub fn cached_years(&self) -> impl Iterator<Item = i16> + '_ {
        self.years.keys().copied()
    }

    pub fn holidays(&self, year: i16) -> BTreeSet<Date> {
        self.years
            .get(&year)
            .cloned()
            .unwrap_or_else(|| holidays_for_year(year))
    }

    pub fn is_holiday(&self, day: Date) -> bool {
        match self.years.get(&day.year()) {
            Some(holidays) => holidays.contains(&day),
            None => is_holiday(day),
        }
    }

    pub fn is_working_day(&self, day: Date) -> bool {
        !is_weekend(day) && !self.is_holiday(day)
    }
}
