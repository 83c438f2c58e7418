use crate::{
    age::{age_in_months, AgeSpec, DAYS_PER_MONTH},
    error::Result,
    schedule::{Patient, VaccineScheduleEntry},
};
use itertools::Itertools;
use jiff::civil::Date;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub enum VaccinationStatus {
    Applied,
    RecommendedNow,
    // Months until the patient reaches the minimum age.
    Upcoming(u32),
    Overdue,
}

impl fmt::Display for VaccinationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => write!(f, "applied"),
            Self::RecommendedNow => write!(f, "recommended now"),
            Self::Upcoming(months) => write!(f, "upcoming in {months}mo"),
            Self::Overdue => write!(f, "overdue"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Classification {
    entry: VaccineScheduleEntry,
    age_spec: AgeSpec,
    status: VaccinationStatus,
}

impl Classification {
    pub fn entry(&self) -> &VaccineScheduleEntry {
        &self.entry
    }

    pub fn age_spec(&self) -> AgeSpec {
        self.age_spec
    }

    pub fn status(&self) -> VaccinationStatus {
        self.status
    }

    pub fn months_remaining(&self) -> Option<u32> {
        match self.status {
            VaccinationStatus::Upcoming(months) => Some(months),
            _ => None,
        }
    }

    /// Same 30-day month the appointment scheduler books with.
    pub fn days_until_eligible(&self) -> Option<i64> {
        self.months_remaining()
            .map(|months| i64::from(months) * DAYS_PER_MONTH)
    }
}

fn status_for(patient: &Patient, entry: &VaccineScheduleEntry, spec: AgeSpec, age: i32) -> VaccinationStatus {
    if patient.has_applied(entry.vaccine_id()) {
        VaccinationStatus::Applied
    } else if spec.contains(age) {
        VaccinationStatus::RecommendedNow
    } else if spec.is_past(age) {
        VaccinationStatus::Overdue
    } else {
        let remaining = i64::from(spec.min_months()) - i64::from(age);
        VaccinationStatus::Upcoming(u32::try_from(remaining).unwrap_or(u32::MAX))
    }
}

/// Schedule entries ordered by minimum age; entries due at the same age keep
/// their schedule order.
pub fn display_order(schedule: &[VaccineScheduleEntry]) -> Vec<(&VaccineScheduleEntry, AgeSpec)> {
    schedule
        .iter()
        .map(|entry| (entry, entry.age_spec()))
        .sorted_by_key(|(_, spec)| spec.min_months())
        .collect()
}

/// Status of every scheduled vaccine for `patient` as of `today`, in display
/// order.
///
/// Fails if the patient has no birth date or is born after `today`.
pub fn classify(patient: &Patient, schedule: &[VaccineScheduleEntry], today: Date) -> Result<Vec<Classification>> {
    let age = age_in_months(patient.checked_birth_date(today)?, today);
    Ok(display_order(schedule)
        .into_iter()
        .map(|(entry, age_spec)| Classification {
            entry: entry.clone(),
            age_spec,
            status: status_for(patient, entry, age_spec, age),
        })
        .collect())
}

/// Entries the patient is already old enough for, applied or not.
pub fn applicable<'a>(
    patient: &Patient,
    schedule: &'a [VaccineScheduleEntry],
    today: Date,
) -> Result<Vec<&'a VaccineScheduleEntry>> {
    let age = age_in_months(patient.checked_birth_date(today)?, today);
    Ok(display_order(schedule)
        .into_iter()
        .filter(|(_, spec)| i64::from(spec.min_months()) <= i64::from(age))
        .map(|(entry, _)| entry)
        .collect())
}

/// The vaccine to give next: the first one recommended now, otherwise the
/// first one coming up. Expects `classifications` in display order.
pub fn next_due(classifications: &[Classification]) -> Option<&Classification> {
    classifications
        .iter()
        .find(|c| c.status == VaccinationStatus::RecommendedNow)
        .or_else(|| {
            classifications
                .iter()
                .find(|c| matches!(c.status, VaccinationStatus::Upcoming(_)))
        })
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct CoverageSummary {
    applied: usize,
    recommended_now: usize,
    upcoming: usize,
    overdue: usize,
}

impl CoverageSummary {
    pub fn applied(&self) -> usize {
        self.applied
    }

    pub fn recommended_now(&self) -> usize {
        self.recommended_now
    }

    pub fn upcoming(&self) -> usize {
        self.upcoming
    }

    pub fn overdue(&self) -> usize {
        self.overdue
    }

    pub fn total(&self) -> usize {
        self.applied + self.recommended_now + self.upcoming + self.overdue
    }

    pub fn completion_percent(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.applied as f64 * 100.0 / total as f64,
        }
    }
}

pub fn coverage(classifications: &[Classification]) -> CoverageSummary {
    classifications
        .iter()
        .fold(CoverageSummary::default(), |mut summary, c| {
            match c.status {
                VaccinationStatus::Applied => summary.applied += 1,
                VaccinationStatus::RecommendedNow => summary.recommended_now += 1,
                VaccinationStatus::Upcoming(_) => summary.upcoming += 1,
                VaccinationStatus::Overdue => summary.overdue += 1,
            }
            summary
        })
}
