#![warn(clippy::all, rust_2018_idioms)]

mod age;
mod appointment;
mod eligibility;
mod error;
mod holidays;
mod registry;
mod schedule;

pub use age::{age_in_months, AgeSpec, DAYS_PER_MONTH};
pub use appointment::{next_appointment_date, Scheduler};
pub use eligibility::{
    applicable, classify, coverage, display_order, next_due, Classification, CoverageSummary,
    VaccinationStatus,
};
pub use error::{Error, Result};
pub use holidays::{
    easter_sunday, good_friday, holidays_for_year, is_holiday, is_weekend, named_holidays,
    Holiday, HolidayCalendar,
};
pub use registry::{reports_for_all, PatientPort, PatientReport, Registry, SchedulePort};
pub use schedule::{national_schedule, DoseKind, Patient, Route, VaccineScheduleEntry};
