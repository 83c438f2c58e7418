use crate::{
    age::{age_in_months, DAYS_PER_MONTH},
    eligibility::display_order,
    error::{Error, Result},
    holidays::HolidayCalendar,
    schedule::{Patient, VaccineScheduleEntry},
};
use jiff::{civil::Date, Span};
use log::{debug, trace};

/// Books vaccination appointments on working days.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    calendar: HolidayCalendar,
}

impl Scheduler {
    pub fn new(calendar: HolidayCalendar) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &HolidayCalendar {
        &self.calendar
    }

    /// `day` itself if it is a working day, otherwise the first working day
    /// after it.
    pub fn adjust_to_working_day(&self, day: Date) -> Result<Date> {
        let mut candidate = day;
        while !self.calendar.is_working_day(candidate) {
            trace!("{candidate} is not a working day");
            candidate = candidate.tomorrow()?;
        }
        Ok(candidate)
    }

    /// Earliest working day on which the patient can get the next vaccine
    /// they are still too young for.
    ///
    /// Months are counted as 30 days from `today`. Returns `None` when every
    /// scheduled vaccine is already within reach of the patient's age.
    pub fn next_appointment_date(
        &self,
        patient: &Patient,
        schedule: &[VaccineScheduleEntry],
        today: Date,
    ) -> Result<Option<Date>> {
        let age = age_in_months(patient.checked_birth_date(today)?, today);
        let Some((entry, spec)) = display_order(schedule)
            .into_iter()
            .find(|(_, spec)| i64::from(spec.min_months()) > i64::from(age))
        else {
            return Ok(None);
        };

        let months_until_next = (i64::from(spec.min_months()) - i64::from(age)).max(0);
        let candidate = today.checked_add(Span::new().try_days(months_until_next * DAYS_PER_MONTH)?)?;
        let appointment = self.adjust_to_working_day(candidate)?;
        debug!(
            "next appointment for {} is {entry} in {months_until_next}mo: {candidate} -> {appointment}",
            patient.id()
        );
        Ok(Some(appointment))
    }

    /// Checks a date picked by hand for an appointment.
    pub fn validate_appointment_date(&self, requested: Date, today: Date) -> Result<()> {
        if requested < today {
            return Err(Error::AppointmentInPast { requested, today });
        }
        if !self.calendar.is_working_day(requested) {
            return Err(Error::NonWorkingDay(requested));
        }
        Ok(())
    }
}

/// [`Scheduler::next_appointment_date`] with holidays for the current and
/// next year.
pub fn next_appointment_date(
    patient: &Patient,
    schedule: &[VaccineScheduleEntry],
    today: Date,
) -> Result<Option<Date>> {
    Scheduler::new(HolidayCalendar::around(today)).next_appointment_date(patient, schedule, today)
}
