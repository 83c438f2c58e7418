//! The collaborators the engine reads from, and a RON-backed registry that
//! serves as both.

use crate::{
    appointment::Scheduler,
    eligibility::{classify, coverage, next_due, Classification, CoverageSummary},
    error::Result,
    schedule::{national_schedule, Patient, VaccineScheduleEntry},
};
use anyhow::{anyhow, Context};
use jiff::civil::Date;
use log::{debug, warn};
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

pub trait SchedulePort {
    fn schedule(&self) -> anyhow::Result<Vec<VaccineScheduleEntry>>;
}

pub trait PatientPort {
    fn patient(&self, id: &str) -> anyhow::Result<Option<Patient>>;
    fn patients(&self) -> anyhow::Result<Vec<Patient>>;
}

// Schedule and patients kept together in one document.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Registry {
    schedule: Vec<VaccineScheduleEntry>,
    patients: Vec<Patient>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            schedule: national_schedule().to_vec(),
            patients: vec![],
        }
    }
}

impl Registry {
    pub fn new(schedule: Vec<VaccineScheduleEntry>) -> Self {
        Self {
            schedule,
            patients: vec![],
        }
    }

    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, PrettyConfig::default())?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let registry = Self::from_ron(&fs::read_to_string(path)?)?;
        debug!(
            "loaded {} schedule entries and {} patients from {}",
            registry.schedule.len(),
            registry.patients.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    pub fn schedule_entries(&self) -> &[VaccineScheduleEntry] {
        &self.schedule
    }

    pub fn patient_list(&self) -> &[Patient] {
        &self.patients
    }

    /// Inserts `patient`, replacing and returning any patient with the same id.
    pub fn add_patient(&mut self, patient: Patient) -> Option<Patient> {
        match self.patients.iter_mut().find(|p| p.id() == patient.id()) {
            Some(existing) => Some(std::mem::replace(existing, patient)),
            None => {
                self.patients.push(patient);
                None
            }
        }
    }

    pub fn patient_mut(&mut self, id: &str) -> Option<&mut Patient> {
        self.patients.iter_mut().find(|p| p.id() == id)
    }
}

impl SchedulePort for Registry {
    fn schedule(&self) -> anyhow::Result<Vec<VaccineScheduleEntry>> {
        Ok(self.schedule.clone())
    }
}

impl PatientPort for Registry {
    fn patient(&self, id: &str) -> anyhow::Result<Option<Patient>> {
        Ok(self.patients.iter().find(|p| p.id() == id).cloned())
    }

    fn patients(&self) -> anyhow::Result<Vec<Patient>> {
        Ok(self.patients.clone())
    }
}

/// Everything a dashboard shows for one patient on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientReport {
    patient_id: String,
    today: Date,
    classifications: Vec<Classification>,
    coverage: CoverageSummary,
    next_appointment: Option<Date>,
}

impl PatientReport {
    pub fn for_patient(
        patient: &Patient,
        schedule: &[VaccineScheduleEntry],
        scheduler: &Scheduler,
        today: Date,
    ) -> Result<Self> {
        let classifications = classify(patient, schedule, today)?;
        Ok(Self {
            patient_id: patient.id().to_owned(),
            today,
            coverage: coverage(&classifications),
            next_appointment: scheduler.next_appointment_date(patient, schedule, today)?,
            classifications,
        })
    }

    pub fn build(
        schedules: &impl SchedulePort,
        patients: &impl PatientPort,
        scheduler: &Scheduler,
        patient_id: &str,
        today: Date,
    ) -> anyhow::Result<Self> {
        let schedule = schedules.schedule().context("loading vaccination schedule")?;
        let patient = patients
            .patient(patient_id)
            .with_context(|| format!("loading patient {patient_id}"))?
            .ok_or_else(|| anyhow!("unknown patient {patient_id}"))?;
        Self::for_patient(&patient, &schedule, scheduler, today)
            .with_context(|| format!("evaluating patient {patient_id}"))
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn today(&self) -> Date {
        self.today
    }

    pub fn classifications(&self) -> &[Classification] {
        &self.classifications
    }

    pub fn coverage(&self) -> CoverageSummary {
        self.coverage
    }

    pub fn next_due(&self) -> Option<&Classification> {
        next_due(&self.classifications)
    }

    pub fn next_appointment(&self) -> Option<Date> {
        self.next_appointment
    }
}

/// Reports for every patient the provider knows about. Patients whose birth
/// date is missing or in the future are skipped with a warning.
pub fn reports_for_all(
    schedules: &impl SchedulePort,
    patients: &impl PatientPort,
    scheduler: &Scheduler,
    today: Date,
) -> anyhow::Result<Vec<PatientReport>> {
    let schedule = schedules.schedule().context("loading vaccination schedule")?;
    let mut reports = Vec::new();
    for patient in patients.patients().context("loading patients")? {
        if let Err(e) = patient.checked_birth_date(today) {
            warn!("skipping patient {}: {e}", patient.id());
            continue;
        }
        reports.push(
            PatientReport::for_patient(&patient, &schedule, scheduler, today)
                .with_context(|| format!("evaluating patient {}", patient.id()))?,
        );
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        eligibility::VaccinationStatus,
        holidays::HolidayCalendar,
        schedule::{DoseKind, Route},
    };
    use anyhow::Result;
    use jiff::civil::date;

    const REGISTRY: &str = r#"(
        schedule: [
            (vaccine_id: "BCG", description: "BCG", recommended_age: "Al nacer", route: Some(Intradermal)),
            (vaccine_id: "Hepatitis B", description: "Hepatitis B", recommended_age: "2 meses", dose: Some(Dose(0))),
        ],
        patients: [
            (id: "ana", birth_date: Some("2024-01-15")),
            (id: "luis", birth_date: Some("2023-11-02"), applied: ["BCG"]),
            (id: "sin-fecha"),
        ],
    )"#;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_parse_registry() -> Result<()> {
        let registry = Registry::from_ron(REGISTRY)?;
        assert_eq!(2, registry.schedule_entries().len());
        let hep_b = &registry.schedule_entries()[1];
        assert_eq!(Some(DoseKind::Dose(0)), hep_b.dose());
        assert_eq!(None, hep_b.route());
        assert_eq!(Some(Route::Intradermal), registry.schedule_entries()[0].route());

        let luis = registry.patient("luis")?.unwrap();
        assert_eq!(Some(date(2023, 11, 2)), luis.birth_date());
        assert!(luis.has_applied("BCG"));
        assert_eq!(None, registry.patient("sin-fecha")?.unwrap().birth_date());
        assert!(registry.patient("nadie")?.is_none());
        Ok(())
    }

    #[test]
    fn test_partial_registry_uses_national_schedule() -> Result<()> {
        let registry = Registry::from_ron("(patients: [])")?;
        assert_eq!(national_schedule(), registry.schedule_entries());
        assert_eq!(Registry::default(), registry);
        Ok(())
    }

    #[test]
    fn test_malformed_registry() {
        assert!(matches!(
            Registry::from_ron("(schedule: 12)"),
            Err(crate::error::Error::RonParse(_))
        ));
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("registry.ron");
        let mut registry = Registry::from_ron(REGISTRY)?;
        if let Some(ana) = registry.patient_mut("ana") {
            ana.mark_applied("BCG");
        }
        registry.save(&path)?;
        assert_eq!(registry, Registry::load(&path)?);
        assert!(Registry::load(dir.path().join("missing.ron")).is_err());
        Ok(())
    }

    #[test]
    fn test_add_patient_replaces_by_id() {
        let mut registry = Registry::new(vec![]);
        assert!(registry
            .add_patient(Patient::new("ana", Some(date(2024, 1, 15))))
            .is_none());
        let previous = registry.add_patient(Patient::new("ana", Some(date(2024, 1, 16))));
        assert_eq!(Some(date(2024, 1, 15)), previous.and_then(|p| p.birth_date()));
        assert_eq!(1, registry.patient_list().len());
    }

    #[test]
    fn test_report() -> Result<()> {
        init_logging();
        let registry = Registry::from_ron(REGISTRY)?;
        let scheduler = Scheduler::new(HolidayCalendar::for_years(2024..=2025));
        let report = PatientReport::build(&registry, &registry, &scheduler, "ana", date(2024, 1, 15))?;
        assert_eq!("ana", report.patient_id());
        assert_eq!(
            vec![VaccinationStatus::RecommendedNow, VaccinationStatus::Upcoming(2)],
            report
                .classifications()
                .iter()
                .map(|c| c.status())
                .collect::<Vec<_>>()
        );
        assert_eq!("BCG", report.next_due().unwrap().entry().vaccine_id());
        assert_eq!(Some(date(2024, 3, 15)), report.next_appointment());
        assert_eq!(0, report.coverage().applied());
        Ok(())
    }

    #[test]
    fn test_report_errors() -> Result<()> {
        let registry = Registry::from_ron(REGISTRY)?;
        let scheduler = Scheduler::default();
        let today = date(2024, 1, 15);
        let unknown = PatientReport::build(&registry, &registry, &scheduler, "nadie", today);
        assert!(unknown.unwrap_err().to_string().contains("unknown patient"));
        assert!(PatientReport::build(&registry, &registry, &scheduler, "sin-fecha", today).is_err());
        Ok(())
    }

    #[test]
    fn test_reports_for_all_skips_undated_patients() -> Result<()> {
        init_logging();
        let registry = Registry::from_ron(REGISTRY)?;
        let reports = reports_for_all(&registry, &registry, &Scheduler::default(), date(2024, 1, 15))?;
        assert_eq!(
            vec!["ana", "luis"],
            reports.iter().map(|r| r.patient_id()).collect::<Vec<_>>()
        );
        // luis is two months old with BCG applied: Hepatitis B is due now.
        let luis = &reports[1];
        assert_eq!(1, luis.coverage().applied());
        assert_eq!(1, luis.coverage().recommended_now());
        assert_eq!("Hepatitis B", luis.next_due().unwrap().entry().vaccine_id());
        assert_eq!(None, luis.next_appointment());
        Ok(())
    }
}
