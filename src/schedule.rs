use crate::{
    age::AgeSpec,
    error::{Error, Result},
};
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
    sync::OnceLock,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum DoseKind {
    Dose(u8),
    Booster(u8),
}

impl DoseKind {
    // 1-based ordinal within its kind, as printed on the vaccination card.
    pub fn number(&self) -> u8 {
        match self {
            Self::Dose(index) | Self::Booster(index) => index.saturating_add(1),
        }
    }
}

impl Display for DoseKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dose(_) => write!(f, "Dose#{}", self.number()),
            Self::Booster(_) => write!(f, "Booster#{}", self.number()),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum Route {
    Intramuscular,
    Subcutaneous,
    Intradermal,
    Oral,
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intramuscular => write!(f, "IM"),
            Self::Subcutaneous => write!(f, "SC"),
            Self::Intradermal => write!(f, "ID"),
            Self::Oral => write!(f, "oral"),
        }
    }
}

/// One line of a vaccination schedule.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct VaccineScheduleEntry {
    vaccine_id: String,
    description: String,
    recommended_age: String,
    #[serde(default)]
    dose: Option<DoseKind>,
    #[serde(default)]
    route: Option<Route>,
}

impl VaccineScheduleEntry {
    pub fn new(vaccine_id: &str, description: &str, recommended_age: &str) -> Self {
        Self {
            vaccine_id: vaccine_id.to_owned(),
            description: description.to_owned(),
            recommended_age: recommended_age.to_owned(),
            dose: None,
            route: None,
        }
    }

    pub fn with_dose(mut self, dose: DoseKind) -> Self {
        self.dose = Some(dose);
        self
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }

    pub fn vaccine_id(&self) -> &str {
        &self.vaccine_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn recommended_age(&self) -> &str {
        &self.recommended_age
    }

    pub fn dose(&self) -> Option<DoseKind> {
        self.dose
    }

    pub fn dose_number(&self) -> Option<u8> {
        self.dose.map(|dose| dose.number())
    }

    pub fn route(&self) -> Option<Route> {
        self.route
    }

    pub fn age_spec(&self) -> AgeSpec {
        AgeSpec::parse(&self.recommended_age)
    }
}

impl Display for VaccineScheduleEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.dose {
            Some(dose) => write!(f, "{} {}", self.description, dose),
            None => write!(f, "{}", self.description),
        }
    }
}

/// The Dominican Republic childhood immunization program (PAI).
///
/// Hosts normally supply their own schedule through a `SchedulePort`; this
/// table seeds a fresh registry.
pub fn national_schedule() -> &'static [VaccineScheduleEntry] {
    use DoseKind::{Booster, Dose};
    use Route::{Intradermal, Intramuscular, Oral, Subcutaneous};

    static SCHEDULE: OnceLock<Vec<VaccineScheduleEntry>> = OnceLock::new();
    SCHEDULE.get_or_init(|| {
        [
            ("bcg", "BCG", "Al nacer", None, Intradermal),
            ("hepb-0", "Hepatitis B pediátrica", "Al nacer", None, Intramuscular),
            ("rota-1", "Rotavirus", "2 meses", Some(Dose(0)), Oral),
            ("ipv-1", "Polio inactivada (IPV)", "2 meses", Some(Dose(0)), Intramuscular),
            ("penta-1", "Pentavalente", "2 meses", Some(Dose(0)), Intramuscular),
            ("neumo-1", "Neumococo conjugada", "2 meses", Some(Dose(0)), Intramuscular),
            ("rota-2", "Rotavirus", "4 meses", Some(Dose(1)), Oral),
            ("ipv-2", "Polio inactivada (IPV)", "4 meses", Some(Dose(1)), Intramuscular),
            ("penta-2", "Pentavalente", "4 meses", Some(Dose(1)), Intramuscular),
            ("neumo-2", "Neumococo conjugada", "4 meses", Some(Dose(1)), Intramuscular),
            ("bopv-3", "Polio oral (bOPV)", "6 meses", Some(Dose(2)), Oral),
            ("penta-3", "Pentavalente", "6 meses", Some(Dose(2)), Intramuscular),
            ("srp-1", "Sarampión, Rubéola y Paperas (SRP)", "12 meses", Some(Dose(0)), Subcutaneous),
            ("neumo-r1", "Neumococo conjugada", "12 meses", Some(Booster(0)), Intramuscular),
            ("srp-2", "Sarampión, Rubéola y Paperas (SRP)", "18 meses", Some(Dose(1)), Subcutaneous),
            ("dpt-r1", "DPT", "18 meses", Some(Booster(0)), Intramuscular),
            ("bopv-r1", "Polio oral (bOPV)", "18 meses", Some(Booster(0)), Oral),
            ("dpt-r2", "DPT", "4 años", Some(Booster(1)), Intramuscular),
            ("bopv-r2", "Polio oral (bOPV)", "4 años", Some(Booster(1)), Oral),
            ("vph", "Virus del Papiloma Humano (VPH)", "9-14 años", None, Intramuscular),
        ]
        .into_iter()
        .map(|(id, description, age, dose, route)| {
            let entry = VaccineScheduleEntry::new(id, description, age).with_route(route);
            match dose {
                Some(dose) => entry.with_dose(dose),
                None => entry,
            }
        })
        .collect()
    })
}

/// A patient as handed over by the patient provider.
///
/// The birth date is optional here because upstream records can lack one;
/// such patients are rejected by the engine rather than aged from zero.
#[derive(Debug, Clone, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Patient {
    id: String,
    birth_date: Option<Date>,
    applied: BTreeSet<String>,
}

impl Patient {
    pub fn new(id: &str, birth_date: Option<Date>) -> Self {
        Self {
            id: id.to_owned(),
            birth_date,
            applied: BTreeSet::new(),
        }
    }

    pub fn with_applied<'a>(mut self, vaccine_ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.applied
            .extend(vaccine_ids.into_iter().map(ToOwned::to_owned));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn birth_date(&self) -> Option<Date> {
        self.birth_date
    }

    pub fn applied(&self) -> &BTreeSet<String> {
        &self.applied
    }

    pub fn has_applied(&self, vaccine_id: &str) -> bool {
        self.applied.contains(vaccine_id)
    }

    pub fn mark_applied(&mut self, vaccine_id: &str) -> bool {
        self.applied.insert(vaccine_id.to_owned())
    }

    /// The birth date, provided it exists and is not after `today`.
    pub fn checked_birth_date(&self, today: Date) -> Result<Date> {
        let birth = self.birth_date.ok_or_else(|| {
            Error::InvalidArgument(format!("patient {:?} has no birth date", self.id))
        })?;
        if birth > today {
            return Err(Error::InvalidArgument(format!(
                "patient {:?} was born on {birth}, after {today}",
                self.id
            )));
        }
        Ok(birth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use jiff::civil::date;
    use std::collections::HashSet;

    #[test]
    fn test_dose_display() {
        assert_eq!("Dose#1", DoseKind::Dose(0).to_string());
        assert_eq!("Booster#2", DoseKind::Booster(1).to_string());
        let entry = VaccineScheduleEntry::new("penta-2", "Pentavalente", "4 meses")
            .with_dose(DoseKind::Dose(1))
            .with_route(Route::Intramuscular);
        assert_eq!("Pentavalente Dose#2", entry.to_string());
        assert_eq!(Some(2), entry.dose_number());
        assert_eq!("BCG", VaccineScheduleEntry::new("bcg", "BCG", "Al nacer").to_string());
    }

    #[test]
    fn test_national_schedule() {
        let schedule = national_schedule();
        let ids = schedule
            .iter()
            .map(|entry| entry.vaccine_id())
            .collect::<HashSet<_>>();
        assert_eq!(schedule.len(), ids.len());

        // Every entry uses one of the recognized age shapes.
        for entry in schedule {
            let spec = entry.age_spec();
            if entry.recommended_age() == "Al nacer" {
                assert_eq!(0, spec.min_months(), "{entry}");
            } else {
                assert!(spec.min_months() > 0, "{entry}");
            }
        }
        let vph = schedule.iter().find(|e| e.vaccine_id() == "vph").unwrap();
        assert_eq!(Some(168), vph.age_spec().max_months());
    }

    #[test]
    fn test_checked_birth_date() -> Result<()> {
        let today = date(2024, 6, 1);
        let patient = Patient::new("p-1", Some(date(2024, 1, 15)));
        assert_eq!(date(2024, 1, 15), patient.checked_birth_date(today)?);
        assert_eq!(today, Patient::new("p-2", Some(today)).checked_birth_date(today)?);

        assert!(matches!(
            Patient::new("p-3", None).checked_birth_date(today),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Patient::new("p-4", Some(date(2024, 6, 2))).checked_birth_date(today),
            Err(Error::InvalidArgument(_))
        ));
        Ok(())
    }

    #[test]
    fn test_applied_set() {
        let mut patient = Patient::new("p-1", None).with_applied(["bcg", "hepb-0"]);
        assert!(patient.has_applied("bcg"));
        assert!(!patient.has_applied("rota-1"));
        assert!(patient.mark_applied("rota-1"));
        assert!(!patient.mark_applied("rota-1"));
        assert_eq!(3, patient.applied().len());
    }
}
