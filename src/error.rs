use jiff::civil::Date;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("appointment date {requested} is before {today}")]
    AppointmentInPast { requested: Date, today: Date },
    #[error("appointment date {0} falls on a weekend or national holiday")]
    NonWorkingDay(Date),
    #[error("date arithmetic failed: {0}")]
    Date(#[from] jiff::Error),
    #[error("failed to parse registry: {0}")]
    RonParse(#[from] ron::error::SpannedError),
    #[error("failed to serialize registry: {0}")]
    RonWrite(#[from] ron::Error),
    #[error("failed to access registry file: {0}")]
    Io(#[from] std::io::Error),
}
