use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid {field} filter: expected a YYYY-MM-DD date, got '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid trackId filter: '{0}'")]
    InvalidTrackId(String),
}
