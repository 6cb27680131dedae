//! Field rules applied to request bodies before any document is built.
//!
//! Each function checks one field and reports the first rule it breaks, so a
//! handler can run them in order and surface a single message.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;
use uuid::Uuid;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 20;
pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;
pub const GENRE_MAX: usize = 50;
pub const TAG_MAX: usize = 30;
pub const TAGS_PER_TRACK_MAX: usize = 20;
pub const MAX_AGE_YEARS: i32 = 120;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Username must be between 3 and 20 characters")]
    UsernameLength,

    #[error("Username may only contain letters, numbers and underscores")]
    UsernameCharacters,

    #[error("Please enter a valid email address")]
    Email,

    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Please enter a valid phone number")]
    PhoneNumber,

    #[error("Birth date must be in the past")]
    BirthDateInFuture,

    #[error("Birth date must be within the last 120 years")]
    BirthDateTooOld,

    #[error("Gender must be one of: male, female, other, prefer_not_to_say")]
    Gender,

    #[error("{0} must not be empty")]
    Blank(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("A track can have at most 20 tags")]
    TooManyTags,

    #[error("Track {0} appears more than once in the playlist")]
    DuplicateTrack(Uuid),

    #[error("Track {0} does not exist")]
    UnknownTrack(Uuid),
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(ValidationError::UsernameLength);
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::UsernameCharacters);
    }
    Ok(())
}

/// Emails are compared and stored trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::Email);
    }

    let (local, domain) = email.split_once('@').ok_or(ValidationError::Email)?;
    if local.is_empty() || domain.contains('@') {
        return Err(ValidationError::Email);
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(ValidationError::Email);
    }
    match labels.last() {
        Some(tld) if tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()) => Ok(()),
        _ => Err(ValidationError::Email),
    }
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    Ok(())
}

/// Optional leading `+`, then 7 to 15 digits; spaces and dashes are ignored.
pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    let phone = phone.trim();
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let mut count = 0;
    for c in digits.chars() {
        match c {
            '0'..='9' => count += 1,
            ' ' | '-' => {}
            _ => return Err(ValidationError::PhoneNumber),
        }
    }
    if !(7..=15).contains(&count) {
        return Err(ValidationError::PhoneNumber);
    }
    Ok(())
}

pub fn validate_birth_date(birth_date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if birth_date >= today {
        return Err(ValidationError::BirthDateInFuture);
    }

    let oldest = today
        .with_year(today.year() - MAX_AGE_YEARS)
        // Feb 29 with no counterpart 120 years back
        .or_else(|| today.pred_opt().and_then(|d| d.with_year(d.year() - MAX_AGE_YEARS)))
        .ok_or(ValidationError::BirthDateTooOld)?;
    if birth_date < oldest {
        return Err(ValidationError::BirthDateTooOld);
    }
    Ok(())
}

/// Trims a free-text field and enforces that it is non-empty and bounded.
pub fn bounded_text(field: &'static str, value: String, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank(field));
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_string())
}

/// Normalizes tags into a sorted set of trimmed lower-case values.
pub fn tag_set(tags: Vec<String>) -> Result<Vec<String>, ValidationError> {
    let mut set = BTreeSet::new();
    for tag in tags {
        set.insert(bounded_text("Tag", tag, TAG_MAX)?.to_lowercase());
    }
    if set.len() > TAGS_PER_TRACK_MAX {
        return Err(ValidationError::TooManyTags);
    }
    Ok(set.into_iter().collect())
}

pub fn distinct_track_ids(track_ids: &[Uuid]) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    for id in track_ids {
        if !seen.insert(*id) {
            return Err(ValidationError::DuplicateTrack(*id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn usernames() {
        assert!(validate_username("dj_shadow").is_ok());
        assert!(validate_username("abc").is_ok());
        assert_eq!(validate_username("ab"), Err(ValidationError::UsernameLength));
        assert_eq!(
            validate_username("a_really_long_username_1"),
            Err(ValidationError::UsernameLength)
        );
        assert_eq!(validate_username("dj shadow"), Err(ValidationError::UsernameCharacters));
        assert_eq!(validate_username("dj-shadow"), Err(ValidationError::UsernameCharacters));
    }

    #[test]
    fn emails() {
        assert!(validate_email("someone@example.com").is_ok());
        assert!(validate_email("first.last@mail.example.org").is_ok());
        assert!(validate_email("someone@example").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("someone@@example.com").is_err());
        assert!(validate_email("some one@example.com").is_err());
        assert!(validate_email("someone@example..com").is_err());
        assert_eq!(normalize_email("  Someone@Example.COM "), "someone@example.com");
    }

    #[test]
    fn phone_numbers() {
        assert!(validate_phone_number("+44 20 7946 0958").is_ok());
        assert!(validate_phone_number("555-0100-22").is_ok());
        assert!(validate_phone_number("12345").is_err());
        assert!(validate_phone_number("call me").is_err());
    }

    #[test]
    fn birth_dates() {
        let today = date(2024, 6, 1);
        assert!(validate_birth_date(date(1990, 1, 1), today).is_ok());
        assert_eq!(validate_birth_date(today, today), Err(ValidationError::BirthDateInFuture));
        assert_eq!(
            validate_birth_date(date(2030, 1, 1), today),
            Err(ValidationError::BirthDateInFuture)
        );
        assert!(validate_birth_date(date(1904, 6, 1), today).is_ok());
        assert_eq!(
            validate_birth_date(date(1904, 5, 31), today),
            Err(ValidationError::BirthDateTooOld)
        );
        // leap day with no matching day 120 years earlier
        assert!(validate_birth_date(date(1990, 1, 1), date(2024, 2, 29)).is_ok());
    }

    #[test]
    fn text_fields_are_trimmed_and_bounded() {
        assert_eq!(bounded_text("Title", "  My Track ".to_string(), 100).unwrap(), "My Track");
        assert_eq!(bounded_text("Title", "   ".to_string(), 100), Err(ValidationError::Blank("Title")));
        assert_eq!(
            bounded_text("Genre", "x".repeat(51), GENRE_MAX),
            Err(ValidationError::TooLong { field: "Genre", max: 50 })
        );
        assert_eq!(
            ValidationError::TooLong { field: "Genre", max: 50 }.to_string(),
            "Genre must be at most 50 characters"
        );
    }

    #[test]
    fn tags_become_a_set() {
        let tags = tag_set(vec!["Chill".into(), "lofi".into(), " chill ".into()]).unwrap();
        assert_eq!(tags, vec!["chill".to_string(), "lofi".to_string()]);
        assert!(tag_set((0..21).map(|i| format!("tag{i}")).collect()).is_err());
        assert!(tag_set(vec!["".into()]).is_err());
    }

    #[test]
    fn playlists_reject_repeated_tracks() {
        let id = Uuid::new_v4();
        assert!(distinct_track_ids(&[id, Uuid::new_v4()]).is_ok());
        assert_eq!(distinct_track_ids(&[id, id]), Err(ValidationError::DuplicateTrack(id)));
    }
}
