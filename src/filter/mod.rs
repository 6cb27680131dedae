//! List filters for `GET /tracks` and `GET /playlists`.
//!
//! Text filters are case-insensitive substring matches, `tags` is a set match
//! (every listed tag must be present) and dates match a whole UTC day. The same
//! filter is evaluated in memory by [`TrackFilter::matches`] or pushed down to
//! Postgres by the [`sql`] helpers.

pub mod error;
pub mod sql;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{Playlist, Track};

pub use error::FilterError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackQuery {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    /// Comma separated.
    pub tags: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistQuery {
    pub title: Option<String>,
    pub description: Option<String>,
    pub track_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackFilter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub tags: Vec<String>,
    pub created_on: Option<NaiveDate>,
    pub updated_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistFilter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub track_id: Option<Uuid>,
    pub created_on: Option<NaiveDate>,
    pub updated_on: Option<NaiveDate>,
}

impl TryFrom<TrackQuery> for TrackFilter {
    type Error = FilterError;

    fn try_from(query: TrackQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            title: needle(query.title),
            description: needle(query.description),
            genre: needle(query.genre),
            tags: query
                .tags
                .map(|raw| {
                    raw.split(',')
                        .map(|t| t.trim().to_lowercase())
                        .filter(|t| !t.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            created_on: day("createdAt", query.created_at)?,
            updated_on: day("updatedAt", query.updated_at)?,
        })
    }
}

impl TryFrom<PlaylistQuery> for PlaylistFilter {
    type Error = FilterError;

    fn try_from(query: PlaylistQuery) -> Result<Self, Self::Error> {
        let track_id = match query.track_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(Uuid::parse_str(raw).map_err(|_| FilterError::InvalidTrackId(raw.to_string()))?),
        };

        Ok(Self {
            title: needle(query.title),
            description: needle(query.description),
            track_id,
            created_on: day("createdAt", query.created_at)?,
            updated_on: day("updatedAt", query.updated_at)?,
        })
    }
}

impl TrackFilter {
    pub fn matches(&self, track: &Track) -> bool {
        contains(&self.title, track.title.as_deref())
            && contains(&self.description, track.description.as_deref())
            && contains(&self.genre, track.genre.as_deref())
            && self.tags.iter().all(|tag| track.tags.contains(tag))
            && on_day(self.created_on, track.created_at)
            && on_day(self.updated_on, track.updated_at)
    }
}

impl PlaylistFilter {
    pub fn matches(&self, playlist: &Playlist) -> bool {
        contains(&self.title, playlist.title.as_deref())
            && contains(&self.description, playlist.description.as_deref())
            && self.track_id.map_or(true, |id| playlist.track_ids.contains(&id))
            && on_day(self.created_on, playlist.created_at)
            && on_day(self.updated_on, playlist.updated_at)
    }
}

/// Blank filters are dropped; the rest are lower-cased for comparison.
fn needle(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty())
}

fn day(field: &'static str, raw: Option<String>) -> Result<Option<NaiveDate>, FilterError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| FilterError::InvalidDate {
                field,
                value: value.to_string(),
            }),
    }
}

fn contains(needle: &Option<String>, haystack: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => haystack.is_some_and(|h| h.to_lowercase().contains(needle.as_str())),
    }
}

fn on_day(day: Option<NaiveDate>, at: DateTime<Utc>) -> bool {
    day.map_or(true, |d| at.date_naive() == d)
}
