use sqlx::{Postgres, QueryBuilder};

use super::{PlaylistFilter, TrackFilter};

/// Appends ` AND ...` conditions for a track filter to a query whose WHERE
/// clause is already open.
pub fn push_track_conditions(qb: &mut QueryBuilder<'_, Postgres>, filter: &TrackFilter) {
    push_contains(qb, "title", &filter.title);
    push_contains(qb, "description", &filter.description);
    push_contains(qb, "genre", &filter.genre);

    if !filter.tags.is_empty() {
        qb.push(" AND doc->'tags' ?& ");
        qb.push_bind(filter.tags.clone());
    }

    push_dates(qb, filter.created_on, filter.updated_on);
}

pub fn push_playlist_conditions(qb: &mut QueryBuilder<'_, Postgres>, filter: &PlaylistFilter) {
    push_contains(qb, "title", &filter.title);
    push_contains(qb, "description", &filter.description);

    if let Some(track_id) = filter.track_id {
        qb.push(" AND doc->'trackIds' ? ");
        qb.push_bind(track_id.to_string());
    }

    push_dates(qb, filter.created_on, filter.updated_on);
}

// Field names are fixed by the callers above, never user input.
fn push_contains(qb: &mut QueryBuilder<'_, Postgres>, field: &'static str, needle: &Option<String>) {
    if let Some(needle) = needle {
        qb.push(format!(" AND doc->>'{field}' ILIKE "));
        qb.push_bind(format!("%{}%", escape_like(needle)));
    }
}

fn push_dates(
    qb: &mut QueryBuilder<'_, Postgres>,
    created_on: Option<chrono::NaiveDate>,
    updated_on: Option<chrono::NaiveDate>,
) {
    if let Some(day) = created_on {
        qb.push(" AND (created_at AT TIME ZONE 'UTC')::date = ");
        qb.push_bind(day);
    }
    if let Some(day) = updated_on {
        qb.push(" AND (updated_at AT TIME ZONE 'UTC')::date = ");
        qb.push_bind(day);
    }
}

/// Escapes LIKE wildcards so the needle is matched literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
