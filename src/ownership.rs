//! Ownership checks for tracks and playlists.
//!
//! A caller may read, update or delete a resource only when its stored owner
//! equals the caller's identity. Lookups that find nothing become `404`,
//! mismatched owners become `403`.

use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Track,
    Playlist,
}

impl ResourceKind {
    pub fn noun(self) -> &'static str {
        match self {
            ResourceKind::Track => "track",
            ResourceKind::Playlist => "playlist",
        }
    }

    pub fn not_found_message(self) -> &'static str {
        match self {
            ResourceKind::Track => "Track not found",
            ResourceKind::Playlist => "Playlist not found",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Update,
    Delete,
}

impl Action {
    pub fn verb(self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// A document tagged with exactly one owning user.
pub trait Owned {
    const KIND: ResourceKind;

    fn owner_id(&self) -> Uuid;
}

/// Resolves a looked-up resource against the caller.
pub fn authorize<R: Owned>(found: Option<R>, caller: Uuid, action: Action) -> Result<R, ApiError> {
    let resource = found.ok_or_else(|| ApiError::not_found(R::KIND.not_found_message()))?;

    if resource.owner_id() != caller {
        tracing::warn!(
            caller = %caller,
            owner = %resource.owner_id(),
            "denied {} on {}",
            action.verb(),
            R::KIND.noun()
        );
        return Err(ApiError::forbidden(format!(
            "You do not have permission to {} this {}",
            action.verb(),
            R::KIND.noun()
        )));
    }

    Ok(resource)
}

/// Explains an owner-conditional write that matched no document.
///
/// `current` is a fresh lookup taken after the write; the resource was either
/// removed or never belonged to the caller.
pub fn rejected_write<R: Owned>(current: Option<R>, caller: Uuid, action: Action) -> ApiError {
    match authorize(current, caller, action) {
        Err(err) => err,
        Ok(_) => ApiError::not_found(R::KIND.not_found_message()),
    }
}
