pub mod playlist;
pub mod track;
pub mod user;

pub use playlist::{Playlist, PlaylistChanges};
pub use track::{Track, TrackChanges};
pub use user::{Gender, NewUser, PublicUser, User};
