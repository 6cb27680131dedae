// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer JWT, ownership checks on tracks and playlists)
pub mod extract;
pub mod protected; // JWT authentication required
pub mod public; // No authentication required
