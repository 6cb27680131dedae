// handlers/public/mod.rs - Public handlers (no authentication)
//
// Account creation, token acquisition and service probes.

pub mod status;
pub mod users;

pub use status::{health, root};
pub use users::{login, register};
