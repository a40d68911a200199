pub mod auth;

pub use auth::{authorize, require_auth, require_listing_role, CurrentUser};
