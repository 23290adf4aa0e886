//! Authentication
//!
//! JWT issuing/validation plus the axum middleware that gates protected
//! and admin routes.

pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtService};
pub use middleware::{optional_auth, require_admin, require_auth};
