mod helpers;
mod middleware;
mod token;

pub use helpers::{Authenticated, TokenValidationError, validate_token};
pub use middleware::{AuthError, MaybeUser, RequireAdmin, RequireUser};
pub use token::{IssuedToken, TokenGenerator, parse_token};
