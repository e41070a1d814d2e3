pub mod access_jwt;
pub mod factory;
pub mod password;

pub use access_jwt::{AccessJwt, AccessJwtError, Claims, TokenClaims};
pub use factory::build_access_jwt;
