pub mod authorizer;
pub mod bearer;
pub mod claims;
pub mod error;
pub mod factory;
pub mod jwks;
pub mod key_cache;

#[cfg(test)]
pub mod testing;

pub use authorizer::Authorizer;
pub use claims::DecodedClaims;
pub use error::AuthError;
pub use factory::build_authorizer;
