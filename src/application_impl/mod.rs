mod argon2_hasher;
mod auth_service_fake;
mod auth_service_impl;
mod authentication_gate;
mod jwt_codec;
mod refresh_coordinator;
mod token_issuer;
mod token_validator;

pub use argon2_hasher::*;
pub use auth_service_fake::*;
pub use auth_service_impl::*;
pub use authentication_gate::*;
pub use jwt_codec::*;
pub use refresh_coordinator::*;
pub use token_issuer::*;
pub use token_validator::*;
