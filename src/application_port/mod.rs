mod auth_service;
mod token;

pub use auth_service::*;
pub use token::*;
