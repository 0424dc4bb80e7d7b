use crate::application_port::*;
use crate::domain_model::*;
use crate::logger::*;
use std::sync::Arc;

/// Outcome of authenticating one inbound request. Never an error: protected
/// endpoints decide what to do with anything other than `Member`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Authentication {
    /// No credentials were presented.
    Anonymous,
    Member(MemberId),
    /// Credentials were presented and refused.
    Rejected(TokenError),
    /// The token could not be checked right now; retryable.
    Unavailable(String),
}

/// Extract the token from an `Authorization` header value.
///
/// `None` if the scheme is not `Bearer` or the token is empty.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}

pub struct AuthenticationGate {
    auth_service: Arc<dyn AuthService>,
}

impl AuthenticationGate {
    pub fn new(auth_service: Arc<dyn AuthService>) -> Self {
        AuthenticationGate { auth_service }
    }

    pub async fn authenticate(&self, authorization: Option<&str>) -> Authentication {
        let Some(header) = authorization else {
            return Authentication::Anonymous;
        };
        let Some(token) = bearer_token(header) else {
            debug!("authorization header without bearer token");
            return Authentication::Rejected(TokenError::Malformed);
        };

        match self.auth_service.verify_token(token).await {
            Ok(member_id) => Authentication::Member(member_id),
            Err(AuthError::Token(e)) if e.is_retryable() => {
                warn!(error = %e, "token check unavailable");
                Authentication::Unavailable(e.to_string())
            }
            Err(AuthError::Token(e)) => {
                debug!(reason = %e, "token rejected");
                Authentication::Rejected(e)
            }
            Err(e) => {
                warn!(error = %e, "token check failed");
                Authentication::Unavailable(e.to_string())
            }
        }
    }
}
