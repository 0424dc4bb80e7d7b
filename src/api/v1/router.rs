use super::error::*;
use super::handler;
use crate::application_impl::*;
use crate::application_port::TokenError;
use crate::domain_model::MemberId;
use crate::logger::debug;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{http, reject, Filter};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = warp::post()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::login);

    let refresh = warp::post()
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::refresh);

    let logout = warp::post()
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(with_member(server.gate.clone()))
        .and(with(server.auth_service.clone()))
        .and_then(handler::logout);

    let logout_session = warp::post()
        .and(warp::path("logout"))
        .and(warp::path("session"))
        .and(warp::path::end())
        .and(with_member(server.gate.clone()))
        .and(warp::header::<String>(http::header::AUTHORIZATION.as_ref()))
        .and(with(server.auth_service.clone()))
        .and_then(handler::logout_session);

    let me = warp::get()
        .and(warp::path("me"))
        .and(warp::path::end())
        .and(with_member(server.gate.clone()))
        .and_then(handler::me);

    login.or(refresh).or(logout).or(logout_session).or(me)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

/// Run the authentication gate on every request; never rejects.
///
/// An `Authorization` value that is not valid header text counts as a malformed token.
fn with_authentication(
    gate: Arc<AuthenticationGate>,
) -> impl Filter<Extract = (Authentication,), Error = Infallible> + Clone {
    warp::header::headers_cloned().and_then(move |headers: http::HeaderMap| {
        let gate = gate.clone();
        async move {
            let authentication = match headers.get(http::header::AUTHORIZATION) {
                None => gate.authenticate(None).await,
                Some(value) => match value.to_str() {
                    Ok(value) => gate.authenticate(Some(value)).await,
                    Err(_) => {
                        debug!("authorization header is not valid text");
                        Authentication::Rejected(TokenError::Malformed)
                    }
                },
            };
            Ok::<_, Infallible>(authentication)
        }
    })
}

/// Protected endpoints: only an authenticated member gets through.
fn with_member(
    gate: Arc<AuthenticationGate>,
) -> impl Filter<Extract = (MemberId,), Error = warp::Rejection> + Clone {
    with_authentication(gate).and_then(|authentication: Authentication| async move {
        match authentication {
            Authentication::Member(member_id) => Ok(member_id),
            Authentication::Unavailable(_) => {
                Err(reject::custom(ApiErrorCode::ServiceUnavailable))
            }
            Authentication::Anonymous | Authentication::Rejected(_) => {
                Err(reject::custom(ApiErrorCode::Unauthenticated))
            }
        }
    })
}
