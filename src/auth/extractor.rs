//! Actix-web extractors for session authentication.
//!
//! The session token is read from the `auth_token` cookie, falling back to an
//! `Authorization: Bearer` header for API clients.

use actix_web::dev::Payload;
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use std::future::{Ready, ready};

use super::SessionSecret;
use crate::config::SESSION_COOKIE;
use crate::error::ErrorResponse;

/// Authentication error for extractors.
#[derive(Debug)]
pub struct AuthError {
    message: String,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::UNAUTHORIZED).json(ErrorResponse {
            error: "UNAUTHORIZED".to_string(),
            message: self.message.clone(),
        })
    }
}

/// Authenticated user taken from a valid session token.
///
/// Use this in handlers that mutate data:
/// ```ignore
/// async fn create(session: SessionUser) -> impl Responder {
///     // session.id is the signed-in user's id
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: i32,
    pub email: String,
    pub name: Option<String>,
}

/// Session token from cookie or bearer header.
fn extract_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        let value = cookie.value().to_string();
        if !value.is_empty() {
            return Some(value);
        }
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn authenticate(req: &HttpRequest) -> Result<SessionUser, AuthError> {
    let secret = req
        .app_data::<web::Data<SessionSecret>>()
        .ok_or_else(|| AuthError {
            message: "Internal configuration error".to_string(),
        })?;

    let token = extract_token(req).ok_or_else(|| AuthError {
        message: "Authentication required".to_string(),
    })?;

    let claims = secret.verify(&token).map_err(|message| AuthError { message })?;

    let id = claims.sub.parse::<i32>().map_err(|_| AuthError {
        message: "Invalid session subject".to_string(),
    })?;

    Ok(SessionUser {
        id,
        email: claims.email,
        name: claims.name,
    })
}

impl FromRequest for SessionUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// Optional session: guests get `MaybeSession(None)` instead of a 401.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<SessionUser>);

impl FromRequest for MaybeSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(MaybeSession(authenticate(req).ok())))
    }
}
