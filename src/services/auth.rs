//! Email/password accounts and session cookies.
//!
//! Flow:
//! 1. POST /auth/signup: create account, set `auth_token` cookie
//! 2. POST /auth/signin: verify password, set `auth_token` cookie
//! 3. GET /auth/session: current user or `{ "user": null }`
//! 4. POST /auth/signout: clear the cookie
//!
//! Signup and signin accept JSON or HTML form bodies. Form submissions are
//! answered with redirects instead of JSON.

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::http::header;
use actix_web::{Either, HttpResponse, get, post, web};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::auth::{MaybeSession, SessionSecret};
use crate::config::{Config, SESSION_COOKIE};
use crate::db::{DbPool, users};
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, SigninRequest, SignupRequest, User, UserResponse};

/// PBKDF2-HMAC-SHA256 iteration count.
pub const PBKDF2_ROUNDS: u32 = 100_000;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;
const MIN_PASSWORD_LEN: usize = 6;
const EMAIL_TAKEN: &str = "Email already registered";
const BAD_CREDENTIALS: &str = "Invalid email or password";

/// Where form submissions land after a successful sign-in.
pub const AFTER_SIGNIN_PATH: &str = "/dashboard";

fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut key);
    key
}

/// Hash a password as `<saltHex>:<keyHex>` with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt: [u8; SALT_LEN] = rand::random();
    let key = derive_key(password, &salt);
    format!("{}:{}", hex::encode(salt), hex::encode(key))
}

/// Check a password against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, key_hex)) = stored.split_once(':') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(key_hex)) else {
        return false;
    };
    if salt.is_empty() || expected.len() != KEY_LEN {
        return false;
    }

    let actual = derive_key(password, &salt);
    actual.as_slice().ct_eq(expected.as_slice()).into()
}

/// Lower-cased, trimmed email.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate signup credentials, returning the normalized email.
pub fn validate_credentials(email: &str, password: &str) -> AppResult<String> {
    let email = normalize_email(email);
    if !email.contains('@') {
        return Err(AppError::InvalidInput("A valid email is required".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(email)
}

/// Create an account. Shared by the signup route and the operator CLI.
pub async fn register(
    pool: &DbPool,
    email: &str,
    password: &str,
    name: Option<&str>,
) -> AppResult<User> {
    let email = validate_credentials(email, password)?;
    let db = pool.connection();

    if users::find_by_email(db, &email).await?.is_some() {
        return Err(AppError::InvalidInput(EMAIL_TAKEN.to_string()));
    }

    let name = name.map(str::trim).filter(|n| !n.is_empty());
    let user = users::create(db, &email, &hash_password(password), name).await?;
    info!(user_id = user.id, "User registered");
    Ok(user)
}

/// Check credentials. Unknown email and wrong password are indistinguishable.
pub async fn authenticate(pool: &DbPool, email: &str, password: &str) -> AppResult<User> {
    let email = normalize_email(email);
    let Some(model) = users::find_by_email(pool.connection(), &email).await? else {
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
    };
    if !verify_password(password, &model.password_hash) {
        warn!(user_id = model.id, "Sign-in with wrong password");
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }
    Ok(users::model_to_user(model))
}

fn session_cookie(token: String, ttl_secs: u64, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_secure(secure);
    cookie.set_max_age(CookieDuration::seconds(ttl_secs as i64));
    cookie
}

fn cleared_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_secure(secure);
    cookie.set_max_age(CookieDuration::ZERO);
    cookie
}

/// Error indicator for the sign-in/sign-up pages.
fn form_error_code(err: &AppError) -> &'static str {
    match err {
        AppError::InvalidInput(msg) if msg == EMAIL_TAKEN => "exists",
        AppError::InvalidInput(_) | AppError::Unauthorized(_) => "invalid",
        _ => "failed",
    }
}

fn see_other(location: &str) -> actix_web::HttpResponseBuilder {
    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((header::LOCATION, location.to_string()));
    builder
}

/// Build the signed-in response: JSON body or redirect, both with the session cookie.
fn signed_in(
    user: User,
    is_form: bool,
    secret: &SessionSecret,
    config: &Config,
) -> AppResult<HttpResponse> {
    let token = secret.issue(&user)?;
    let cookie = session_cookie(token, secret.ttl_secs(), config.environment.is_production());

    if is_form {
        return Ok(see_other(AFTER_SIGNIN_PATH).cookie(cookie).finish());
    }
    Ok(HttpResponse::Ok().cookie(cookie).json(AuthResponse {
        success: true,
        user: UserResponse::from(user),
    }))
}

fn form_failure(page: &str, err: &AppError) -> HttpResponse {
    let location = format!("/auth/{}?error={}", page, form_error_code(err));
    see_other(&location).finish()
}

/// Configure account routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(signup)
        .service(signin)
        .service(signout)
        .service(session);
}

/// Create an account and sign in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created and signed in", body = AuthResponse),
        (status = 303, description = "Form submission redirect"),
        (status = 400, description = "Invalid email, short password or email already registered")
    )
)]
#[post("/auth/signup")]
pub async fn signup(
    body: Either<web::Json<SignupRequest>, web::Form<SignupRequest>>,
    pool: web::Data<DbPool>,
    secret: web::Data<SessionSecret>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let (req, is_form) = match body {
        Either::Left(json) => (json.into_inner(), false),
        Either::Right(form) => (form.into_inner(), true),
    };

    let result = register(&pool, &req.email, &req.password, req.name.as_deref()).await;
    match result {
        Ok(user) => signed_in(user, is_form, &secret, &config),
        Err(e) if is_form => Ok(form_failure("signup", &e)),
        Err(e) => Err(e),
    }
}

/// Sign in with email and password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signin",
    tag = "Auth",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 303, description = "Form submission redirect"),
        (status = 401, description = "Invalid email or password")
    )
)]
#[post("/auth/signin")]
pub async fn signin(
    body: Either<web::Json<SigninRequest>, web::Form<SigninRequest>>,
    pool: web::Data<DbPool>,
    secret: web::Data<SessionSecret>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let (req, is_form) = match body {
        Either::Left(json) => (json.into_inner(), false),
        Either::Right(form) => (form.into_inner(), true),
    };

    match authenticate(&pool, &req.email, &req.password).await {
        Ok(user) => signed_in(user, is_form, &secret, &config),
        Err(e) if is_form => Ok(form_failure("signin", &e)),
        Err(e) => Err(e),
    }
}

/// Sign out by clearing the session cookie.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signout",
    tag = "Auth",
    responses((status = 200, description = "Signed out"))
)]
#[post("/auth/signout")]
pub async fn signout(config: web::Data<Config>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(cleared_cookie(config.environment.is_production()))
        .json(serde_json::json!({ "success": true }))
}

/// Current session user, or `{ "user": null }` for guests.
#[utoipa::path(
    get,
    path = "/api/v1/auth/session",
    tag = "Auth",
    responses((status = 200, description = "Current session"))
)]
#[get("/auth/session")]
pub async fn session(session: MaybeSession, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let Some(current) = session.0 else {
        return Ok(HttpResponse::Ok().json(serde_json::json!({ "user": null })));
    };

    match users::find_by_id(pool.connection(), current.id).await? {
        Some(user) => {
            Ok(HttpResponse::Ok().json(serde_json::json!({ "user": UserResponse::from(user) })))
        }
        None => Ok(HttpResponse::Ok().json(serde_json::json!({ "user": null }))),
    }
}
