use crate::domain::DomainError;
use crate::infrastructure::jwt::JwtService;
use crate::presentation::urls::login_redirect_url;
use actix_web::dev::Payload;
use actix_web::http::header::Header;
use actix_web::{web, FromRequest, HttpRequest};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use std::future::{ready, Ready};
use std::sync::Arc;

/// Where anonymous users are sent and where session tokens are looked up.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub login_url: String,
    pub session_cookie: String,
}

/// The authenticated user of a request.
///
/// Extracting it from an anonymous request fails with a redirect to the
/// login page carrying the requested path as `next`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

impl FromRequest for CurrentUser {
    type Error = DomainError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn session_token(req: &HttpRequest, cookie_name: &str) -> Option<String> {
    if let Ok(auth) = Authorization::<Bearer>::parse(req) {
        return Some(auth.into_scheme().token().to_string());
    }
    req.cookie(cookie_name)
        .map(|cookie| cookie.value().to_string())
}

fn authenticate(req: &HttpRequest) -> Result<CurrentUser, DomainError> {
    let settings = req
        .app_data::<web::Data<AuthSettings>>()
        .ok_or_else(|| DomainError::InternalError("Auth settings not configured".to_string()))?;
    let jwt_service = req
        .app_data::<web::Data<Arc<JwtService>>>()
        .ok_or_else(|| DomainError::InternalError("JWT service not configured".to_string()))?;

    let claims = session_token(req, &settings.session_cookie)
        .and_then(|token| jwt_service.verify_token(&token));

    match claims {
        Some(claims) => Ok(CurrentUser {
            id: claims.user_id,
            username: claims.username,
        }),
        None => {
            let next = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or_else(|| req.path());
            tracing::debug!("Anonymous request to {}, redirecting to login", next);
            Err(DomainError::LoginRequired {
                location: login_redirect_url(&settings.login_url, next),
            })
        }
    }
}
