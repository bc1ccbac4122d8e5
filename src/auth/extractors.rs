use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use crate::{domain::user_role::UserRole, error::ApiError};

use super::jwt::Tokenizer;

// Caller resolved from the bearer token, passed explicitly into every core operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity{
    pub user_id: Uuid,
    pub role: UserRole
}

impl FromRequest for Identity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(identity_from_request(req).map_err(actix_web::Error::from))
    }
}

fn identity_from_request(req: &HttpRequest) -> Result<Identity, ApiError>{
    let tokenizer = req.app_data::<web::Data<Tokenizer>>()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Tokenizer is not registered as app data")))?;

    let token = req.headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer"))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthenticated("Not authorized, no token".to_string()))?;

    match tokenizer.decode_key(token) {
        Some(claims) => Ok(Identity{ user_id: claims.sub, role: claims.role }),
        None => Err(ApiError::Unauthenticated("Not authorized, token failed".to_string()))
    }
}
