use actix_web::{web, HttpResponse};
use anyhow::Context;
use secrecy::SecretString;
use serde::Deserialize;

use crate::{
    auth::jwt::Tokenizer,
    db_interaction::get_user_from_email,
    domain::user_email::UserEmail,
    error::ApiError,
    password::verify_password,
    utils::{get_pooled_connection, DbPool}
};

use super::AuthResponse;

#[derive(Deserialize, Debug)]
pub struct LoginForm{
    pub email: String,
    pub password: SecretString
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthenticated("Invalid email or password".to_string())
}

#[tracing::instrument(
    "Logging in user",
    skip(pool, tokenizer, form),
    fields(email = %form.email)
)]
pub async fn login(
    pool: web::Data<DbPool>,
    tokenizer: web::Data<Tokenizer>,
    form: web::Json<LoginForm>
) -> Result<HttpResponse, ApiError>{
    let form = form.into_inner();
    let email = UserEmail::parse(form.email)
        .map_err(|_| invalid_credentials())?;

    let conn = get_pooled_connection(&pool).await?;
    let user = get_user_from_email(conn, email).await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(form.password, user.password_hash.clone()).await? {
        tracing::info!("Passwords did not match");
        return Err(invalid_credentials())
    }

    let token = tokenizer.generate_key(&user)
        .context("Failed to generate token")?;

    Ok(HttpResponse::Ok().json(AuthResponse::new(user, Some(token))))
}
