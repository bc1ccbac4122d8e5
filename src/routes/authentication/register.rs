use actix_web::{web, HttpResponse};
use anyhow::Context;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{
    auth::jwt::Tokenizer,
    db_interaction::{insert_user_into_database, NewUser},
    domain::{phone_number::PhoneNumberDomain, user_email::UserEmail, user_role::UserRole},
    error::ApiError,
    utils::{get_pooled_connection, DbPool}
};

use super::AuthResponse;

#[derive(Deserialize, Debug)]
pub struct RegistrationForm{
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub phone: Option<String>
}

// Validates the raw form into a user of the given role
pub(crate) fn parse_new_user(form: RegistrationForm, role: UserRole) -> Result<NewUser, ApiError>{
    let name = form.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::InvalidArgument("Name is required".to_string()))
    }

    if form.password.expose_secret().is_empty() {
        return Err(ApiError::InvalidArgument("Password is required".to_string()))
    }

    let email = UserEmail::parse(form.email)
        .map_err(ApiError::InvalidArgument)?;

    let phone = form.phone
        .filter(|p| !p.trim().is_empty())
        .map(|p| PhoneNumberDomain::parse(p).map(|p| p.inner()))
        .transpose()
        .map_err(ApiError::InvalidArgument)?;

    Ok(NewUser{
        name,
        email,
        password: form.password,
        role,
        phone
    })
}

// Self service sign up, always creates a CUSTOMER
#[tracing::instrument(
    "User registration started",
    skip(pool, tokenizer, form),
    fields(email = %form.email)
)]
pub async fn register(
    pool: web::Data<DbPool>,
    tokenizer: web::Data<Tokenizer>,
    form: web::Json<RegistrationForm>
) -> Result<HttpResponse, ApiError> {
    let new_user = parse_new_user(form.into_inner(), UserRole::CUSTOMER)?;

    let conn = get_pooled_connection(&pool).await?;
    let user = insert_user_into_database(conn, new_user).await?;

    let token = tokenizer.generate_key(&user)
        .context("Failed to generate token")?;

    Ok(HttpResponse::Created().json(AuthResponse::new(user, Some(token))))
}
