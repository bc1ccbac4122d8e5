use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    auth::extractors::Identity,
    db_interaction::{post_user_profile_info, ProfileUpdate},
    domain::{phone_number::PhoneNumberDomain, user_email::UserEmail},
    error::ApiError,
    utils::{get_pooled_connection, DbPool}
};

#[derive(Deserialize, Debug)]
pub struct ProfileForm{
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>
}

// Validates every field that is present, absent fields keep their stored value
pub fn parse_profile_update(form: ProfileForm) -> Result<ProfileUpdate, String>{
    let name = match form.name {
        Some(name) if name.trim().is_empty() => return Err("Name cannot be empty".to_string()),
        Some(name) => Some(name.trim().to_string()),
        None => None
    };

    let email = form.email
        .map(UserEmail::parse)
        .transpose()?;

    let phone = form.phone
        .map(|number| PhoneNumberDomain::parse(number).map(|p| p.inner()))
        .transpose()?;

    Ok(ProfileUpdate{ name, email, phone })
}

#[tracing::instrument(
    "Updating user profile info",
    skip(pool, form)
)]
pub async fn update_profile(
    pool: web::Data<DbPool>,
    actor: Identity,
    form: web::Json<ProfileForm>
) -> Result<HttpResponse, ApiError>{
    let update = parse_profile_update(form.into_inner())
        .map_err(ApiError::InvalidArgument)?;

    let conn = get_pooled_connection(&pool).await?;
    let profile = post_user_profile_info(conn, actor.user_id, update).await?;

    Ok(HttpResponse::Ok().json(profile))
}
