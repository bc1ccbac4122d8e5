use actix_web::{web, HttpResponse};
use secrecy::SecretString;
use serde::Deserialize;

use crate::{
    auth::extractors::Identity,
    db_interaction::insert_user_into_database,
    domain::user_role::UserRole,
    error::ApiError,
    policy::{authorize, Action, Resource},
    utils::{get_pooled_connection, DbPool}
};

use super::{parse_new_user, AuthResponse, RegistrationForm};

#[derive(Deserialize, Debug)]
pub struct CreateUserForm{
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub role: String,
    pub phone: Option<String>
}

// Admins provision accounts of any role, including RESTAURANT and DRIVER
#[tracing::instrument(
    "Creating user as admin",
    skip(pool, form),
    fields(email = %form.email, role = %form.role)
)]
pub async fn create_user(
    pool: web::Data<DbPool>,
    actor: Identity,
    form: web::Json<CreateUserForm>
) -> Result<HttpResponse, ApiError>{
    authorize(&actor, Action::CreateUser, Resource::Platform)?;

    let form = form.into_inner();
    let role: UserRole = form.role.parse()
        .map_err(|_| ApiError::InvalidArgument("Invalid role".to_string()))?;

    let new_user = parse_new_user(
        RegistrationForm{
            name: form.name,
            email: form.email,
            password: form.password,
            phone: form.phone
        },
        role
    )?;

    let conn = get_pooled_connection(&pool).await?;
    let user = insert_user_into_database(conn, new_user).await?;

    Ok(HttpResponse::Created().json(AuthResponse::new(user, None)))
}
