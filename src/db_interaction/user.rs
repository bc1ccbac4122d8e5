use std::{error::Error, fmt::Debug};

use anyhow::Context;
use chrono::Utc;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use uuid::Uuid;

use crate::{configuration::AdminSettings, domain::{user_email::UserEmail, user_role::UserRole}, error::ApiError, models::{User, UserProfileInfo}, password::hash_password, schema::users, telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, DbConnection}};

#[derive(Debug)]
pub struct NewUser{
    pub name: String,
    pub email: UserEmail,
    pub password: SecretString,
    pub role: UserRole,
    pub phone: Option<String>
}

// Function to query user from email id
#[tracing::instrument(
    "Getting user by email",
    skip(conn)
)]
pub async fn get_user_from_email(
    mut conn: DbConnection,
    email: UserEmail
) -> Result<Option<User>, anyhow::Error> {
    spawn_blocking_with_tracing(move || {
        users::table
            .filter(users::email.eq(email.inner()))
            .select(User::as_select())
            .first::<User>(&mut conn)
            .optional()
            .context("Failed to query user by email")
    })
    .await
    .context("Failed due to threadpool error")?
}

// Error associated with inserting user to users table
#[derive(Error)]
pub enum UserInsertError{
    #[error("User already exists")]
    EmailNotUnique(#[source] diesel::result::Error),
    #[error("Failed to run query")]
    RunQueryError(#[source] diesel::result::Error),
    #[error("unexpected database / hashing error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for UserInsertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, self.source())
    }
}

impl From<UserInsertError> for ApiError {
    fn from(e: UserInsertError) -> Self {
        match e {
            UserInsertError::EmailNotUnique(_) => ApiError::InvalidState(e.to_string()),
            _ => ApiError::Internal(anyhow::anyhow!("{:?}", e))
        }
    }
}

impl From<diesel::result::Error> for UserInsertError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _
            ) => UserInsertError::EmailNotUnique(e),
            _ => UserInsertError::RunQueryError(e)
        }
    }
}

#[tracing::instrument(
    "Inserting user into the database",
    skip(conn)
)]
pub async fn insert_user_into_database(
    mut conn: DbConnection,
    new_user: NewUser
) -> Result<User, UserInsertError> {
    let password_hash = hash_password(new_user.password).await?;

    let user = User{
        user_id: Uuid::new_v4(),
        name: new_user.name,
        email: new_user.email.inner(),
        password_hash: password_hash.expose_secret().to_string(),
        role: new_user.role.as_str().to_string(),
        phone: new_user.phone,
        created_at: Utc::now()
    };

    let res = spawn_blocking_with_tracing(move || {
        diesel::insert_into(users::table)
            .values(&user)
            .execute(&mut conn)?;

        Ok::<User, UserInsertError>(user)
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument(
    "Get profile data of logged in user",
    skip(conn)
)]
pub async fn get_user_profile_info(
    mut conn: DbConnection,
    user_id: Uuid
) -> Result<Option<UserProfileInfo>, anyhow::Error>{
    spawn_blocking_with_tracing(move || {
        users::table
            .filter(users::user_id.eq(user_id))
            .select(UserProfileInfo::as_select())
            .first::<UserProfileInfo>(&mut conn)
            .optional()
            .context("Failed to get UserProfileInfo from database")
    })
    .await
    .context("Failed due to threadpool error")?
}

#[derive(Debug, Default)]
pub struct ProfileUpdate{
    pub name: Option<String>,
    pub email: Option<UserEmail>,
    pub phone: Option<String>
}

// Errors associated with updating user profile in database
#[derive(thiserror::Error)]
pub enum PostUserProfileInfoError{
    #[error("Failed due to threadpool error")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Email already in use")]
    EmailNotUnique(#[source] diesel::result::Error),
    #[error("Failed due to database error")]
    QueryError(#[source] diesel::result::Error),
    #[error("User not found")]
    NoUserError
}

impl Debug for PostUserProfileInfoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, self.source())
    }
}

impl From<diesel::result::Error> for PostUserProfileInfoError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => PostUserProfileInfoError::NoUserError,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _
            ) => PostUserProfileInfoError::EmailNotUnique(e),
            _ => PostUserProfileInfoError::QueryError(e)
        }
    }
}

#[tracing::instrument(
    "posting user profile info to db",
    skip(conn)
)]
pub async fn post_user_profile_info(
    mut conn: DbConnection,
    user_id: Uuid,
    update: ProfileUpdate
) -> Result<UserProfileInfo, PostUserProfileInfoError>{
    let res = spawn_blocking_with_tracing(move || {
        let current = users::table
            .filter(users::user_id.eq(user_id))
            .select(UserProfileInfo::as_select())
            .first::<UserProfileInfo>(&mut conn)?;

        let updated = diesel::update(users::table)
            .filter(users::user_id.eq(user_id))
            .set((
                users::name.eq(update.name.unwrap_or(current.name)),
                users::email.eq(update.email.map(|e| e.inner()).unwrap_or(current.email)),
                users::phone.eq(update.phone.or(current.phone))
            ))
            .returning(UserProfileInfo::as_returning())
            .get_result::<UserProfileInfo>(&mut conn)?;

        Ok::<_, PostUserProfileInfoError>(updated)
    })
    .await??;

    Ok(res)
}

// Seeds the configured admin account, a no-op when the email is already registered
#[tracing::instrument(
    "Ensuring admin account exists",
    skip_all
)]
pub async fn ensure_admin_user(
    conn: DbConnection,
    settings: AdminSettings
) -> Result<(), anyhow::Error>{
    let email = UserEmail::parse(settings.email)
        .map_err(|e| anyhow::anyhow!(e))?;

    let new_user = NewUser{
        name: settings.name,
        email,
        password: settings.password,
        role: UserRole::ADMIN,
        phone: None
    };

    match insert_user_into_database(conn, new_user).await {
        Ok(_) => {
            tracing::info!("Admin account created");
            Ok(())
        },
        Err(UserInsertError::EmailNotUnique(_)) => {
            tracing::info!("Admin already exists");
            Ok(())
        },
        Err(e) => Err(anyhow::anyhow!("{:?}", e).context("Failed to seed admin account"))
    }
}

impl From<PostUserProfileInfoError> for ApiError {
    fn from(e: PostUserProfileInfoError) -> Self {
        match e {
            PostUserProfileInfoError::EmailNotUnique(_) => ApiError::InvalidState(e.to_string()),
            PostUserProfileInfoError::NoUserError => ApiError::NotFound(e.to_string()),
            _ => ApiError::Internal(anyhow::anyhow!("{:?}", e))
        }
    }
}
