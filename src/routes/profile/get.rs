use actix_web::{web, HttpResponse};

use crate::{auth::extractors::Identity, db_interaction::get_user_profile_info, error::ApiError, utils::{get_pooled_connection, DbPool}};

#[tracing::instrument(
    "Get profile data of logged in user",
    skip(pool)
)]
pub async fn get_profile(
    pool: web::Data<DbPool>,
    actor: Identity
) -> Result<HttpResponse, ApiError>{
    let conn = get_pooled_connection(&pool).await?;

    let user_profile_info = get_user_profile_info(conn, actor.user_id).await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(user_profile_info))
}
