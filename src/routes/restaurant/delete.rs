use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::{auth::extractors::Identity, db_interaction::delete_restaurant as remove_restaurant, error::ApiError, utils::{get_pooled_connection, DbPool}};

#[tracing::instrument(
    "Deleting restaurant",
    skip(pool)
)]
pub async fn delete_restaurant(
    pool: web::Data<DbPool>,
    actor: Identity,
    path: web::Path<Uuid>
) -> Result<HttpResponse, ApiError>{
    let conn = get_pooled_connection(&pool).await?;
    remove_restaurant(conn, actor, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Restaurant deleted" })))
}
