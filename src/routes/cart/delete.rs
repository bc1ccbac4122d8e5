use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{auth::extractors::Identity, db_interaction::delete_cart as remove_cart, error::ApiError, utils::{get_pooled_connection, DbPool}};

#[tracing::instrument(
    "Deleting cart",
    skip(pool)
)]
pub async fn delete_cart(
    pool: web::Data<DbPool>,
    actor: Identity
) -> Result<HttpResponse, ApiError>{
    let conn = get_pooled_connection(&pool).await?;
    remove_cart(conn, actor).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Cart deleted" })))
}
