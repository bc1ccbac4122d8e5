use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::{auth::extractors::Identity, db_interaction::delete_menu_item as remove_menu_item, error::ApiError, utils::{get_pooled_connection, DbPool}};

#[tracing::instrument(
    "Deleting menu item",
    skip(pool)
)]
pub async fn delete_menu_item(
    pool: web::Data<DbPool>,
    actor: Identity,
    path: web::Path<Uuid>
) -> Result<HttpResponse, ApiError>{
    let conn = get_pooled_connection(&pool).await?;
    remove_menu_item(conn, actor, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Menu item deleted" })))
}
