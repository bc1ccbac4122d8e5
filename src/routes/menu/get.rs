use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::{db_interaction::get_menu_items, error::ApiError, utils::{get_pooled_connection, DbPool}};

#[tracing::instrument(
    "Getting menu of restaurant",
    skip(pool)
)]
pub async fn get_menu(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>
) -> Result<HttpResponse, ApiError>{
    let conn = get_pooled_connection(&pool).await?;
    let items = get_menu_items(conn, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(items))
}
