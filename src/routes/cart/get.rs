use actix_web::{web, HttpResponse};

use crate::{auth::extractors::Identity, db_interaction::get_cart as load_cart, error::ApiError, utils::{get_pooled_connection, DbPool}};

#[tracing::instrument(
    "Getting cart",
    skip(pool)
)]
pub async fn get_cart(
    pool: web::Data<DbPool>,
    actor: Identity
) -> Result<HttpResponse, ApiError>{
    let conn = get_pooled_connection(&pool).await?;
    let cart = load_cart(conn, actor).await?;

    Ok(HttpResponse::Ok().json(cart))
}
