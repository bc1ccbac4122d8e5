use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::{
    auth::extractors::Identity,
    db_interaction::get_restaurant_orders as load_restaurant_orders,
    error::ApiError,
    routes::PageQuery,
    utils::{get_pooled_connection, DbPool}
};

#[tracing::instrument(
    "Getting orders of restaurant",
    skip(pool)
)]
pub async fn get_restaurant_orders(
    pool: web::Data<DbPool>,
    actor: Identity,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>
) -> Result<HttpResponse, ApiError>{
    let page = query.into_inner().into_page()?;

    let conn = get_pooled_connection(&pool).await?;
    let orders = load_restaurant_orders(conn, actor, path.into_inner(), page).await?;

    Ok(HttpResponse::Ok().json(orders))
}
