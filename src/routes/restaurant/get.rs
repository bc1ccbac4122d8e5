use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::{db_interaction::{get_restaurant_with_menu, get_restaurants_with_menu}, error::ApiError, utils::{get_pooled_connection, DbPool}};

#[tracing::instrument(
    "Getting list of restaurants",
    skip(pool)
)]
pub async fn get_restaurants(
    pool: web::Data<DbPool>
) -> Result<HttpResponse, ApiError>{
    let conn = get_pooled_connection(&pool).await?;
    let restaurants = get_restaurants_with_menu(conn).await?;

    Ok(HttpResponse::Ok().json(restaurants))
}

#[tracing::instrument(
    "Getting restaurant",
    skip(pool)
)]
pub async fn get_restaurant(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>
) -> Result<HttpResponse, ApiError>{
    let conn = get_pooled_connection(&pool).await?;
    let restaurant = get_restaurant_with_menu(conn, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(restaurant))
}
