use actix_web::{web, HttpResponse};

use crate::{
    auth::extractors::Identity,
    db_interaction::{create_restaurant as insert_restaurant, NewRestaurant},
    error::ApiError,
    models::RestaurantChangeset,
    utils::{get_pooled_connection, DbPool}
};

#[tracing::instrument(
    "Creating restaurant",
    skip(pool, body)
)]
pub async fn create_restaurant(
    pool: web::Data<DbPool>,
    actor: Identity,
    body: web::Json<RestaurantChangeset>
) -> Result<HttpResponse, ApiError>{
    let mut profile = body.into_inner();
    let name = profile.name
        .take()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::InvalidArgument("Name is required".to_string()))?;

    let conn = get_pooled_connection(&pool).await?;
    let restaurant = insert_restaurant(conn, actor, NewRestaurant{ name, profile }).await?;

    Ok(HttpResponse::Created().json(restaurant))
}
