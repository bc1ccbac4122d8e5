use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::{
    auth::extractors::Identity,
    db_interaction::update_restaurant as update_restaurant_profile,
    error::ApiError,
    models::RestaurantChangeset,
    utils::{get_pooled_connection, DbPool}
};

#[tracing::instrument(
    "Updating restaurant",
    skip(pool, body)
)]
pub async fn update_restaurant(
    pool: web::Data<DbPool>,
    actor: Identity,
    path: web::Path<Uuid>,
    body: web::Json<RestaurantChangeset>
) -> Result<HttpResponse, ApiError>{
    let changes = body.into_inner();
    if changes.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(ApiError::InvalidArgument("Name cannot be empty".to_string()))
    }

    let conn = get_pooled_connection(&pool).await?;
    let restaurant = update_restaurant_profile(conn, actor, path.into_inner(), changes).await?;

    Ok(HttpResponse::Ok().json(restaurant))
}
