use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::extractors::Identity,
    db_interaction::update_order_status as transition_order,
    domain::order_status::OrderStatus,
    error::ApiError,
    policy::{authorize, Action, Resource},
    utils::{get_pooled_connection, DbPool}
};

#[derive(Deserialize, Debug)]
pub struct UpdateOrderStatusForm{
    pub status: Option<String>
}

#[tracing::instrument(
    "Updating order status",
    skip(pool)
)]
pub async fn update_order_status(
    pool: web::Data<DbPool>,
    actor: Identity,
    path: web::Path<Uuid>,
    form: Result<web::Json<UpdateOrderStatusForm>, actix_web::Error>
) -> Result<HttpResponse, ApiError>{
    // Customers are refused whatever the body says
    authorize(&actor, Action::UpdateOrderStatus, Resource::Platform)?;

    let form = form.map_err(|e| ApiError::InvalidArgument(e.to_string()))?;
    let status: OrderStatus = form.into_inner().status
        .ok_or_else(|| ApiError::InvalidArgument("Status is required".to_string()))?
        .parse()
        .map_err(ApiError::InvalidArgument)?;

    let conn = get_pooled_connection(&pool).await?;
    let order = transition_order(conn, actor, path.into_inner(), status).await?;

    Ok(HttpResponse::Ok().json(order))
}
