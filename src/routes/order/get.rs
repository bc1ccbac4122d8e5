use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::extractors::Identity,
    db_interaction::{get_order_by_id, get_orders_for_customer, Page},
    error::ApiError,
    utils::{get_pooled_connection, DbPool}
};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Deserialize, Debug, Default)]
pub struct PageQuery{
    pub page: Option<i64>,
    pub limit: Option<i64>
}

impl PageQuery {
    pub fn into_page(self) -> Result<Page, ApiError> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 || !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(ApiError::InvalidArgument(
                format!("page must be at least 1 and limit between 1 and {}", MAX_PAGE_SIZE)
            ))
        }

        Ok(Page{ page, limit })
    }
}

#[tracing::instrument(
    "Getting list of orders",
    skip(pool)
)]
pub async fn get_my_orders(
    pool: web::Data<DbPool>,
    actor: Identity,
    query: web::Query<PageQuery>
) -> Result<HttpResponse, ApiError> {
    let page = query.into_inner().into_page()?;

    let conn = get_pooled_connection(&pool).await?;
    let orders = get_orders_for_customer(conn, actor, page).await?;

    Ok(HttpResponse::Ok().json(orders))
}

#[tracing::instrument(
    "Getting order",
    skip(pool)
)]
pub async fn get_order(
    pool: web::Data<DbPool>,
    actor: Identity,
    path: web::Path<Uuid>
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let order = get_order_by_id(conn, actor, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(order))
}
