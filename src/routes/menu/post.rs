use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::extractors::Identity,
    db_interaction::{add_menu_item as insert_menu_item, NewMenuItem},
    error::ApiError,
    utils::{get_pooled_connection, DbPool}
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemForm{
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>
}

pub(crate) fn validate_price(price: Decimal) -> Result<Decimal, ApiError>{
    if price < Decimal::ZERO {
        return Err(ApiError::InvalidArgument("Price cannot be negative".to_string()))
    }
    Ok(price)
}

impl TryFrom<MenuItemForm> for NewMenuItem {
    type Error = ApiError;

    fn try_from(form: MenuItemForm) -> Result<Self, Self::Error> {
        let name = form.name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApiError::InvalidArgument("Name and price are required".to_string()))?;
        let price = form.price
            .ok_or_else(|| ApiError::InvalidArgument("Name and price are required".to_string()))?;

        Ok(NewMenuItem{
            name,
            description: form.description,
            price: validate_price(price)?,
            image_url: form.image_url,
            is_available: form.is_available.unwrap_or(true)
        })
    }
}

#[tracing::instrument(
    "Adding menu item",
    skip(pool, form)
)]
pub async fn add_menu_item(
    pool: web::Data<DbPool>,
    actor: Identity,
    path: web::Path<Uuid>,
    form: web::Json<MenuItemForm>
) -> Result<HttpResponse, ApiError>{
    let new_item = NewMenuItem::try_from(form.into_inner())?;

    let conn = get_pooled_connection(&pool).await?;
    let item = insert_menu_item(conn, actor, path.into_inner(), new_item).await?;

    Ok(HttpResponse::Created().json(item))
}
