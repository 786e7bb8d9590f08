use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{AddIngredientRequest, QuantityResponse, UnitResponse, UpdateInventoryRequest};
use super::repo_types::{IngredientRef, InventoryItemDetails};

#[instrument(skip(state))]
pub async fn list_inventory(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<InventoryItemDetails>>, ApiError> {
    let items = state.db.all_in_inventory(user_id).await?;
    Ok(Json(items))
}

#[instrument(skip(state, body))]
pub async fn add_ingredient(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(body): Json<AddIngredientRequest>,
) -> Result<(StatusCode, HeaderMap, Json<InventoryItemDetails>), ApiError> {
    let item = body.validate()?;
    let details = state.db.add_ingredient(user_id, &item).await?;

    let mut headers = HeaderMap::new();
    let location = format!("/api/v1/users/{user_id}/inventory/{}", details.name);
    if let Ok(value) = location.parse() {
        headers.insert(header::LOCATION, value);
    }

    Ok((StatusCode::CREATED, headers, Json(details)))
}

#[instrument(skip(state))]
pub async fn get_item(
    State(state): State<AppState>,
    Path((user_id, name)): Path<(i64, String)>,
) -> Result<Json<InventoryItemDetails>, ApiError> {
    match state.db.info_by_name(&name, user_id).await? {
        Some(details) => Ok(Json(details)),
        None => Err(ApiError::NotFound(format!(
            "'{name}' is not in the inventory"
        ))),
    }
}

#[instrument(skip(state))]
pub async fn get_quantity(
    State(state): State<AppState>,
    Path((user_id, name)): Path<(i64, String)>,
) -> Result<Json<QuantityResponse>, ApiError> {
    let quantity = state.db.quantity_by_name(&name, user_id).await?;
    Ok(Json(QuantityResponse { quantity }))
}

#[instrument(skip(state, body))]
pub async fn update_item(
    State(state): State<AppState>,
    Path((user_id, name)): Path<(i64, String)>,
    Json(body): Json<UpdateInventoryRequest>,
) -> Result<Json<InventoryItemDetails>, ApiError> {
    let patch = body.validate()?;
    if patch.is_empty() {
        return Err(ApiError::UnprocessableEntity("no fields to update".into()));
    }

    let details = state
        .db
        .update_in_inventory(IngredientRef::Name(&name), user_id, &patch)
        .await?;
    Ok(Json(details))
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    Path((user_id, name)): Path<(i64, String)>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .db
        .delete_from_inventory(IngredientRef::Name(&name), user_id)
        .await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        // the row disappeared between the existence check and the
        // delete; surface it the same way as a missing row
        Err(ApiError::NotFound(format!(
            "'{name}' is not in the inventory"
        )))
    }
}

#[instrument(skip(state))]
pub async fn get_unit(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<UnitResponse>, ApiError> {
    let unit_type = state.db.measurement_unit_by_name(&name).await?;
    Ok(Json(UnitResponse { unit_type }))
}
