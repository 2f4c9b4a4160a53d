use axum::{
	extract::{Path, State},
	http::StatusCode,
	routing::get,
	Json,
	Router,
};
use serde_json::json;

use crate::{db, prelude::*, service};

#[instrument(skip(state))]
pub async fn setup_routes(state: &AppState) -> Router {
	Router::new()
		.route("/", get(list_optional_extras).post(create_optional_extra))
		.route(
			"/:extra_id",
			get(get_optional_extra)
				.put(update_optional_extra)
				.delete(delete_optional_extra),
		)
		.with_state(state.clone())
}

/// The whole catalog, readable by any authenticated caller.
#[instrument(skip(state))]
async fn list_optional_extras(
	State(state): State<AppState>,
	_principal: Principal,
) -> Result<Json<serde_json::Value>, ErrorType> {
	let mut connection = state
		.database
		.acquire()
		.await
		.map_err(db::classify_error)?;

	let extras = service::optional_extra::list_all_optional_extras(&mut connection).await?;

	Ok(Json(json!({
		"message": "Optional extra(s) retrieved successfully",
		"optional_extras": extras,
	})))
}

#[instrument(skip(state))]
async fn get_optional_extra(
	State(state): State<AppState>,
	_principal: Principal,
	Path(extra_id): Path<i32>,
) -> Result<Json<serde_json::Value>, ErrorType> {
	let mut connection = state
		.database
		.acquire()
		.await
		.map_err(db::classify_error)?;

	let extra = service::optional_extra::get_optional_extra_by_id(&mut connection, extra_id).await?;

	Ok(Json(json!({
		"message": "Optional extra(s) retrieved successfully",
		"optional_extra": extra,
	})))
}

#[instrument(skip(state, extra))]
async fn create_optional_extra(
	State(state): State<AppState>,
	principal: Principal,
	Json(extra): Json<OptionalExtra>,
) -> Result<(StatusCode, Json<serde_json::Value>), ErrorType> {
	let mut transaction = state.database.begin().await.map_err(db::classify_error)?;
	let extra =
		service::optional_extra::create_optional_extra(&mut transaction, &principal, extra)
			.await?;
	transaction.commit().await.map_err(db::classify_error)?;

	info!("Created optional extra {:?}", extra.extra_id);
	Ok((
		StatusCode::CREATED,
		Json(json!({
			"message": "Optional extra created successfully",
			"optional_extra": extra,
		})),
	))
}

#[instrument(skip(state, extra))]
async fn update_optional_extra(
	State(state): State<AppState>,
	principal: Principal,
	Path(extra_id): Path<i32>,
	Json(extra): Json<OptionalExtra>,
) -> Result<Json<serde_json::Value>, ErrorType> {
	let mut transaction = state.database.begin().await.map_err(db::classify_error)?;
	let extra = service::optional_extra::update_optional_extra(
		&mut transaction,
		&principal,
		extra_id,
		extra,
	)
	.await?;
	transaction.commit().await.map_err(db::classify_error)?;

	info!("Updated optional extra {extra_id}");
	Ok(Json(json!({
		"message": "Optional extra updated successfully",
		"optional_extra": extra,
	})))
}

/// Unlinks the extra from every policy and removes it, in one
/// transaction.
#[instrument(skip(state))]
async fn delete_optional_extra(
	State(state): State<AppState>,
	principal: Principal,
	Path(extra_id): Path<i32>,
) -> Result<Json<serde_json::Value>, ErrorType> {
	let mut transaction = state.database.begin().await.map_err(db::classify_error)?;
	service::optional_extra::delete_optional_extra(&mut transaction, &principal, extra_id)
		.await?;
	transaction.commit().await.map_err(db::classify_error)?;

	info!("Deleted optional extra {extra_id}");
	Ok(Json(json!({
		"message": "Optional extra deleted successfully",
		"extra_id": extra_id,
	})))
}
