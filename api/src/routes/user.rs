use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	routing::{get, patch, post},
	Json,
	Router,
};
use models::api::user::UpdatePasswordRequest;
use serde_json::json;

use super::FilterQuery;
use crate::{db, prelude::*, service};

#[instrument(skip(state))]
pub async fn setup_routes(state: &AppState) -> Router {
	Router::new()
		.route("/", post(create_user).get(list_users))
		.route("/me", get(get_own_user))
		.route("/:user_id", get(get_user).put(update_user).delete(delete_user))
		.route("/:user_id/password", patch(update_password))
		.with_state(state.clone())
}

/// Admin-only create. Same pipeline as registration, behind the admin
/// gate.
#[instrument(skip(state, user))]
async fn create_user(
	State(state): State<AppState>,
	principal: Principal,
	Json(user): Json<User>,
) -> Result<(StatusCode, Json<serde_json::Value>), ErrorType> {
	service::rbac::require_admin(&principal)?;

	let mut transaction = state.database.begin().await.map_err(db::classify_error)?;
	let user = service::user::create_user(&mut transaction, user, &state.config).await?;
	transaction.commit().await.map_err(db::classify_error)?;

	info!("Created user {} ({})", user.user_id, user.username);
	Ok((
		StatusCode::CREATED,
		Json(json!({
			"message": "User created successfully",
			"user": user,
		})),
	))
}

/// Admin-only list, optionally narrowed to `?field=&value=`.
#[instrument(skip(state))]
async fn list_users(
	State(state): State<AppState>,
	principal: Principal,
	Query(query): Query<FilterQuery>,
) -> Result<Json<serde_json::Value>, ErrorType> {
	let mut connection = state
		.database
		.acquire()
		.await
		.map_err(db::classify_error)?;

	let users = match query.into_filter()? {
		Some((field, value)) => {
			service::user::filter_users(&mut connection, &principal, field, &value).await?
		}
		None => service::user::list_all_users(&mut connection, &principal).await?,
	};

	Ok(Json(json!({
		"message": "User(s) retrieved successfully",
		"users": users,
	})))
}

/// The caller's own record.
#[instrument(skip(state))]
async fn get_own_user(
	State(state): State<AppState>,
	principal: Principal,
) -> Result<Json<serde_json::Value>, ErrorType> {
	let mut connection = state
		.database
		.acquire()
		.await
		.map_err(db::classify_error)?;

	let user =
		service::user::get_user_by_id(&mut connection, principal.user_id, Some(&principal), false)
			.await?;

	Ok(Json(json!({
		"message": "User(s) retrieved successfully",
		"user": user,
	})))
}

#[instrument(skip(state))]
async fn get_user(
	State(state): State<AppState>,
	principal: Principal,
	Path(user_id): Path<i32>,
) -> Result<Json<serde_json::Value>, ErrorType> {
	let mut connection = state
		.database
		.acquire()
		.await
		.map_err(db::classify_error)?;

	let user =
		service::user::get_user_by_id(&mut connection, user_id, Some(&principal), false).await?;

	Ok(Json(json!({
		"message": "User(s) retrieved successfully",
		"user": user,
	})))
}

#[instrument(skip(state, user))]
async fn update_user(
	State(state): State<AppState>,
	principal: Principal,
	Path(user_id): Path<i32>,
	Json(mut user): Json<User>,
) -> Result<Json<serde_json::Value>, ErrorType> {
	user.user_id = user_id;
	user.password = None;

	let mut transaction = state.database.begin().await.map_err(db::classify_error)?;
	let user = service::user::update_user(&mut transaction, &principal, user).await?;
	transaction.commit().await.map_err(db::classify_error)?;

	info!("Updated user {user_id}");
	Ok(Json(json!({
		"message": "User updated successfully",
		"user": user,
	})))
}

#[instrument(skip(state, payload))]
async fn update_password(
	State(state): State<AppState>,
	principal: Principal,
	Path(user_id): Path<i32>,
	Json(mut payload): Json<UpdatePasswordRequest>,
) -> Result<Json<serde_json::Value>, ErrorType> {
	payload.user_id = user_id;

	let mut transaction = state.database.begin().await.map_err(db::classify_error)?;
	service::user::update_user_password(&mut transaction, &principal, &payload, &state.config)
		.await?;
	transaction.commit().await.map_err(db::classify_error)?;

	info!("Updated password for user {user_id}");
	Ok(Json(json!({
		"message": "User password updated successfully",
		"user_id": user_id,
	})))
}

#[instrument(skip(state))]
async fn delete_user(
	State(state): State<AppState>,
	principal: Principal,
	Path(user_id): Path<i32>,
) -> Result<Json<serde_json::Value>, ErrorType> {
	let mut transaction = state.database.begin().await.map_err(db::classify_error)?;
	service::user::delete_user(&mut transaction, &principal, user_id).await?;
	transaction.commit().await.map_err(db::classify_error)?;

	info!("Deleted user {user_id}");
	Ok(Json(json!({
		"message": "User deleted successfully",
		"user_id": user_id,
	})))
}
