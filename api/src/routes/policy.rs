use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	routing::get,
	Json,
	Router,
};
use serde_json::json;

use super::FilterQuery;
use crate::{db, prelude::*, service};

#[instrument(skip(state))]
pub async fn setup_routes(state: &AppState) -> Router {
	Router::new()
		.route("/", get(list_policies).post(create_policy))
		.route("/mine", get(list_own_policies))
		.route(
			"/:policy_id",
			get(get_policy).put(update_policy).delete(delete_policy),
		)
		.with_state(state.clone())
}

/// Creates a policy together with its optional extras links. The
/// transaction spans the insert and the extras verification, so an
/// invalid extras list leaves no policy row behind.
#[instrument(skip(state, request))]
async fn create_policy(
	State(state): State<AppState>,
	principal: Principal,
	Json(request): Json<PolicyRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ErrorType> {
	let mut transaction = state.database.begin().await.map_err(db::classify_error)?;
	let created = service::policy::create_policy(&mut transaction, &principal, request).await?;
	transaction.commit().await.map_err(db::classify_error)?;

	Ok((
		StatusCode::CREATED,
		Json(json!({
			"message": "Policy created successfully",
			"policy": created.policy,
			"optional_extras": created.optional_extras,
		})),
	))
}

/// Admin-only list, optionally narrowed to `?field=&value=`.
#[instrument(skip(state))]
async fn list_policies(
	State(state): State<AppState>,
	principal: Principal,
	Query(query): Query<FilterQuery>,
) -> Result<Json<serde_json::Value>, ErrorType> {
	let mut connection = state
		.database
		.acquire()
		.await
		.map_err(db::classify_error)?;

	let policies = match query.into_filter()? {
		Some((field, value)) => {
			service::policy::filter_policies(&mut connection, &principal, field, &value).await?
		}
		None => service::policy::list_all_policies(&mut connection, &principal).await?,
	};

	Ok(Json(json!({
		"message": "Policy(s) retrieved successfully",
		"policies": policies,
	})))
}

/// The caller's own policies. Unlike other list reads, an empty result
/// here is an empty list.
#[instrument(skip(state))]
async fn list_own_policies(
	State(state): State<AppState>,
	principal: Principal,
) -> Result<Json<serde_json::Value>, ErrorType> {
	let mut connection = state
		.database
		.acquire()
		.await
		.map_err(db::classify_error)?;

	let policies =
		service::policy::list_policies_by_user(&mut connection, &principal, principal.user_id)
			.await?;

	Ok(Json(json!({
		"message": "Policy(s) retrieved successfully",
		"policies": policies,
	})))
}

#[instrument(skip(state))]
async fn get_policy(
	State(state): State<AppState>,
	principal: Principal,
	Path(policy_id): Path<i32>,
) -> Result<Json<serde_json::Value>, ErrorType> {
	let mut connection = state
		.database
		.acquire()
		.await
		.map_err(db::classify_error)?;

	let policy = service::policy::get_policy_by_id(&mut connection, &principal, policy_id).await?;

	Ok(Json(json!({
		"message": "Policy(s) retrieved successfully",
		"policy": policy.policy,
		"optional_extras": policy.optional_extras,
	})))
}

/// Updates the policy columns and reconciles the extras links in one
/// transaction, committed exactly once.
#[instrument(skip(state, request))]
async fn update_policy(
	State(state): State<AppState>,
	principal: Principal,
	Path(policy_id): Path<i32>,
	Json(request): Json<PolicyRequest>,
) -> Result<Json<serde_json::Value>, ErrorType> {
	let mut transaction = state.database.begin().await.map_err(db::classify_error)?;
	let updated =
		service::policy::update_policy(&mut transaction, &principal, policy_id, request).await?;
	transaction.commit().await.map_err(db::classify_error)?;

	Ok(Json(json!({
		"message": "Policy updated successfully",
		"policy": updated.policy,
		"optional_extras": updated.optional_extras,
	})))
}

#[instrument(skip(state))]
async fn delete_policy(
	State(state): State<AppState>,
	principal: Principal,
	Path(policy_id): Path<i32>,
) -> Result<Json<serde_json::Value>, ErrorType> {
	let mut transaction = state.database.begin().await.map_err(db::classify_error)?;
	let policy_id = service::policy::delete_policy(&mut transaction, &principal, policy_id).await?;
	transaction.commit().await.map_err(db::classify_error)?;

	Ok(Json(json!({
		"message": "Policy deleted successfully",
		"policy_id": policy_id,
	})))
}
