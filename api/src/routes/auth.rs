use axum::{
	extract::State,
	http::{request::Parts, StatusCode},
	routing::post,
	Json,
	Router,
};
use models::api::auth::{SignInRequest, SignInResponse};
use serde_json::json;

use crate::{
	db,
	models::{access_token_data::AccessTokenData, principal},
	prelude::*,
	service,
};

#[instrument(skip(state))]
pub async fn setup_routes(state: &AppState) -> Router {
	Router::new()
		.route("/sign-in", post(sign_in))
		.route("/sign-up", post(sign_up))
		.route("/renew", post(renew))
		.with_state(state.clone())
}

/// Verifies credentials and mints a fresh token pair.
#[instrument(skip(state, request))]
async fn sign_in(
	State(state): State<AppState>,
	Json(request): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, ErrorType> {
	let mut connection = state
		.database
		.acquire()
		.await
		.map_err(db::classify_error)?;

	let user = service::auth::authenticate_user(
		&mut connection,
		&request.username,
		&request.password,
		&state.config,
	)
	.await?;
	let (access_token, refresh_token) =
		service::auth::generate_token_pair(&user, &state.config)?;

	info!("User {} signed in", user.user_id);
	Ok(Json(SignInResponse {
		access_token,
		refresh_token,
		token_type: "bearer".to_string(),
		user,
	}))
}

/// Open registration. The new account is whatever the caller posts,
/// including `is_admin`.
#[instrument(skip(state, user))]
async fn sign_up(
	State(state): State<AppState>,
	Json(user): Json<User>,
) -> Result<(StatusCode, Json<serde_json::Value>), ErrorType> {
	let mut transaction = state.database.begin().await.map_err(db::classify_error)?;

	let user = service::user::create_user(&mut transaction, user, &state.config).await?;

	transaction.commit().await.map_err(db::classify_error)?;

	info!("Registered user {} ({})", user.user_id, user.username);
	Ok((
		StatusCode::CREATED,
		Json(json!({
			"message": "User created successfully",
			"user": user,
		})),
	))
}

/// Exchanges a refresh token for a new token pair. The user is looked
/// up fresh so a renewed pair reflects their current record.
#[instrument(skip_all)]
async fn renew(
	State(state): State<AppState>,
	parts: Parts,
) -> Result<Json<SignInResponse>, ErrorType> {
	let token = principal::bearer_token(&parts)?;
	let claims = AccessTokenData::parse(&token, &state.config.jwt_secret)?;
	if claims.typ != constants::REFRESH_TOKEN_TYPE {
		return Err(ErrorType::MalformedToken);
	}

	let mut connection = state
		.database
		.acquire()
		.await
		.map_err(db::classify_error)?;
	let user = service::user::get_user_by_id(&mut connection, claims.user_id, None, false).await?;

	let (access_token, refresh_token) =
		service::auth::generate_token_pair(&user, &state.config)?;

	debug!("Renewed token pair for user {}", user.user_id);
	Ok(Json(SignInResponse {
		access_token,
		refresh_token,
		token_type: "bearer".to_string(),
		user,
	}))
}
