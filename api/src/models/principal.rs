use axum::{
	async_trait,
	extract::FromRequestParts,
	http::{header::AUTHORIZATION, request::Parts},
};

use super::access_token_data::AccessTokenData;
use crate::{db, prelude::*};

/// The resolved identity of the caller for one request. Built by the
/// extractor below: bearer token → verified claims → fresh user row.
/// The admin flag always comes from that lookup, never from the token
/// itself.
#[derive(Debug, Clone, Copy)]
pub struct Principal {
	pub user_id: i32,
	pub is_admin: bool,
}

#[async_trait]
impl FromRequestParts<AppState> for Principal {
	type Rejection = ErrorType;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let token = bearer_token(parts)?;
		let claims = AccessTokenData::parse(token, &state.config.jwt_secret)?;
		if claims.typ != constants::ACCESS_TOKEN_TYPE {
			return Err(ErrorType::MalformedToken);
		}

		let mut connection = state
			.database
			.acquire()
			.await
			.map_err(db::classify_error)?;
		let user = db::get_user_by_id(&mut connection, claims.user_id)
			.await?
			.ok_or(ErrorType::UserNotFound)?;

		trace!("Token verified for user_id: {}", user.id);
		Ok(Principal {
			user_id: user.id,
			is_admin: user.is_admin,
		})
	}
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(parts: &Parts) -> Result<&str, ErrorType> {
	parts
		.headers
		.get(AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.strip_prefix("Bearer "))
		.ok_or(ErrorType::AuthorizationHeaderMissing)
}
