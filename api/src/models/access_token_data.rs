use jsonwebtoken::{
	errors::ErrorKind,
	DecodingKey,
	EncodingKey,
	TokenData,
	Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::prelude::*;

/// The claims carried by our HS256 tokens. Only `user_id` is trusted
/// from here; the admin flag is looked up fresh on every request.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenData {
	pub iss: String,
	/// `accessToken` or `refreshToken`; endpoints only accept their
	/// own kind
	pub typ: String,
	pub iat: i64,
	pub exp: i64,
	pub user_id: i32,
	pub username: String,
}

impl AccessTokenData {
	/// Mints claims for the given user, valid from now for `validity`.
	pub fn new(user_id: i32, username: &str, typ: &str, validity: Duration) -> Self {
		let now = OffsetDateTime::now_utc();
		AccessTokenData {
			iss: String::from(constants::JWT_ISSUER),
			typ: typ.to_string(),
			iat: now.unix_timestamp(),
			exp: (now + validity).unix_timestamp(),
			user_id,
			username: username.to_string(),
		}
	}

	/// Decodes and verifies a token, classifying failures into the
	/// expired/malformed pair the API exposes.
	pub fn parse(token: &str, key: &str) -> Result<AccessTokenData, ErrorType> {
		let decode_key = DecodingKey::from_secret(key.as_ref());
		let mut validation = Validation::default();
		validation.set_issuer(&[constants::JWT_ISSUER]);

		let TokenData { header: _, claims } =
			jsonwebtoken::decode(token, &decode_key, &validation).map_err(|error| {
				match error.kind() {
					ErrorKind::ExpiredSignature => ErrorType::TokenExpired,
					_ => ErrorType::MalformedToken,
				}
			})?;
		Ok(claims)
	}

	/// Signs these claims into their string form.
	pub fn to_signed_string(&self, key: &str) -> Result<String, ErrorType> {
		jsonwebtoken::encode(
			&Default::default(),
			&self,
			&EncodingKey::from_secret(key.as_ref()),
		)
		.map_err(|error| ErrorType::server_error(error))
	}
}

#[cfg(test)]
mod tests {
	use time::Duration;

	use super::AccessTokenData;
	use crate::prelude::*;

	const KEY: &str = "test-signing-key";

	#[test]
	fn round_trips_through_signing() {
		let claims = AccessTokenData::new(
			7,
			"jsmith",
			constants::ACCESS_TOKEN_TYPE,
			constants::ACCESS_TOKEN_VALIDITY,
		);
		let token = claims.to_signed_string(KEY).unwrap();
		let parsed = AccessTokenData::parse(&token, KEY).unwrap();
		assert_eq!(parsed, claims);
	}

	#[test]
	fn expired_tokens_are_classified_as_expired() {
		let claims = AccessTokenData::new(
			7,
			"jsmith",
			constants::ACCESS_TOKEN_TYPE,
			Duration::minutes(-5),
		);
		let token = claims.to_signed_string(KEY).unwrap();
		assert_eq!(
			AccessTokenData::parse(&token, KEY).unwrap_err(),
			ErrorType::TokenExpired
		);
	}

	#[test]
	fn tampered_tokens_are_classified_as_malformed() {
		let claims = AccessTokenData::new(
			7,
			"jsmith",
			constants::ACCESS_TOKEN_TYPE,
			constants::ACCESS_TOKEN_VALIDITY,
		);
		let token = claims.to_signed_string(KEY).unwrap();
		assert_eq!(
			AccessTokenData::parse(&token, "a-different-key").unwrap_err(),
			ErrorType::MalformedToken
		);
		assert_eq!(
			AccessTokenData::parse("not-a-token", KEY).unwrap_err(),
			ErrorType::MalformedToken
		);
	}
}
