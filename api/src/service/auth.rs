use argon2::{
	password_hash::{rand_core::OsRng, SaltString},
	Algorithm,
	Argon2,
	PasswordHash,
	PasswordHasher,
	PasswordVerifier,
	Version,
};
use sqlx::PgConnection;

use crate::{db, models::access_token_data::AccessTokenData, prelude::*};

fn hasher(pepper: &str) -> Result<Argon2<'_>, ErrorType> {
	Argon2::new_with_secret(
		pepper.as_bytes(),
		Algorithm::Argon2id,
		Version::V0x13,
		constants::HASHING_PARAMS,
	)
	.map_err(|error| ErrorType::server_error(error))
}

/// Hashes a client-supplied password digest for storage. An empty
/// digest is stored as-is: such accounts exist but cannot sign in.
pub fn hash_password(digest: &str, pepper: &str) -> Result<String, ErrorType> {
	if digest.is_empty() {
		return Ok(String::new());
	}
	let salt = SaltString::generate(&mut OsRng);
	Ok(hasher(pepper)?
		.hash_password(digest.as_bytes(), &salt)
		.map_err(|error| ErrorType::server_error(error))?
		.to_string())
}

/// Verifies a client-supplied digest against a stored hash.
pub fn validate_hash(digest: &str, hash: &str, pepper: &str) -> Result<bool, ErrorType> {
	if hash.is_empty() {
		return Ok(false);
	}
	let parsed = PasswordHash::new(hash).map_err(|error| ErrorType::server_error(error))?;
	Ok(hasher(pepper)?
		.verify_password(digest.as_bytes(), &parsed)
		.is_ok())
}

/// Resolves credentials to a password-stripped user, or
/// [`ErrorType::InvalidCredentials`]. The same error covers unknown
/// usernames and wrong passwords.
pub async fn authenticate_user(
	connection: &mut PgConnection,
	username: &str,
	password: &str,
	config: &AppConfig,
) -> Result<User, ErrorType> {
	let Some(user) = db::get_user_by_username(connection, username).await? else {
		debug!("Invalid credentials");
		return Err(ErrorType::InvalidCredentials);
	};

	if !validate_hash(password, &user.password, &config.password_pepper)? {
		debug!("Invalid credentials");
		return Err(ErrorType::InvalidCredentials);
	}

	Ok(user.into_stripped())
}

/// Mints the access + refresh token pair for a signed-in user.
pub fn generate_token_pair(
	user: &User,
	config: &AppConfig,
) -> Result<(String, String), ErrorType> {
	let access_token = AccessTokenData::new(
		user.user_id,
		&user.username,
		constants::ACCESS_TOKEN_TYPE,
		constants::ACCESS_TOKEN_VALIDITY,
	)
	.to_signed_string(&config.jwt_secret)?;
	let refresh_token = AccessTokenData::new(
		user.user_id,
		&user.username,
		constants::REFRESH_TOKEN_TYPE,
		constants::REFRESH_TOKEN_VALIDITY,
	)
	.to_signed_string(&config.jwt_secret)?;

	Ok((access_token, refresh_token))
}

#[cfg(test)]
mod tests {
	use super::{hash_password, validate_hash};

	const PEPPER: &str = "test-pepper";
	const DIGEST: &str = "5f4dcc3b5aa765d61d8327deb882cf99";

	#[test]
	fn hashing_round_trips() {
		let hash = hash_password(DIGEST, PEPPER).unwrap();
		assert_ne!(hash, DIGEST);
		assert!(validate_hash(DIGEST, &hash, PEPPER).unwrap());
		assert!(!validate_hash("0f4dcc3b5aa765d61d8327deb882cf99", &hash, PEPPER).unwrap());
	}

	#[test]
	fn empty_stored_hash_never_verifies() {
		assert_eq!(hash_password("", PEPPER).unwrap(), "");
		assert!(!validate_hash(DIGEST, "", PEPPER).unwrap());
		assert!(!validate_hash("", "", PEPPER).unwrap());
	}
}
