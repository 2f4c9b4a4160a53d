use models::api::user::{UpdatePasswordRequest, UserFilterField};
use sqlx::PgConnection;

use super::{auth, rbac};
use crate::{db, prelude::*, utils::validator};

/// Field-shape validation, checked in a fixed order so the first bad
/// field names the error.
pub fn validate_user(user: &User) -> Result<(), ErrorType> {
	if !validator::is_username_valid(&user.username) {
		return Err(ErrorType::InvalidFieldValue {
			field: "username",
			reason: "must be alphanumeric, start with a letter, \
				and be 4 to 20 characters long",
		});
	}
	if let Some(password) = user.password.as_deref() {
		if !password.is_empty() && !validator::is_password_digest_valid(password) {
			return Err(ErrorType::InvalidFieldValue {
				field: "password",
				reason: "must be a 32-character hexadecimal string",
			});
		}
	}
	if !validator::is_email_valid(&user.email) {
		return Err(ErrorType::InvalidFieldValue {
			field: "email",
			reason: "must be at most 32 characters, in format: name@example.com",
		});
	}
	Ok(())
}

/// Loads a user by id. When a requesting principal is supplied the
/// self-or-admin rule applies; the password hash is dropped unless the
/// caller explicitly asks to keep it (it never leaves the backend
/// either way).
pub async fn get_user_by_id(
	connection: &mut PgConnection,
	user_id: i32,
	requesting: Option<&Principal>,
	want_password: bool,
) -> Result<User, ErrorType> {
	if let Some(principal) = requesting {
		rbac::require_self_or_admin(principal, user_id)?;
	}

	let row = db::get_user_by_id(connection, user_id)
		.await?
		.ok_or(ErrorType::UserNotFound)?;

	let mut user = User {
		user_id: row.id,
		username: row.username,
		password: Some(row.password),
		email: row.email,
		is_admin: row.is_admin,
	};
	if !want_password {
		user.password = None;
	}
	Ok(user)
}

/// Validates and inserts a new user, hashing the supplied digest
/// before storage. The returned user is password-stripped.
pub async fn create_user(
	connection: &mut PgConnection,
	mut user: User,
	config: &AppConfig,
) -> Result<User, ErrorType> {
	validate_user(&user)?;

	let digest = user.password.as_deref().unwrap_or_default();
	let stored = auth::hash_password(digest, &config.password_pepper)?;

	user.user_id = db::create_user(
		connection,
		&user.username,
		&stored,
		&user.email,
		user.is_admin,
	)
	.await?;
	user.password = None;
	Ok(user)
}

/// Updates username/email/is_admin. Fails [`ErrorType::NoChangesDetected`]
/// when all three match the stored row; the password column is never
/// touched here.
pub async fn update_user(
	connection: &mut PgConnection,
	principal: &Principal,
	updated: User,
) -> Result<User, ErrorType> {
	rbac::require_self_or_admin(principal, updated.user_id)?;
	validate_user(&updated)?;

	let existing = get_user_by_id(connection, updated.user_id, None, true).await?;

	let unchanged = existing.username == updated.username &&
		existing.email == updated.email &&
		existing.is_admin == updated.is_admin;
	if unchanged {
		return Err(ErrorType::NoChangesDetected);
	}

	db::update_user(
		connection,
		updated.user_id,
		&updated.username,
		&updated.email,
		updated.is_admin,
	)
	.await?;

	Ok(User {
		password: None,
		..updated
	})
}

/// The dedicated password-change path. An empty `existing_password`
/// is the admin bypass sentinel; everyone else must verify against
/// the stored hash, and setting the same password again is a no-op
/// error.
pub async fn update_user_password(
	connection: &mut PgConnection,
	principal: &Principal,
	payload: &UpdatePasswordRequest,
	config: &AppConfig,
) -> Result<(), ErrorType> {
	rbac::require_self_or_admin(principal, payload.user_id)?;

	let target = get_user_by_id(connection, payload.user_id, None, true).await?;
	let stored_hash = target.password.clone().unwrap_or_default();

	// Shape-check the new digest against the same rules as creation
	validate_user(&User {
		password: Some(payload.new_password.clone()),
		..target
	})?;

	if payload.existing_password.is_empty() {
		if !principal.is_admin {
			return Err(ErrorType::Unauthorized);
		}
	} else {
		let verified = auth::validate_hash(
			&payload.existing_password,
			&stored_hash,
			&config.password_pepper,
		)?;
		if !verified {
			return Err(ErrorType::InvalidCredentials);
		}
		let same_as_old = auth::validate_hash(
			&payload.new_password,
			&stored_hash,
			&config.password_pepper,
		)?;
		if same_as_old {
			return Err(ErrorType::NoChangesDetected);
		}
	}

	let new_hash = auth::hash_password(&payload.new_password, &config.password_pepper)?;
	db::update_user_password(connection, payload.user_id, &new_hash).await
}

/// Admin-only delete; missing rows fail [`ErrorType::UserNotFound`].
pub async fn delete_user(
	connection: &mut PgConnection,
	principal: &Principal,
	user_id: i32,
) -> Result<(), ErrorType> {
	rbac::require_admin(principal)?;

	get_user_by_id(connection, user_id, None, false).await?;
	db::delete_user(connection, user_id).await
}

/// Admin-only list of every user, password-stripped. An empty
/// directory reads as not-found.
pub async fn list_all_users(
	connection: &mut PgConnection,
	principal: &Principal,
) -> Result<Vec<User>, ErrorType> {
	rbac::require_admin(principal)?;

	let users = db::list_users(connection).await?;
	error_if_empty(&users)?;
	Ok(users.into_iter().map(db::UserRow::into_stripped).collect())
}

/// Admin-only equality filter over the closed field set.
pub async fn filter_users(
	connection: &mut PgConnection,
	principal: &Principal,
	field: UserFilterField,
	value: &str,
) -> Result<Vec<User>, ErrorType> {
	rbac::require_admin(principal)?;

	let users = db::filter_users(connection, field, value).await?;
	error_if_empty(&users)?;
	Ok(users.into_iter().map(db::UserRow::into_stripped).collect())
}

fn error_if_empty(users: &[db::UserRow]) -> Result<(), ErrorType> {
	if users.is_empty() {
		return Err(ErrorType::UserNotFound);
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::validate_user;
	use crate::prelude::*;

	fn valid_user() -> User {
		User {
			user_id: 0,
			username: "jsmith".to_string(),
			password: Some("5f4dcc3b5aa765d61d8327deb882cf99".to_string()),
			email: "j.smith@example.com".to_string(),
			is_admin: false,
		}
	}

	#[test]
	fn accepts_a_valid_user() {
		assert!(validate_user(&valid_user()).is_ok());
	}

	#[test]
	fn empty_password_is_allowed_and_bad_digests_are_not() {
		let mut user = valid_user();
		user.password = Some(String::new());
		assert!(validate_user(&user).is_ok());

		user.password = Some("hunter2".to_string());
		assert!(matches!(
			validate_user(&user).unwrap_err(),
			ErrorType::InvalidFieldValue {
				field: "password",
				..
			}
		));
	}

	#[test]
	fn first_bad_field_names_the_error() {
		let mut user = valid_user();
		user.username = "x".to_string();
		user.email = "not-an-email".to_string();
		// Username is checked before email
		assert!(matches!(
			validate_user(&user).unwrap_err(),
			ErrorType::InvalidFieldValue {
				field: "username",
				..
			}
		));
	}
}
