use models::api::user::UserFilterField;
use sqlx::PgConnection;

use super::{classify_error, ensure_rows_affected};
use crate::prelude::*;

/// A `"user"` row as stored, password hash included. Converted to the
/// wire [`User`] (and usually password-stripped) at the service layer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
	pub id: i32,
	pub username: String,
	pub password: String,
	pub email: String,
	pub is_admin: bool,
}

impl UserRow {
	/// The wire shape of this row, with the password hash dropped
	pub fn into_stripped(self) -> User {
		User {
			user_id: self.id,
			username: self.username,
			password: None,
			email: self.email,
			is_admin: self.is_admin,
		}
	}
}

pub async fn create_user(
	connection: &mut PgConnection,
	username: &str,
	password: &str,
	email: &str,
	is_admin: bool,
) -> Result<i32, ErrorType> {
	debug!("Executing statement: INSERT INTO \"user\"");
	let (id,): (i32,) = sqlx::query_as(
		r#"
		INSERT INTO
			"user"(username, password, email, is_admin)
		VALUES
			($1, $2, $3, $4)
		RETURNING id;
		"#,
	)
	.bind(username)
	.bind(password)
	.bind(email)
	.bind(is_admin)
	.fetch_one(&mut *connection)
	.await
	.map_err(classify_error)?;

	Ok(id)
}

pub async fn get_user_by_id(
	connection: &mut PgConnection,
	user_id: i32,
) -> Result<Option<UserRow>, ErrorType> {
	debug!("Executing statement: SELECT FROM \"user\" by id");
	sqlx::query_as(
		r#"
		SELECT
			id, username, password, email, is_admin
		FROM
			"user"
		WHERE
			id = $1;
		"#,
	)
	.bind(user_id)
	.fetch_optional(&mut *connection)
	.await
	.map_err(classify_error)
}

pub async fn get_user_by_username(
	connection: &mut PgConnection,
	username: &str,
) -> Result<Option<UserRow>, ErrorType> {
	debug!("Executing statement: SELECT FROM \"user\" by username");
	sqlx::query_as(
		r#"
		SELECT
			id, username, password, email, is_admin
		FROM
			"user"
		WHERE
			username = $1;
		"#,
	)
	.bind(username)
	.fetch_optional(&mut *connection)
	.await
	.map_err(classify_error)
}

/// Persists the three mutable profile columns. The password column is
/// only ever touched by [`update_user_password`].
pub async fn update_user(
	connection: &mut PgConnection,
	user_id: i32,
	username: &str,
	email: &str,
	is_admin: bool,
) -> Result<(), ErrorType> {
	debug!("Executing statement: UPDATE \"user\"");
	let result = sqlx::query(
		r#"
		UPDATE
			"user"
		SET
			username = $1,
			email = $2,
			is_admin = $3
		WHERE
			id = $4;
		"#,
	)
	.bind(username)
	.bind(email)
	.bind(is_admin)
	.bind(user_id)
	.execute(&mut *connection)
	.await
	.map_err(classify_error)?;

	ensure_rows_affected(result)?;
	Ok(())
}

pub async fn update_user_password(
	connection: &mut PgConnection,
	user_id: i32,
	password: &str,
) -> Result<(), ErrorType> {
	debug!("Executing statement: UPDATE \"user\" password");
	let result = sqlx::query(
		r#"
		UPDATE
			"user"
		SET
			password = $1
		WHERE
			id = $2;
		"#,
	)
	.bind(password)
	.bind(user_id)
	.execute(&mut *connection)
	.await
	.map_err(classify_error)?;

	ensure_rows_affected(result)?;
	Ok(())
}

pub async fn delete_user(
	connection: &mut PgConnection,
	user_id: i32,
) -> Result<(), ErrorType> {
	debug!("Executing statement: DELETE FROM \"user\"");
	let result = sqlx::query(
		r#"
		DELETE FROM
			"user"
		WHERE
			id = $1;
		"#,
	)
	.bind(user_id)
	.execute(&mut *connection)
	.await
	.map_err(classify_error)?;

	ensure_rows_affected(result)?;
	Ok(())
}

pub async fn list_users(
	connection: &mut PgConnection,
) -> Result<Vec<UserRow>, ErrorType> {
	debug!("Executing statement: SELECT FROM \"user\"");
	sqlx::query_as(
		r#"
		SELECT
			id, username, password, email, is_admin
		FROM
			"user"
		ORDER BY
			id;
		"#,
	)
	.fetch_all(&mut *connection)
	.await
	.map_err(classify_error)
}

/// Equality filter over the closed set of filterable columns. The
/// value arrives as text and is cast to the column's type inside the
/// statement, so a bad cast surfaces as [`ErrorType::InvalidType`].
pub async fn filter_users(
	connection: &mut PgConnection,
	field: UserFilterField,
	value: &str,
) -> Result<Vec<UserRow>, ErrorType> {
	let placeholder = match field {
		UserFilterField::UserId => "$1::INTEGER",
		UserFilterField::IsAdmin => "$1::BOOLEAN",
		UserFilterField::Username | UserFilterField::Email => "$1",
	};
	debug!(
		"Executing statement: SELECT FROM \"user\" filtered by {}",
		field.as_column()
	);
	sqlx::query_as(&format!(
		r#"
		SELECT
			id, username, password, email, is_admin
		FROM
			"user"
		WHERE
			{} = {placeholder}
		ORDER BY
			id;
		"#,
		field.as_column()
	))
	.bind(value)
	.fetch_all(&mut *connection)
	.await
	.map_err(classify_error)
}
