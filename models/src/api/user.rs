use serde::{Deserialize, Serialize};

/// A user of the system. The same shape is used for registration,
/// admin creation, updates and reads; `user_id` is 0 until the row
/// exists and the `password` field is stripped before any record
/// leaves the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
	/// Surrogate key. 0 (or absent) means "not yet created"
	#[serde(default)]
	pub user_id: i32,
	/// 4-20 characters, alphanumeric, starts with a letter. Unique
	pub username: String,
	/// Empty, or exactly a 32-character hex digest. Never serialized
	/// when `None`
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub password: Option<String>,
	/// At most 32 characters, `local@domain.tld` shape. Unique
	pub email: String,
	/// Whether the user may administer other users' records
	pub is_admin: bool,
}

/// Body of `PATCH /users/{id}/password`. An empty `existing_password`
/// is the admin-bypass sentinel; everyone else must prove they know
/// the current password.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdatePasswordRequest {
	/// The user whose password is being changed
	pub user_id: i32,
	/// The current password digest, or empty for the admin bypass
	pub existing_password: String,
	/// The new password digest
	pub new_password: String,
}

/// The closed set of columns a filtered user read may match on.
/// Anything else fails with `invalidFilterField` before a statement is
/// issued.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserFilterField {
	/// Filter by the surrogate key
	UserId,
	/// Filter by username
	Username,
	/// Filter by email
	Email,
	/// Filter by the admin flag
	IsAdmin,
}

impl UserFilterField {
	/// The column name to use in the filter statement
	pub fn as_column(self) -> &'static str {
		match self {
			Self::UserId => "id",
			Self::Username => "username",
			Self::Email => "email",
			Self::IsAdmin => "is_admin",
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_test::{assert_tokens, Token};

	use super::User;

	#[test]
	fn stripped_password_is_not_serialized() {
		assert_tokens(
			&User {
				user_id: 7,
				username: "jsmith".to_string(),
				password: None,
				email: "j.smith@example.com".to_string(),
				is_admin: false,
			},
			&[
				Token::Struct {
					name: "User",
					len: 4,
				},
				Token::Str("user_id"),
				Token::I32(7),
				Token::Str("username"),
				Token::Str("jsmith"),
				Token::Str("email"),
				Token::Str("j.smith@example.com"),
				Token::Str("is_admin"),
				Token::Bool(false),
				Token::StructEnd,
			],
		);
	}

	#[test]
	fn user_id_defaults_to_not_yet_created() {
		let user: User = serde_json::from_str(
			r#"{"username": "jsmith", "email": "j@example.com", "is_admin": false}"#,
		)
		.unwrap();
		assert_eq!(user.user_id, 0);
		assert_eq!(user.password, None);
	}
}
