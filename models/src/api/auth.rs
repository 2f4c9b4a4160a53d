use serde::{Deserialize, Serialize};

use super::user::User;

/// Body of `POST /auth/sign-in`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignInRequest {
	/// The username to authenticate as
	pub username: String,
	/// The password digest for that account
	pub password: String,
}

/// Returned by sign-in and token renewal: a fresh token pair plus the
/// resolved (password-stripped) user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignInResponse {
	/// Short-lived bearer token for API calls
	pub access_token: String,
	/// Longer-lived token accepted only by `POST /auth/renew`
	pub refresh_token: String,
	/// Always `"bearer"`
	pub token_type: String,
	/// The authenticated user, password stripped
	pub user: User,
}

#[cfg(test)]
mod tests {
	use serde_test::{assert_tokens, Token};

	use super::SignInRequest;

	#[test]
	fn sign_in_request_shape() {
		assert_tokens(
			&SignInRequest {
				username: "jsmith".to_string(),
				password: "5f4dcc3b5aa765d61d8327deb882cf99".to_string(),
			},
			&[
				Token::Struct {
					name: "SignInRequest",
					len: 2,
				},
				Token::Str("username"),
				Token::Str("jsmith"),
				Token::Str("password"),
				Token::Str("5f4dcc3b5aa765d61d8327deb882cf99"),
				Token::StructEnd,
			],
		);
	}
}
