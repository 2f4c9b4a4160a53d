use std::{error::Error as StdError, fmt::Display, mem};

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::Serialize;
use serde_json::json;

/// A list of all the possible errors that can be returned by the API.
/// Every failure an operation can surface is one of these variants;
/// raw driver errors never cross this boundary.
#[derive(Debug)]
pub enum ErrorType {
	/// A field in the request payload has an invalid value or shape
	InvalidFieldValue {
		/// The offending field, as named in the API payload
		field: &'static str,
		/// What the field must look like instead
		reason: &'static str,
	},
	/// The `field` query parameter of a filtered read is not a
	/// filterable column
	InvalidFilterField(String),
	/// One or more optional extras supplied with a policy do not match
	/// any catalog record
	OptionalExtrasNotFound(Vec<i32>),
	/// An update payload is identical to the stored record
	NoChangesDetected,
	/// The database rejected a value because of its type
	InvalidType,
	/// The username and password combination is wrong
	InvalidCredentials,
	/// The bearer token is not a well-formed token of ours
	MalformedToken,
	/// The bearer token is valid but past its expiry
	TokenExpired,
	/// The request carries no `Authorization` header
	AuthorizationHeaderMissing,
	/// The caller is authenticated but not allowed to perform the
	/// requested action
	Unauthorized,
	/// No user exists with the given id
	UserNotFound,
	/// No policy exists with the given id
	PolicyNotFound,
	/// No optional extra exists with the given id
	OptionalExtraNotFound,
	/// A write statement affected no rows
	RecordNotFound,
	/// A unique constraint (username, email) was violated
	DuplicateEntry,
	/// An internal server error occurred. This should not happen
	/// unless there is a bug in the server
	InternalServerError(anyhow::Error),
}

impl ErrorType {
	/// Returns the status code that should be used for this error
	pub fn default_status_code(&self) -> StatusCode {
		match self {
			Self::InvalidFieldValue { .. } => StatusCode::BAD_REQUEST,
			Self::InvalidFilterField(_) => StatusCode::BAD_REQUEST,
			Self::OptionalExtrasNotFound(_) => StatusCode::BAD_REQUEST,
			Self::NoChangesDetected => StatusCode::BAD_REQUEST,
			Self::InvalidType => StatusCode::BAD_REQUEST,
			Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
			Self::MalformedToken => StatusCode::UNAUTHORIZED,
			Self::TokenExpired => StatusCode::UNAUTHORIZED,
			Self::AuthorizationHeaderMissing => StatusCode::UNAUTHORIZED,
			Self::Unauthorized => StatusCode::FORBIDDEN,
			Self::UserNotFound => StatusCode::NOT_FOUND,
			Self::PolicyNotFound => StatusCode::NOT_FOUND,
			Self::OptionalExtraNotFound => StatusCode::NOT_FOUND,
			Self::RecordNotFound => StatusCode::NOT_FOUND,
			Self::DuplicateEntry => StatusCode::CONFLICT,
			Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Returns the message that should be used for this error. This is
	/// the user-friendly message shown at the API boundary
	pub fn message(&self) -> String {
		match self {
			Self::InvalidFieldValue { field, reason } => {
				format!("Invalid: {field} {reason}")
			}
			Self::InvalidFilterField(field) => format!("Invalid field: {field}"),
			Self::OptionalExtrasNotFound(ids) => format!(
				"Optional extras with ID(s) {} not found",
				ids.iter()
					.map(|id| id.to_string())
					.collect::<Vec<_>>()
					.join(", ")
			),
			Self::NoChangesDetected => "No changes detected".to_string(),
			Self::InvalidType => "Invalid type for field".to_string(),
			Self::InvalidCredentials => "Invalid username or password".to_string(),
			Self::MalformedToken => "Invalid token".to_string(),
			Self::TokenExpired => "Token has expired".to_string(),
			Self::AuthorizationHeaderMissing => {
				"Authorization header missing or invalid".to_string()
			}
			Self::Unauthorized => {
				"User does not have permission to perform this action".to_string()
			}
			Self::UserNotFound => "User not found".to_string(),
			Self::PolicyNotFound => "Policy not found".to_string(),
			Self::OptionalExtraNotFound => "Optional extra not found".to_string(),
			Self::RecordNotFound => "Record not found".to_string(),
			Self::DuplicateEntry => "Duplicate entry".to_string(),
			Self::InternalServerError(_) => {
				"An error occurred while interacting with the database".to_string()
			}
		}
	}

	/// Creates an [`ErrorType::InternalServerError`] with the given
	/// message
	pub fn server_error(message: impl Display) -> Self {
		Self::InternalServerError(anyhow::anyhow!(message.to_string()))
	}

	/// The camelCase tag this error serializes as
	fn tag(&self) -> &'static str {
		match self {
			Self::InvalidFieldValue { .. } => "invalidFieldValue",
			Self::InvalidFilterField(_) => "invalidFilterField",
			Self::OptionalExtrasNotFound(_) => "optionalExtrasNotFound",
			Self::NoChangesDetected => "noChangesDetected",
			Self::InvalidType => "invalidType",
			Self::InvalidCredentials => "invalidCredentials",
			Self::MalformedToken => "malformedToken",
			Self::TokenExpired => "tokenExpired",
			Self::AuthorizationHeaderMissing => "authorizationHeaderMissing",
			Self::Unauthorized => "unauthorized",
			Self::UserNotFound => "userNotFound",
			Self::PolicyNotFound => "policyNotFound",
			Self::OptionalExtraNotFound => "optionalExtraNotFound",
			Self::RecordNotFound => "recordNotFound",
			Self::DuplicateEntry => "duplicateEntry",
			Self::InternalServerError(_) => "internalServerError",
		}
	}
}

impl PartialEq for ErrorType {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::InternalServerError(_), Self::InternalServerError(_)) => true,
			_ => mem::discriminant(self) == mem::discriminant(other),
		}
	}
}

impl Eq for ErrorType {}

impl<Error> From<Error> for ErrorType
where
	Error: StdError + Send + Sync + 'static,
{
	fn from(error: Error) -> Self {
		Self::InternalServerError(error.into())
	}
}

impl Display for ErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.message())
	}
}

impl Serialize for ErrorType {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(self.tag())
	}
}

impl IntoResponse for ErrorType {
	fn into_response(self) -> Response {
		(
			self.default_status_code(),
			Json(json!({
				"success": false,
				"error": &self,
				"message": self.message(),
			})),
		)
			.into_response()
	}
}

#[cfg(test)]
mod tests {
	use axum::http::StatusCode;

	use super::ErrorType;

	#[test]
	fn status_codes_match_taxonomy() {
		assert_eq!(
			ErrorType::NoChangesDetected.default_status_code(),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			ErrorType::Unauthorized.default_status_code(),
			StatusCode::FORBIDDEN
		);
		assert_eq!(
			ErrorType::PolicyNotFound.default_status_code(),
			StatusCode::NOT_FOUND
		);
		assert_eq!(
			ErrorType::DuplicateEntry.default_status_code(),
			StatusCode::CONFLICT
		);
		assert_eq!(
			ErrorType::OptionalExtrasNotFound(vec![3]).default_status_code(),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			ErrorType::server_error("boom").default_status_code(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}

	#[test]
	fn extras_not_found_lists_offending_ids() {
		let message = ErrorType::OptionalExtrasNotFound(vec![3, 7]).message();
		assert_eq!(message, "Optional extras with ID(s) 3, 7 not found");
	}

	#[test]
	fn equality_ignores_internal_error_payloads() {
		assert_eq!(
			ErrorType::server_error("one"),
			ErrorType::server_error("another")
		);
		assert_ne!(ErrorType::UserNotFound, ErrorType::PolicyNotFound);
	}

	#[test]
	fn serializes_as_camel_case_tag() {
		let tag = serde_json::to_string(&ErrorType::NoChangesDetected).unwrap();
		assert_eq!(tag, "\"noChangesDetected\"");
	}
}
