//! The HTTP surface of the server. Each submodule owns one resource
//! and exposes a `setup_routes` that builds its router with the shared
//! application state baked in.

use axum::Router;
use serde::{de::DeserializeOwned, Deserialize};

use crate::prelude::*;

mod auth;
mod optional_extra;
mod policy;
mod user;

/// Builds the full route tree.
#[instrument(skip(state))]
pub async fn setup_routes(state: &AppState) -> Router {
	Router::new()
		.nest("/auth", auth::setup_routes(state).await)
		.nest("/users", user::setup_routes(state).await)
		.nest("/extras", optional_extra::setup_routes(state).await)
		.nest("/policies", policy::setup_routes(state).await)
}

/// The `?field=&value=` pair for equality-filtered list endpoints.
/// Both are optional; supplying one without the other is an error.
#[derive(Debug, Deserialize)]
pub struct FilterQuery {
	pub field: Option<String>,
	pub value: Option<String>,
}

impl FilterQuery {
	/// Resolves the query into a parsed filter field and its value,
	/// or `None` when no filter was asked for.
	pub fn into_filter<T>(self) -> Result<Option<(T, String)>, ErrorType>
	where
		T: DeserializeOwned,
	{
		match (self.field, self.value) {
			(None, None) => Ok(None),
			(Some(field), Some(value)) => {
				let parsed = serde_json::from_value(serde_json::Value::String(field.clone()))
					.map_err(|_| ErrorType::InvalidFilterField(field))?;
				Ok(Some((parsed, value)))
			}
			(Some(_), None) => Err(ErrorType::InvalidFieldValue {
				field: "value",
				reason: "is required when filtering",
			}),
			(None, Some(_)) => Err(ErrorType::InvalidFieldValue {
				field: "field",
				reason: "is required when filtering",
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use models::api::user::UserFilterField;

	use super::FilterQuery;
	use crate::prelude::*;

	#[test]
	fn no_query_means_no_filter() {
		let query = FilterQuery {
			field: None,
			value: None,
		};
		assert!(matches!(query.into_filter::<UserFilterField>(), Ok(None)));
	}

	#[test]
	fn known_fields_parse_with_their_value() {
		let query = FilterQuery {
			field: Some("is_admin".to_string()),
			value: Some("true".to_string()),
		};
		let (field, value) = query
			.into_filter::<UserFilterField>()
			.unwrap()
			.unwrap();
		assert_eq!(field, UserFilterField::IsAdmin);
		assert_eq!(value, "true");
	}

	#[test]
	fn unknown_fields_are_rejected_by_name() {
		let query = FilterQuery {
			field: Some("password".to_string()),
			value: Some("x".to_string()),
		};
		assert_eq!(
			query.into_filter::<UserFilterField>().unwrap_err(),
			ErrorType::InvalidFilterField("password".to_string())
		);
	}

	#[test]
	fn half_a_filter_is_an_error() {
		let query = FilterQuery {
			field: Some("email".to_string()),
			value: None,
		};
		assert!(query.into_filter::<UserFilterField>().is_err());
	}
}
