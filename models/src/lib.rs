#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Shared API model types for the roadcover backend: the error
//! taxonomy, entity DTOs and the request/response payloads exchanged
//! with the HTTP layer.

pub mod api;

mod error;

pub use self::error::*;

/// Commonly used types, for glob-importing in the server crate
pub mod prelude {
	pub use crate::{
		api::{
			extra::OptionalExtra,
			policy::{CarInsurancePolicy, PolicyRequest, PolicyWithExtras},
			user::User,
		},
		ErrorType,
	};
}
