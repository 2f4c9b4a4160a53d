//! The single boundary where sqlx errors become [`ErrorType`]s.
//! Nothing above the `db` module ever sees a raw driver error, and no
//! statement is retried.

use sqlx::postgres::PgQueryResult;

use crate::prelude::*;

// SQLSTATE class 22 is "data exception" (bad casts, out of range
// values); 23505 is unique_violation.
const DATA_EXCEPTION_CLASS: &str = "22";
const UNIQUE_VIOLATION: &str = "23505";

/// Classifies a sqlx error into exactly one taxonomy kind.
pub fn classify_error(error: sqlx::Error) -> ErrorType {
	match error {
		sqlx::Error::RowNotFound => ErrorType::RecordNotFound,
		sqlx::Error::Database(db_error) => {
			let classified = db_error.code().as_deref().and_then(classify_code);
			match classified {
				Some(classified) => classified,
				None => ErrorType::server_error(db_error),
			}
		}
		other => ErrorType::InternalServerError(other.into()),
	}
}

fn classify_code(code: &str) -> Option<ErrorType> {
	if code == UNIQUE_VIOLATION {
		Some(ErrorType::DuplicateEntry)
	} else if code.starts_with(DATA_EXCEPTION_CLASS) {
		Some(ErrorType::InvalidType)
	} else {
		None
	}
}

/// An UPDATE or DELETE that affected no rows targeted a record that is
/// not there.
pub fn ensure_rows_affected(result: PgQueryResult) -> Result<u64, ErrorType> {
	let rows = result.rows_affected();
	if rows == 0 {
		return Err(ErrorType::RecordNotFound);
	}
	Ok(rows)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unique_violations_become_duplicate_entry() {
		assert_eq!(classify_code("23505"), Some(ErrorType::DuplicateEntry));
	}

	#[test]
	fn data_exceptions_become_invalid_type() {
		// invalid_text_representation, e.g. 'abc' cast to INTEGER
		assert_eq!(classify_code("22P02"), Some(ErrorType::InvalidType));
		// datetime_field_overflow
		assert_eq!(classify_code("22008"), Some(ErrorType::InvalidType));
	}

	#[test]
	fn anything_else_is_left_to_the_generic_handler() {
		assert_eq!(classify_code("23503"), None);
		assert_eq!(classify_code("42883"), None);
	}

	#[test]
	fn missing_rows_on_read_become_record_not_found() {
		assert_eq!(
			classify_error(sqlx::Error::RowNotFound),
			ErrorType::RecordNotFound
		);
	}
}
