use sqlx::PgConnection;

use super::{classify_error, ensure_rows_affected};
use crate::prelude::*;

/// An `optional_extra` row as stored.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OptionalExtraRow {
	pub id: i32,
	pub name: String,
	pub code: String,
	pub price: f64,
}

impl From<OptionalExtraRow> for OptionalExtra {
	fn from(row: OptionalExtraRow) -> Self {
		OptionalExtra {
			extra_id: Some(row.id),
			name: row.name,
			code: row.code,
			price: row.price,
		}
	}
}

pub async fn create_optional_extra(
	connection: &mut PgConnection,
	name: &str,
	code: &str,
	price: f64,
) -> Result<i32, ErrorType> {
	debug!("Executing statement: INSERT INTO optional_extra");
	let (id,): (i32,) = sqlx::query_as(
		r#"
		INSERT INTO
			optional_extra(name, code, price)
		VALUES
			($1, $2, $3)
		RETURNING id;
		"#,
	)
	.bind(name)
	.bind(code)
	.bind(price)
	.fetch_one(&mut *connection)
	.await
	.map_err(classify_error)?;

	Ok(id)
}

pub async fn get_optional_extra_by_id(
	connection: &mut PgConnection,
	extra_id: i32,
) -> Result<Option<OptionalExtraRow>, ErrorType> {
	debug!("Executing statement: SELECT FROM optional_extra by id");
	sqlx::query_as(
		r#"
		SELECT
			id, name, code, price
		FROM
			optional_extra
		WHERE
			id = $1;
		"#,
	)
	.bind(extra_id)
	.fetch_optional(&mut *connection)
	.await
	.map_err(classify_error)
}

/// Fetches the catalog records for a set of ids in one statement,
/// used to verify client-supplied extras against what actually
/// exists.
pub async fn get_optional_extras_by_ids(
	connection: &mut PgConnection,
	extra_ids: &[i32],
) -> Result<Vec<OptionalExtraRow>, ErrorType> {
	debug!("Executing statement: SELECT FROM optional_extra by ids");
	sqlx::query_as(
		r#"
		SELECT
			id, name, code, price
		FROM
			optional_extra
		WHERE
			id = ANY($1);
		"#,
	)
	.bind(extra_ids)
	.fetch_all(&mut *connection)
	.await
	.map_err(classify_error)
}

pub async fn list_optional_extras(
	connection: &mut PgConnection,
) -> Result<Vec<OptionalExtraRow>, ErrorType> {
	debug!("Executing statement: SELECT FROM optional_extra");
	sqlx::query_as(
		r#"
		SELECT
			id, name, code, price
		FROM
			optional_extra
		ORDER BY
			id;
		"#,
	)
	.fetch_all(&mut *connection)
	.await
	.map_err(classify_error)
}

pub async fn update_optional_extra(
	connection: &mut PgConnection,
	extra_id: i32,
	name: &str,
	code: &str,
	price: f64,
) -> Result<(), ErrorType> {
	debug!("Executing statement: UPDATE optional_extra");
	let result = sqlx::query(
		r#"
		UPDATE
			optional_extra
		SET
			name = $1,
			code = $2,
			price = $3
		WHERE
			id = $4;
		"#,
	)
	.bind(name)
	.bind(code)
	.bind(price)
	.bind(extra_id)
	.execute(&mut *connection)
	.await
	.map_err(classify_error)?;

	ensure_rows_affected(result)?;
	Ok(())
}

pub async fn delete_optional_extra(
	connection: &mut PgConnection,
	extra_id: i32,
) -> Result<(), ErrorType> {
	debug!("Executing statement: DELETE FROM optional_extra");
	let result = sqlx::query(
		r#"
		DELETE FROM
			optional_extra
		WHERE
			id = $1;
		"#,
	)
	.bind(extra_id)
	.execute(&mut *connection)
	.await
	.map_err(classify_error)?;

	ensure_rows_affected(result)?;
	Ok(())
}

/// Whether any policy still links to this extra.
pub async fn extra_has_policy_links(
	connection: &mut PgConnection,
	extra_id: i32,
) -> Result<bool, ErrorType> {
	debug!("Executing statement: SELECT FROM policy_optional_extra by extra");
	let row: Option<(i32,)> = sqlx::query_as(
		r#"
		SELECT
			1
		FROM
			policy_optional_extra
		WHERE
			extra_id = $1
		LIMIT 1;
		"#,
	)
	.bind(extra_id)
	.fetch_optional(&mut *connection)
	.await
	.map_err(classify_error)?;

	Ok(row.is_some())
}

/// Removes every link row referencing the extra, ahead of deleting
/// the extra itself.
pub async fn remove_links_for_extra(
	connection: &mut PgConnection,
	extra_id: i32,
) -> Result<(), ErrorType> {
	debug!("Executing statement: DELETE FROM policy_optional_extra by extra");
	// Zero affected rows is fine here, the extra may be unlinked
	sqlx::query(
		r#"
		DELETE FROM
			policy_optional_extra
		WHERE
			extra_id = $1;
		"#,
	)
	.bind(extra_id)
	.execute(&mut *connection)
	.await
	.map_err(classify_error)?;

	Ok(())
}
