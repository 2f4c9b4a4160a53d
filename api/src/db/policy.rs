use models::api::policy::PolicyFilterField;
use sqlx::PgConnection;
use time::Date;

use super::{classify_error, ensure_rows_affected};
use crate::prelude::*;

/// A `car_insurance_policy` row as stored.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PolicyRow {
	pub id: i32,
	pub user_id: i32,
	pub vrn: String,
	pub make: String,
	pub model: String,
	pub policy_number: String,
	pub start_date: Date,
	pub end_date: Date,
	pub coverage: String,
}

impl From<PolicyRow> for CarInsurancePolicy {
	fn from(row: PolicyRow) -> Self {
		CarInsurancePolicy {
			ci_policy_id: Some(row.id),
			user_id: row.user_id,
			vrn: row.vrn,
			make: row.make,
			model: row.model,
			policy_number: row.policy_number,
			start_date: row.start_date,
			end_date: row.end_date,
			coverage: row.coverage,
		}
	}
}

pub async fn create_policy(
	connection: &mut PgConnection,
	policy: &CarInsurancePolicy,
) -> Result<i32, ErrorType> {
	debug!("Executing statement: INSERT INTO car_insurance_policy");
	let (id,): (i32,) = sqlx::query_as(
		r#"
		INSERT INTO
			car_insurance_policy(
				user_id,
				vrn,
				make,
				model,
				policy_number,
				start_date,
				end_date,
				coverage
			)
		VALUES
			($1, $2, $3, $4, $5, $6, $7, $8)
		RETURNING id;
		"#,
	)
	.bind(policy.user_id)
	.bind(&policy.vrn)
	.bind(&policy.make)
	.bind(&policy.model)
	.bind(&policy.policy_number)
	.bind(policy.start_date)
	.bind(policy.end_date)
	.bind(&policy.coverage)
	.fetch_one(&mut *connection)
	.await
	.map_err(classify_error)?;

	Ok(id)
}

pub async fn get_policy_by_id(
	connection: &mut PgConnection,
	policy_id: i32,
) -> Result<Option<PolicyRow>, ErrorType> {
	debug!("Executing statement: SELECT FROM car_insurance_policy by id");
	sqlx::query_as(
		r#"
		SELECT
			id,
			user_id,
			vrn,
			make,
			model,
			policy_number,
			start_date,
			end_date,
			coverage
		FROM
			car_insurance_policy
		WHERE
			id = $1;
		"#,
	)
	.bind(policy_id)
	.fetch_optional(&mut *connection)
	.await
	.map_err(classify_error)
}

pub async fn update_policy(
	connection: &mut PgConnection,
	policy_id: i32,
	policy: &CarInsurancePolicy,
) -> Result<(), ErrorType> {
	debug!("Executing statement: UPDATE car_insurance_policy");
	let result = sqlx::query(
		r#"
		UPDATE
			car_insurance_policy
		SET
			user_id = $1,
			vrn = $2,
			make = $3,
			model = $4,
			policy_number = $5,
			start_date = $6,
			end_date = $7,
			coverage = $8
		WHERE
			id = $9;
		"#,
	)
	.bind(policy.user_id)
	.bind(&policy.vrn)
	.bind(&policy.make)
	.bind(&policy.model)
	.bind(&policy.policy_number)
	.bind(policy.start_date)
	.bind(policy.end_date)
	.bind(&policy.coverage)
	.bind(policy_id)
	.execute(&mut *connection)
	.await
	.map_err(classify_error)?;

	ensure_rows_affected(result)?;
	Ok(())
}

pub async fn delete_policy(
	connection: &mut PgConnection,
	policy_id: i32,
) -> Result<(), ErrorType> {
	debug!("Executing statement: DELETE FROM car_insurance_policy");
	let result = sqlx::query(
		r#"
		DELETE FROM
			car_insurance_policy
		WHERE
			id = $1;
		"#,
	)
	.bind(policy_id)
	.execute(&mut *connection)
	.await
	.map_err(classify_error)?;

	ensure_rows_affected(result)?;
	Ok(())
}

pub async fn list_policies(
	connection: &mut PgConnection,
) -> Result<Vec<PolicyRow>, ErrorType> {
	debug!("Executing statement: SELECT FROM car_insurance_policy");
	sqlx::query_as(
		r#"
		SELECT
			id,
			user_id,
			vrn,
			make,
			model,
			policy_number,
			start_date,
			end_date,
			coverage
		FROM
			car_insurance_policy
		ORDER BY
			id;
		"#,
	)
	.fetch_all(&mut *connection)
	.await
	.map_err(classify_error)
}

pub async fn list_policies_by_user(
	connection: &mut PgConnection,
	user_id: i32,
) -> Result<Vec<PolicyRow>, ErrorType> {
	debug!("Executing statement: SELECT FROM car_insurance_policy by user");
	sqlx::query_as(
		r#"
		SELECT
			id,
			user_id,
			vrn,
			make,
			model,
			policy_number,
			start_date,
			end_date,
			coverage
		FROM
			car_insurance_policy
		WHERE
			user_id = $1
		ORDER BY
			id;
		"#,
	)
	.bind(user_id)
	.fetch_all(&mut *connection)
	.await
	.map_err(classify_error)
}

/// Equality filter over the closed set of filterable columns; text
/// values are cast to the column type inside the statement (bad casts
/// surface as [`ErrorType::InvalidType`]).
pub async fn filter_policies(
	connection: &mut PgConnection,
	field: PolicyFilterField,
	value: &str,
) -> Result<Vec<PolicyRow>, ErrorType> {
	let placeholder = match field {
		PolicyFilterField::CiPolicyId | PolicyFilterField::UserId => "$1::INTEGER",
		PolicyFilterField::StartDate | PolicyFilterField::EndDate => "$1::DATE",
		_ => "$1",
	};
	debug!(
		"Executing statement: SELECT FROM car_insurance_policy filtered by {}",
		field.as_column()
	);
	sqlx::query_as(&format!(
		r#"
		SELECT
			id,
			user_id,
			vrn,
			make,
			model,
			policy_number,
			start_date,
			end_date,
			coverage
		FROM
			car_insurance_policy
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

/// Whether the given user owns the given policy, as a row probe.
pub async fn user_owns_policy(
	connection: &mut PgConnection,
	user_id: i32,
	policy_id: i32,
) -> Result<bool, ErrorType> {
	debug!("Executing statement: SELECT FROM car_insurance_policy ownership");
	let row: Option<(i32,)> = sqlx::query_as(
		r#"
		SELECT
			1
		FROM
			car_insurance_policy
		WHERE
			user_id = $1 AND
			id = $2;
		"#,
	)
	.bind(user_id)
	.bind(policy_id)
	.fetch_optional(&mut *connection)
	.await
	.map_err(classify_error)?;

	Ok(row.is_some())
}

/// The catalog records currently linked to a policy.
pub async fn get_policy_extras(
	connection: &mut PgConnection,
	policy_id: i32,
) -> Result<Vec<super::OptionalExtraRow>, ErrorType> {
	debug!("Executing statement: SELECT FROM policy_optional_extra by policy");
	sqlx::query_as(
		r#"
		SELECT
			oe.id, oe.name, oe.code, oe.price
		FROM
			policy_optional_extra poe
		JOIN
			optional_extra oe
		ON
			poe.extra_id = oe.id
		WHERE
			poe.policy_id = $1
		ORDER BY
			oe.id;
		"#,
	)
	.bind(policy_id)
	.fetch_all(&mut *connection)
	.await
	.map_err(classify_error)
}

/// Bulk-inserts link rows for the given extras.
pub async fn add_policy_extras(
	connection: &mut PgConnection,
	policy_id: i32,
	extra_ids: &[i32],
) -> Result<(), ErrorType> {
	debug!("Executing statement: INSERT INTO policy_optional_extra");
	sqlx::query(
		r#"
		INSERT INTO
			policy_optional_extra(policy_id, extra_id)
		SELECT
			$1, extra_id
		FROM
			UNNEST($2::INTEGER[]) AS extra_id;
		"#,
	)
	.bind(policy_id)
	.bind(extra_ids)
	.execute(&mut *connection)
	.await
	.map_err(classify_error)?;

	Ok(())
}

/// Bulk-deletes link rows for the given extras.
pub async fn remove_policy_extras(
	connection: &mut PgConnection,
	policy_id: i32,
	extra_ids: &[i32],
) -> Result<(), ErrorType> {
	debug!("Executing statement: DELETE FROM policy_optional_extra");
	sqlx::query(
		r#"
		DELETE FROM
			policy_optional_extra
		WHERE
			policy_id = $1 AND
			extra_id = ANY($2);
		"#,
	)
	.bind(policy_id)
	.bind(extra_ids)
	.execute(&mut *connection)
	.await
	.map_err(classify_error)?;

	Ok(())
}
