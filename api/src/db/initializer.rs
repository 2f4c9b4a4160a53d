use sqlx::{Pool, Postgres};

use crate::prelude::*;

/// Creates the schema if it does not exist yet. Uniqueness of
/// usernames and emails lives here, surfaced to callers as
/// [`ErrorType::DuplicateEntry`]. The link table deliberately has no
/// ON DELETE CASCADE; the service layer removes link rows explicitly
/// before deleting either parent.
#[instrument(skip(pool))]
pub async fn initialize(pool: &Pool<Postgres>) -> Result<(), ErrorType> {
	let mut connection = pool.acquire().await.map_err(super::classify_error)?;

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS "user"(
			id SERIAL CONSTRAINT user_pk PRIMARY KEY,
			username VARCHAR(20) NOT NULL
				CONSTRAINT user_uq_username UNIQUE,
			password TEXT NOT NULL,
			email VARCHAR(32) NOT NULL
				CONSTRAINT user_uq_email UNIQUE,
			is_admin BOOLEAN NOT NULL
		);
		"#,
	)
	.execute(&mut *connection)
	.await
	.map_err(super::classify_error)?;

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS car_insurance_policy(
			id SERIAL CONSTRAINT car_insurance_policy_pk PRIMARY KEY,
			user_id INTEGER NOT NULL
				CONSTRAINT car_insurance_policy_fk_user_id
					REFERENCES "user"(id),
			vrn VARCHAR(10) NOT NULL,
			make VARCHAR(20) NOT NULL,
			model VARCHAR(20) NOT NULL,
			policy_number VARCHAR(20) NOT NULL,
			start_date DATE NOT NULL,
			end_date DATE NOT NULL,
			coverage VARCHAR(30) NOT NULL,
			CONSTRAINT car_insurance_policy_chk_dates_ordered
				CHECK(start_date <= end_date)
		);
		"#,
	)
	.execute(&mut *connection)
	.await
	.map_err(super::classify_error)?;

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS optional_extra(
			id SERIAL CONSTRAINT optional_extra_pk PRIMARY KEY,
			name VARCHAR(32) NOT NULL,
			code VARCHAR(10) NOT NULL,
			price DOUBLE PRECISION NOT NULL
				CONSTRAINT optional_extra_chk_price_positive
					CHECK(price > 0)
		);
		"#,
	)
	.execute(&mut *connection)
	.await
	.map_err(super::classify_error)?;

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS policy_optional_extra(
			policy_id INTEGER NOT NULL
				CONSTRAINT policy_optional_extra_fk_policy_id
					REFERENCES car_insurance_policy(id),
			extra_id INTEGER NOT NULL
				CONSTRAINT policy_optional_extra_fk_extra_id
					REFERENCES optional_extra(id),
			CONSTRAINT policy_optional_extra_pk
				PRIMARY KEY(policy_id, extra_id)
		);
		"#,
	)
	.execute(&mut *connection)
	.await
	.map_err(super::classify_error)?;

	Ok(())
}
