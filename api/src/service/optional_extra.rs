use sqlx::PgConnection;

use super::rbac;
use crate::{db, prelude::*, utils::validator};

/// Field-shape validation for an extras catalog entry, checked in a
/// fixed order so the first bad field names the error.
pub fn validate_optional_extra(extra: &OptionalExtra) -> Result<(), ErrorType> {
	if extra.name.is_empty() || extra.code.is_empty() {
		return Err(ErrorType::InvalidFieldValue {
			field: "name and code",
			reason: "are required",
		});
	}
	if !extra.price.is_finite() || extra.price <= 0.0 {
		return Err(ErrorType::InvalidFieldValue {
			field: "price",
			reason: "must be a positive number",
		});
	}
	if !validator::is_extra_name_valid(&extra.name) {
		return Err(ErrorType::InvalidFieldValue {
			field: "name",
			reason: "must be alphanumeric (spaces allowed) and at most 32 characters long",
		});
	}
	if !validator::is_extra_code_valid(&extra.code) {
		return Err(ErrorType::InvalidFieldValue {
			field: "code",
			reason: "must be alphanumeric and at most 10 characters long",
		});
	}
	Ok(())
}

pub async fn get_optional_extra_by_id(
	connection: &mut PgConnection,
	extra_id: i32,
) -> Result<OptionalExtra, ErrorType> {
	db::get_optional_extra_by_id(connection, extra_id)
		.await?
		.map(OptionalExtra::from)
		.ok_or(ErrorType::OptionalExtraNotFound)
}

/// Every catalog entry, ordered by id. An empty catalog reads as
/// not-found.
pub async fn list_all_optional_extras(
	connection: &mut PgConnection,
) -> Result<Vec<OptionalExtra>, ErrorType> {
	let extras = db::list_optional_extras(connection).await?;
	if extras.is_empty() {
		return Err(ErrorType::OptionalExtraNotFound);
	}
	Ok(extras.into_iter().map(OptionalExtra::from).collect())
}

/// Admin-only catalog insert.
pub async fn create_optional_extra(
	connection: &mut PgConnection,
	principal: &Principal,
	mut extra: OptionalExtra,
) -> Result<OptionalExtra, ErrorType> {
	rbac::require_admin(principal)?;
	validate_optional_extra(&extra)?;

	let id =
		db::create_optional_extra(connection, &extra.name, &extra.code, extra.price).await?;
	extra.extra_id = Some(id);
	Ok(extra)
}

/// Admin-only catalog update. Fails [`ErrorType::NoChangesDetected`]
/// when the submitted record matches the stored one.
pub async fn update_optional_extra(
	connection: &mut PgConnection,
	principal: &Principal,
	extra_id: i32,
	updated: OptionalExtra,
) -> Result<OptionalExtra, ErrorType> {
	rbac::require_admin(principal)?;
	validate_optional_extra(&updated)?;

	let existing = get_optional_extra_by_id(&mut *connection, extra_id).await?;

	let unchanged = existing.name == updated.name &&
		existing.code == updated.code &&
		existing.price == updated.price;
	if unchanged {
		return Err(ErrorType::NoChangesDetected);
	}

	db::update_optional_extra(connection, extra_id, &updated.name, &updated.code, updated.price)
		.await?;

	Ok(OptionalExtra {
		extra_id: Some(extra_id),
		..updated
	})
}

/// Admin-only catalog delete. Link rows referencing the extra are
/// removed in the same transaction before the extra itself.
pub async fn delete_optional_extra(
	connection: &mut PgConnection,
	principal: &Principal,
	extra_id: i32,
) -> Result<(), ErrorType> {
	rbac::require_admin(principal)?;

	get_optional_extra_by_id(&mut *connection, extra_id).await?;

	if db::extra_has_policy_links(&mut *connection, extra_id).await? {
		info!("Extra {extra_id} is still linked to policies, unlinking before delete");
	}
	db::remove_links_for_extra(&mut *connection, extra_id).await?;
	db::delete_optional_extra(connection, extra_id).await
}

#[cfg(test)]
mod tests {
	use super::validate_optional_extra;
	use crate::prelude::*;

	fn breakdown_cover() -> OptionalExtra {
		OptionalExtra {
			extra_id: None,
			name: "Breakdown Cover".to_string(),
			code: "BRK01".to_string(),
			price: 49.99,
		}
	}

	#[test]
	fn accepts_a_valid_extra() {
		assert!(validate_optional_extra(&breakdown_cover()).is_ok());
	}

	#[test]
	fn requires_name_and_code_before_anything_else() {
		let mut extra = breakdown_cover();
		extra.name = String::new();
		extra.price = -1.0;
		assert!(matches!(
			validate_optional_extra(&extra).unwrap_err(),
			ErrorType::InvalidFieldValue {
				field: "name and code",
				..
			}
		));
	}

	#[test]
	fn rejects_non_positive_prices() {
		let mut extra = breakdown_cover();
		for price in [0.0, -49.99, f64::NAN, f64::INFINITY] {
			extra.price = price;
			assert!(matches!(
				validate_optional_extra(&extra).unwrap_err(),
				ErrorType::InvalidFieldValue {
					field: "price",
					..
				}
			));
		}
	}
}
