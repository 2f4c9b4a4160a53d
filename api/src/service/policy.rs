use std::collections::BTreeSet;

use models::api::policy::PolicyFilterField;
use sqlx::PgConnection;

use super::rbac;
use crate::{db, prelude::*, utils::validator};

/// Field-shape validation for a policy, checked in a fixed order so the
/// first bad field names the error.
pub fn validate_policy(policy: &CarInsurancePolicy) -> Result<(), ErrorType> {
	if !validator::is_policy_number_valid(&policy.policy_number) {
		return Err(ErrorType::InvalidFieldValue {
			field: "policy_number",
			reason: "must be alphanumeric and at most 20 characters long",
		});
	}
	if !validator::is_vrn_valid(&policy.vrn) {
		return Err(ErrorType::InvalidFieldValue {
			field: "vrn",
			reason: "must be alphanumeric and at most 10 characters long",
		});
	}
	if !validator::is_make_or_model_valid(&policy.make) {
		return Err(ErrorType::InvalidFieldValue {
			field: "make",
			reason: "must be alphanumeric (spaces and hyphens allowed) \
				and at most 20 characters long",
		});
	}
	if !validator::is_make_or_model_valid(&policy.model) {
		return Err(ErrorType::InvalidFieldValue {
			field: "model",
			reason: "must be alphanumeric (spaces and hyphens allowed) \
				and at most 20 characters long",
		});
	}
	if !validator::is_coverage_valid(&policy.coverage) {
		return Err(ErrorType::InvalidFieldValue {
			field: "coverage",
			reason: "must be alphanumeric (spaces allowed) and at most 30 characters long",
		});
	}
	if policy.start_date > policy.end_date {
		return Err(ErrorType::InvalidFieldValue {
			field: "start_date",
			reason: "must be before end date.",
		});
	}
	Ok(())
}

/// Checks every submitted extra against the catalog. A submitted extra
/// counts as valid only when a catalog record matches it in full, id
/// included. Non-matching ids come back sorted in the error.
pub async fn verify_optional_extras(
	connection: &mut PgConnection,
	extras: &[OptionalExtra],
) -> Result<(), ErrorType> {
	if extras.is_empty() {
		return Ok(());
	}

	let ids = extra_ids(extras);
	let catalog: Vec<OptionalExtra> = db::get_optional_extras_by_ids(connection, &ids)
		.await?
		.into_iter()
		.map(OptionalExtra::from)
		.collect();

	let invalid = invalid_extra_ids(extras, &catalog);
	if !invalid.is_empty() {
		return Err(ErrorType::OptionalExtrasNotFound(invalid));
	}
	Ok(())
}

/// The matching step of [`verify_optional_extras`]: the ids of
/// submitted extras with no field-for-field catalog counterpart,
/// sorted and deduplicated. An id that exists but whose record was
/// tampered with counts as invalid.
fn invalid_extra_ids(submitted: &[OptionalExtra], catalog: &[OptionalExtra]) -> Vec<i32> {
	let mut invalid: Vec<i32> = submitted
		.iter()
		.filter(|extra| !catalog.contains(extra))
		.map(|extra| extra.extra_id.unwrap_or_default())
		.collect();
	invalid.sort_unstable();
	invalid.dedup();
	invalid
}

/// Set difference of the linked extras against the desired ones.
/// Returns `(to_add, to_remove)`; submission order never matters.
pub fn extras_delta(current: &[OptionalExtra], desired: &[OptionalExtra]) -> (Vec<i32>, Vec<i32>) {
	let current: BTreeSet<i32> = current.iter().filter_map(|extra| extra.extra_id).collect();
	let desired: BTreeSet<i32> = desired.iter().filter_map(|extra| extra.extra_id).collect();

	let to_add = desired.difference(&current).copied().collect();
	let to_remove = current.difference(&desired).copied().collect();
	(to_add, to_remove)
}

/// The update permission gate. The caller must own the stored policy
/// (or be an admin), may only hand it to a user they could act for,
/// and a caller with no numeric identity may not change the policy
/// number.
fn check_update_permissions(
	principal: &Principal,
	current: &CarInsurancePolicy,
	updated: &CarInsurancePolicy,
) -> Result<(), ErrorType> {
	if !rbac::is_self_or_admin(principal, current.user_id) {
		return Err(ErrorType::Unauthorized);
	}

	let can_update = rbac::is_self_or_admin(principal, updated.user_id);
	let reassigning = current.user_id != updated.user_id;
	let renumbering =
		principal.user_id == 0 && current.policy_number != updated.policy_number;
	if (!can_update && reassigning) || renumbering {
		return Err(ErrorType::Unauthorized);
	}
	Ok(())
}

/// Creates a policy with its extras links. Non-admins can only create
/// policies for themselves. The caller supplies the transaction so the
/// insert rolls back when the extras turn out invalid.
#[instrument(skip(connection, request))]
pub async fn create_policy(
	connection: &mut PgConnection,
	principal: &Principal,
	request: PolicyRequest,
) -> Result<PolicyWithExtras, ErrorType> {
	rbac::require_self_or_admin(principal, request.policy.user_id)?;
	validate_policy(&request.policy)?;

	let mut policy = request.policy;
	let policy_id = db::create_policy(&mut *connection, &policy).await?;
	policy.ci_policy_id = Some(policy_id);

	let extras = request.optional_extras.unwrap_or_default();
	verify_optional_extras(&mut *connection, &extras).await?;
	if !extras.is_empty() {
		db::add_policy_extras(&mut *connection, policy_id, &extra_ids(&extras)).await?;
	}

	info!("Created policy {policy_id} for user {}", policy.user_id);
	Ok(PolicyWithExtras {
		policy,
		optional_extras: extras,
	})
}

/// Loads one policy with its extras. Ownership is checked before
/// existence, a non-admin probing someone else's id learns nothing
/// about whether it exists.
pub async fn get_policy_by_id(
	connection: &mut PgConnection,
	principal: &Principal,
	policy_id: i32,
) -> Result<PolicyWithExtras, ErrorType> {
	if !rbac::owns_policy(&mut *connection, principal, policy_id).await? {
		return Err(ErrorType::Unauthorized);
	}

	let row = db::get_policy_by_id(&mut *connection, policy_id)
		.await?
		.ok_or(ErrorType::PolicyNotFound)?;
	with_extras(connection, row.into()).await
}

/// Updates a policy and reconciles its extras links. Either side
/// changing is enough; neither changing fails
/// [`ErrorType::NoChangesDetected`]. Extras omitted from the request
/// leave the links untouched.
#[instrument(skip(connection, request))]
pub async fn update_policy(
	connection: &mut PgConnection,
	principal: &Principal,
	policy_id: i32,
	request: PolicyRequest,
) -> Result<PolicyWithExtras, ErrorType> {
	let mut updated = request.policy;
	updated.ci_policy_id = Some(policy_id);
	validate_policy(&updated)?;

	let current_row = db::get_policy_by_id(&mut *connection, policy_id)
		.await?
		.ok_or(ErrorType::PolicyNotFound)?;
	let current: CarInsurancePolicy = current_row.into();
	let current_extras: Vec<OptionalExtra> = db::get_policy_extras(&mut *connection, policy_id)
		.await?
		.into_iter()
		.map(OptionalExtra::from)
		.collect();

	if let Err(error) = check_update_permissions(principal, &current, &updated) {
		debug!(
			"User {} may not update policy {policy_id} this way",
			principal.user_id
		);
		return Err(error);
	}

	let policy_changed = current != updated;
	let (to_add, to_remove) = match request.optional_extras.as_deref() {
		Some(desired) => {
			verify_optional_extras(&mut *connection, desired).await?;
			extras_delta(&current_extras, desired)
		}
		None => (Vec::new(), Vec::new()),
	};
	let extras_changed = !to_add.is_empty() || !to_remove.is_empty();

	if !policy_changed && !extras_changed {
		return Err(ErrorType::NoChangesDetected);
	}

	if policy_changed {
		db::update_policy(&mut *connection, policy_id, &updated).await?;
	}
	if !to_add.is_empty() {
		db::add_policy_extras(&mut *connection, policy_id, &to_add).await?;
	}
	if !to_remove.is_empty() {
		db::remove_policy_extras(&mut *connection, policy_id, &to_remove).await?;
	}

	info!("Updated policy {policy_id}");
	with_extras(connection, updated).await
}

/// Admin-only delete. Links go first so the foreign keys hold, all
/// inside the caller's transaction.
#[instrument(skip(connection))]
pub async fn delete_policy(
	connection: &mut PgConnection,
	principal: &Principal,
	policy_id: i32,
) -> Result<i32, ErrorType> {
	rbac::require_admin(principal)?;

	db::get_policy_by_id(&mut *connection, policy_id)
		.await?
		.ok_or(ErrorType::PolicyNotFound)?;

	let linked = db::get_policy_extras(&mut *connection, policy_id).await?;
	if !linked.is_empty() {
		let ids: Vec<i32> = linked.iter().map(|extra| extra.id).collect();
		db::remove_policy_extras(&mut *connection, policy_id, &ids).await?;
	}
	db::delete_policy(&mut *connection, policy_id).await?;

	info!("Deleted policy {policy_id}");
	Ok(policy_id)
}

/// Admin-only list of every policy, each with its extras.
pub async fn list_all_policies(
	connection: &mut PgConnection,
	principal: &Principal,
) -> Result<Vec<PolicyWithExtras>, ErrorType> {
	rbac::require_admin(principal)?;

	let rows = db::list_policies(&mut *connection).await?;
	collect_with_extras(connection, rows).await
}

/// The requesting user's own policies, or any user's for an admin. An
/// empty result is an empty list, not an error.
pub async fn list_policies_by_user(
	connection: &mut PgConnection,
	principal: &Principal,
	user_id: i32,
) -> Result<Vec<PolicyWithExtras>, ErrorType> {
	rbac::require_self_or_admin(principal, user_id)?;

	let rows = db::list_policies_by_user(&mut *connection, user_id).await?;
	collect_with_extras(connection, rows).await
}

/// Admin-only equality filter over the closed field set.
pub async fn filter_policies(
	connection: &mut PgConnection,
	principal: &Principal,
	field: PolicyFilterField,
	value: &str,
) -> Result<Vec<PolicyWithExtras>, ErrorType> {
	rbac::require_admin(principal)?;

	let rows = db::filter_policies(&mut *connection, field, value).await?;
	collect_with_extras(connection, rows).await
}

async fn with_extras(
	connection: &mut PgConnection,
	policy: CarInsurancePolicy,
) -> Result<PolicyWithExtras, ErrorType> {
	let policy_id = policy.ci_policy_id.unwrap_or_default();
	let optional_extras = db::get_policy_extras(connection, policy_id)
		.await?
		.into_iter()
		.map(OptionalExtra::from)
		.collect();
	Ok(PolicyWithExtras {
		policy,
		optional_extras,
	})
}

async fn collect_with_extras(
	connection: &mut PgConnection,
	rows: Vec<db::PolicyRow>,
) -> Result<Vec<PolicyWithExtras>, ErrorType> {
	let mut policies = Vec::with_capacity(rows.len());
	for row in rows {
		let policy = with_extras(&mut *connection, row.into()).await?;
		policies.push(policy);
	}
	Ok(policies)
}

fn extra_ids(extras: &[OptionalExtra]) -> Vec<i32> {
	extras
		.iter()
		.map(|extra| extra.extra_id.unwrap_or_default())
		.collect()
}

#[cfg(test)]
mod tests {
	use time::macros::date;

	use super::{check_update_permissions, extras_delta, invalid_extra_ids, validate_policy};
	use crate::prelude::*;

	fn extra(id: i32) -> OptionalExtra {
		OptionalExtra {
			extra_id: Some(id),
			name: format!("Extra {id}"),
			code: format!("EX{id}"),
			price: 10.0,
		}
	}

	fn valid_policy() -> CarInsurancePolicy {
		CarInsurancePolicy {
			ci_policy_id: None,
			user_id: 1,
			vrn: "AB12CDE".to_string(),
			make: "Volvo".to_string(),
			model: "V60".to_string(),
			policy_number: "POL123456".to_string(),
			start_date: date!(2026 - 01 - 01),
			end_date: date!(2026 - 12 - 31),
			coverage: "Fully Comprehensive".to_string(),
		}
	}

	#[test]
	fn accepts_a_valid_policy() {
		assert!(validate_policy(&valid_policy()).is_ok());
	}

	#[test]
	fn rejects_inverted_date_ranges() {
		let mut policy = valid_policy();
		policy.start_date = date!(2027 - 01 - 01);
		assert!(matches!(
			validate_policy(&policy).unwrap_err(),
			ErrorType::InvalidFieldValue {
				field: "start_date",
				..
			}
		));
	}

	#[test]
	fn single_day_policies_are_valid() {
		let mut policy = valid_policy();
		policy.end_date = policy.start_date;
		assert!(validate_policy(&policy).is_ok());
	}

	#[test]
	fn delta_of_identical_sets_is_empty() {
		let current = vec![extra(1), extra(2)];
		let desired = vec![extra(2), extra(1)];
		assert_eq!(extras_delta(&current, &desired), (vec![], vec![]));
	}

	#[test]
	fn delta_splits_additions_and_removals() {
		let current = vec![extra(1), extra(2), extra(3)];
		let desired = vec![extra(2), extra(4)];
		assert_eq!(extras_delta(&current, &desired), (vec![4], vec![1, 3]));
	}

	#[test]
	fn clearing_every_extra_removes_them_all() {
		let current = vec![extra(1), extra(2)];
		assert_eq!(extras_delta(&current, &[]), (vec![], vec![1, 2]));
	}

	#[test]
	fn unknown_extra_ids_are_reported() {
		let submitted = vec![extra(1), extra(3)];
		let catalog = vec![extra(1)];
		assert_eq!(invalid_extra_ids(&submitted, &catalog), vec![3]);
	}

	#[test]
	fn tampered_extra_records_are_reported_by_id() {
		let mut forged = extra(2);
		forged.price = 0.01;
		let catalog = vec![extra(1), extra(2)];
		assert_eq!(invalid_extra_ids(&[extra(1), forged], &catalog), vec![2]);
	}

	#[test]
	fn matching_extras_are_all_valid() {
		let submitted = vec![extra(2), extra(1)];
		let catalog = vec![extra(1), extra(2)];
		assert!(invalid_extra_ids(&submitted, &catalog).is_empty());
	}

	const ADMIN: Principal = Principal {
		user_id: 1,
		is_admin: true,
	};
	const OWNER: Principal = Principal {
		user_id: 1,
		is_admin: false,
	};
	const OTHER_USER: Principal = Principal {
		user_id: 2,
		is_admin: false,
	};

	#[test]
	fn non_owner_cannot_take_over_a_policy() {
		let current = valid_policy();
		let mut updated = current.clone();
		updated.user_id = OTHER_USER.user_id;
		assert_eq!(
			check_update_permissions(&OTHER_USER, &current, &updated).unwrap_err(),
			ErrorType::Unauthorized
		);
	}

	#[test]
	fn non_owner_cannot_edit_a_policy_in_place() {
		let current = valid_policy();
		let mut updated = current.clone();
		updated.coverage = "Third Party".to_string();
		assert_eq!(
			check_update_permissions(&OTHER_USER, &current, &updated).unwrap_err(),
			ErrorType::Unauthorized
		);
	}

	#[test]
	fn owner_and_admin_may_update() {
		let current = valid_policy();
		let mut updated = current.clone();
		updated.coverage = "Third Party".to_string();
		assert!(check_update_permissions(&OWNER, &current, &updated).is_ok());
		assert!(check_update_permissions(&ADMIN, &current, &updated).is_ok());
	}

	#[test]
	fn owner_cannot_hand_a_policy_to_someone_else() {
		let current = valid_policy();
		let mut updated = current.clone();
		updated.user_id = OTHER_USER.user_id;
		assert_eq!(
			check_update_permissions(&OWNER, &current, &updated).unwrap_err(),
			ErrorType::Unauthorized
		);
	}

	#[test]
	fn a_caller_without_identity_cannot_renumber() {
		let no_identity = Principal {
			user_id: 0,
			is_admin: true,
		};
		let current = valid_policy();
		let mut updated = current.clone();
		updated.policy_number = "POL999999".to_string();
		assert_eq!(
			check_update_permissions(&no_identity, &current, &updated).unwrap_err(),
			ErrorType::Unauthorized
		);
	}
}
