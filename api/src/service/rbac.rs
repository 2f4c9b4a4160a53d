//! The shared permission primitives. Everything here is deliberately
//! boring: admin bypass, self-or-admin, and an ownership probe.

use sqlx::PgConnection;

use crate::{db, prelude::*};

/// Fails with [`ErrorType::Unauthorized`] unless the caller is an
/// admin.
pub fn require_admin(principal: &Principal) -> Result<(), ErrorType> {
	if !principal.is_admin {
		return Err(ErrorType::Unauthorized);
	}
	Ok(())
}

/// Non-throwing self-or-admin check, for callers that need the answer
/// to decide behavior rather than abort.
pub fn is_self_or_admin(principal: &Principal, target_user_id: i32) -> bool {
	principal.is_admin || principal.user_id == target_user_id
}

/// Throwing form of [`is_self_or_admin`].
pub fn require_self_or_admin(
	principal: &Principal,
	target_user_id: i32,
) -> Result<(), ErrorType> {
	if !is_self_or_admin(principal, target_user_id) {
		debug!(
			"User {} does not have permission to update user {}",
			principal.user_id, target_user_id
		);
		return Err(ErrorType::Unauthorized);
	}
	Ok(())
}

/// Whether the caller owns the given policy. Admins bypass the probe.
pub async fn owns_policy(
	connection: &mut PgConnection,
	principal: &Principal,
	policy_id: i32,
) -> Result<bool, ErrorType> {
	if principal.is_admin {
		return Ok(true);
	}
	db::user_owns_policy(connection, principal.user_id, policy_id).await
}

#[cfg(test)]
mod tests {
	use super::*;

	const ADMIN: Principal = Principal {
		user_id: 1,
		is_admin: true,
	};
	const USER: Principal = Principal {
		user_id: 2,
		is_admin: false,
	};

	#[test]
	fn only_admins_pass_require_admin() {
		assert!(require_admin(&ADMIN).is_ok());
		assert_eq!(require_admin(&USER).unwrap_err(), ErrorType::Unauthorized);
	}

	#[test]
	fn self_or_admin_allows_self_and_any_admin() {
		assert!(is_self_or_admin(&USER, 2));
		assert!(!is_self_or_admin(&USER, 1));
		assert!(is_self_or_admin(&ADMIN, 2));

		assert!(require_self_or_admin(&USER, 2).is_ok());
		assert_eq!(
			require_self_or_admin(&USER, 3).unwrap_err(),
			ErrorType::Unauthorized
		);
	}
}
