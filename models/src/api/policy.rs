use serde::{Deserialize, Serialize};
use time::Date;

use super::extra::OptionalExtra;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// A car insurance policy. Owned by exactly one user; all fields are
/// required and re-validated on every write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CarInsurancePolicy {
	/// Surrogate key. `None` until the row exists
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ci_policy_id: Option<i32>,
	/// The owning user
	pub user_id: i32,
	/// Vehicle registration number, alphanumeric, at most 10 chars
	pub vrn: String,
	/// Alphanumeric plus space/hyphen, at most 20 chars
	pub make: String,
	/// Alphanumeric plus space/hyphen, at most 20 chars
	pub model: String,
	/// Alphanumeric, at most 20 chars
	pub policy_number: String,
	/// First day of cover, `YYYY-MM-DD` on the wire
	#[serde(with = "iso_date")]
	pub start_date: Date,
	/// Last day of cover, must not precede `start_date`
	#[serde(with = "iso_date")]
	pub end_date: Date,
	/// Alphanumeric plus space, at most 30 chars
	pub coverage: String,
}

/// A policy joined with its linked optional extras, the shape every
/// policy read returns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyWithExtras {
	/// The policy row
	pub policy: CarInsurancePolicy,
	/// The catalog entries currently linked to it
	pub optional_extras: Vec<OptionalExtra>,
}

/// Body of `POST /policies` and `PUT /policies/{id}`: the policy plus
/// the desired set of linked extras. An absent extras list means "do
/// not touch the links".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyRequest {
	/// The policy to create or the desired state of an existing one
	pub policy: CarInsurancePolicy,
	/// The desired linked extras, identified by their full catalog
	/// records
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub optional_extras: Option<Vec<OptionalExtra>>,
}

/// The closed set of columns a filtered policy read may match on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PolicyFilterField {
	/// Filter by surrogate key
	CiPolicyId,
	/// Filter by owning user
	UserId,
	/// Filter by vehicle registration number
	Vrn,
	/// Filter by make
	Make,
	/// Filter by model
	Model,
	/// Filter by policy number
	PolicyNumber,
	/// Filter by first day of cover
	StartDate,
	/// Filter by last day of cover
	EndDate,
	/// Filter by coverage level
	Coverage,
}

impl PolicyFilterField {
	/// The column name to use in the filter statement
	pub fn as_column(self) -> &'static str {
		match self {
			Self::CiPolicyId => "id",
			Self::UserId => "user_id",
			Self::Vrn => "vrn",
			Self::Make => "make",
			Self::Model => "model",
			Self::PolicyNumber => "policy_number",
			Self::StartDate => "start_date",
			Self::EndDate => "end_date",
			Self::Coverage => "coverage",
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_test::{assert_tokens, Token};
	use time::macros::date;

	use super::CarInsurancePolicy;

	#[test]
	fn dates_travel_as_iso_strings() {
		assert_tokens(
			&CarInsurancePolicy {
				ci_policy_id: Some(12),
				user_id: 1,
				vrn: "AB12CDE".to_string(),
				make: "Toyota".to_string(),
				model: "Corolla".to_string(),
				policy_number: "POL12345".to_string(),
				start_date: date!(2025 - 01 - 01),
				end_date: date!(2025 - 12 - 31),
				coverage: "Comprehensive".to_string(),
			},
			&[
				Token::Struct {
					name: "CarInsurancePolicy",
					len: 9,
				},
				Token::Str("ci_policy_id"),
				Token::Some,
				Token::I32(12),
				Token::Str("user_id"),
				Token::I32(1),
				Token::Str("vrn"),
				Token::Str("AB12CDE"),
				Token::Str("make"),
				Token::Str("Toyota"),
				Token::Str("model"),
				Token::Str("Corolla"),
				Token::Str("policy_number"),
				Token::Str("POL12345"),
				Token::Str("start_date"),
				Token::Str("2025-01-01"),
				Token::Str("end_date"),
				Token::Str("2025-12-31"),
				Token::Str("coverage"),
				Token::Str("Comprehensive"),
				Token::StructEnd,
			],
		);
	}

	#[test]
	fn filter_fields_parse_from_snake_case() {
		let field: super::PolicyFilterField =
			serde_json::from_str("\"policy_number\"").unwrap();
		assert_eq!(field, super::PolicyFilterField::PolicyNumber);
		assert_eq!(field.as_column(), "policy_number");

		assert!(serde_json::from_str::<super::PolicyFilterField>("\"password\"").is_err());
	}
}
