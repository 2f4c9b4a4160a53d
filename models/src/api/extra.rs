use serde::{Deserialize, Serialize};

/// A reusable catalog entry that can be attached to any number of
/// policies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionalExtra {
	/// Surrogate key. `None` until the row exists
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub extra_id: Option<i32>,
	/// At most 32 characters, alphanumeric plus spaces
	pub name: String,
	/// At most 10 characters, alphanumeric
	pub code: String,
	/// Strictly positive
	pub price: f64,
}

#[cfg(test)]
mod tests {
	use serde_test::{assert_tokens, Token};

	use super::OptionalExtra;

	#[test]
	fn unsaved_extra_omits_its_id() {
		assert_tokens(
			&OptionalExtra {
				extra_id: None,
				name: "Breakdown Cover".to_string(),
				code: "BRK01".to_string(),
				price: 49.99,
			},
			&[
				Token::Struct {
					name: "OptionalExtra",
					len: 3,
				},
				Token::Str("name"),
				Token::Str("Breakdown Cover"),
				Token::Str("code"),
				Token::Str("BRK01"),
				Token::Str("price"),
				Token::F64(49.99),
				Token::StructEnd,
			],
		);
	}
}
