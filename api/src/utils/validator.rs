use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
	// 4-20 characters, alphanumeric, must start with a letter
	static ref USERNAME_REGEX: Regex =
		Regex::new("^[a-zA-Z][a-zA-Z0-9]{3,19}$").unwrap();
	// Passwords arrive as a 32 character hex digest
	static ref PASSWORD_DIGEST_REGEX: Regex =
		Regex::new("^[a-fA-F0-9]{32}$").unwrap();
	// name@example.com shape; length is checked separately
	static ref EMAIL_REGEX: Regex =
		Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
	static ref ALPHANUMERIC_REGEX: Regex = Regex::new("^[a-zA-Z0-9]+$").unwrap();
	static ref ALPHANUMERIC_SPACE_REGEX: Regex =
		Regex::new("^[a-zA-Z0-9 ]+$").unwrap();
	// Makes and models also allow hyphens (e.g. "Mercedes-Benz")
	static ref ALPHANUMERIC_SPACE_HYPHEN_REGEX: Regex =
		Regex::new("^[a-zA-Z0-9 -]+$").unwrap();
}

pub fn is_username_valid(username: &str) -> bool {
	USERNAME_REGEX.is_match(username)
}

pub fn is_password_digest_valid(password: &str) -> bool {
	PASSWORD_DIGEST_REGEX.is_match(password)
}

pub fn is_email_valid(email: &str) -> bool {
	email.len() <= 32 && EMAIL_REGEX.is_match(email)
}

pub fn is_vrn_valid(vrn: &str) -> bool {
	vrn.len() <= 10 && ALPHANUMERIC_REGEX.is_match(vrn)
}

pub fn is_make_or_model_valid(value: &str) -> bool {
	value.len() <= 20 && ALPHANUMERIC_SPACE_HYPHEN_REGEX.is_match(value)
}

pub fn is_policy_number_valid(policy_number: &str) -> bool {
	policy_number.len() <= 20 && ALPHANUMERIC_REGEX.is_match(policy_number)
}

pub fn is_coverage_valid(coverage: &str) -> bool {
	coverage.len() <= 30 && ALPHANUMERIC_SPACE_REGEX.is_match(coverage)
}

pub fn is_extra_name_valid(name: &str) -> bool {
	name.len() <= 32 && ALPHANUMERIC_SPACE_REGEX.is_match(name)
}

pub fn is_extra_code_valid(code: &str) -> bool {
	code.len() <= 10 && ALPHANUMERIC_REGEX.is_match(code)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn usernames_start_with_a_letter() {
		assert!(is_username_valid("jsmith"));
		assert!(is_username_valid("A1234"));
		assert!(!is_username_valid("1jsmith"));
		assert!(!is_username_valid("js"));
		assert!(!is_username_valid("j_smith"));
		assert!(!is_username_valid("averyveryverylongusername"));
	}

	#[test]
	fn password_must_be_a_32_char_hex_digest() {
		assert!(is_password_digest_valid("5f4dcc3b5aa765d61d8327deb882cf99"));
		assert!(!is_password_digest_valid("password"));
		assert!(!is_password_digest_valid("5f4dcc3b5aa765d61d8327deb882cf9"));
		assert!(!is_password_digest_valid(
			"5f4dcc3b5aa765d61d8327deb882cf99a"
		));
		assert!(!is_password_digest_valid(
			"zf4dcc3b5aa765d61d8327deb882cf99"
		));
	}

	#[test]
	fn emails_are_bounded_and_shaped() {
		assert!(is_email_valid("j.smith@example.com"));
		assert!(!is_email_valid("j.smith"));
		assert!(!is_email_valid("j.smith@example"));
		assert!(!is_email_valid(
			"a.very.long.local.part.indeed@example.com"
		));
	}

	#[test]
	fn policy_fields_accept_their_alphabets() {
		assert!(is_vrn_valid("AB12CDE"));
		assert!(!is_vrn_valid("AB12 CDE"));
		assert!(!is_vrn_valid("AB12CDEFGHI"));

		assert!(is_make_or_model_valid("Mercedes-Benz"));
		assert!(is_make_or_model_valid("Series 3"));
		assert!(!is_make_or_model_valid("O'Brien"));

		assert!(is_coverage_valid("Third Party Fire and Theft"));
		assert!(!is_coverage_valid("Comprehensive+"));
	}

	#[test]
	fn extra_fields_accept_their_alphabets() {
		assert!(is_extra_name_valid("Breakdown Cover"));
		assert!(!is_extra_name_valid("Breakdown-Cover"));
		assert!(is_extra_code_valid("BRK01"));
		assert!(!is_extra_code_valid("BRK-01"));
	}
}
