use argon2::Params;
use clap::{crate_name, crate_version};
use time::Duration;

pub const APP_NAME: &str = crate_name!();
pub const APP_VERSION: &str = crate_version!();

/// The `iss` claim stamped into every token we mint
pub const JWT_ISSUER: &str = "https://api.roadcover.example";

/// The `typ` claim of tokens accepted by authenticated endpoints
pub const ACCESS_TOKEN_TYPE: &str = "accessToken";
/// The `typ` claim of tokens accepted by `POST /auth/renew`
pub const REFRESH_TOKEN_TYPE: &str = "refreshToken";

pub const ACCESS_TOKEN_VALIDITY: Duration = Duration::minutes(30);
pub const REFRESH_TOKEN_VALIDITY: Duration = Duration::hours(24);

/// Parameters for hashing a user's password digest before storage
pub const HASHING_PARAMS: Params = match Params::new(8192, 4, 4, None) {
	Ok(params) => params,
	Err(_) => panic!("the hashing params are invalid"),
};
