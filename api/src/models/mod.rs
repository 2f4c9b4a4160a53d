pub mod access_token_data;
pub mod principal;
