/// Sign-in, sign-up and token renewal payloads
pub mod auth;
/// The optional extra catalog entity
pub mod extra;
/// The car insurance policy entity and its request payloads
pub mod policy;
/// The user entity and its request payloads
pub mod user;
