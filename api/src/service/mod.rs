//! The authorization-and-consistency core. Route handlers validate
//! nothing themselves: every permission check, no-change check and
//! extras reconciliation lives here, over a connection (or
//! transaction) the handler checked out for the whole request.

pub mod auth;
pub mod optional_extra;
pub mod policy;
pub mod rbac;
pub mod user;
