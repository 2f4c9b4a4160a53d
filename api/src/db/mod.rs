use sqlx::{pool::PoolOptions, Pool, Postgres};

use crate::{prelude::*, utils::config::DatabaseConfig};

mod executor;
mod initializer;
mod optional_extra;
mod policy;
mod user;

pub use self::{
	executor::*,
	initializer::initialize,
	optional_extra::*,
	policy::*,
	user::*,
};

/// Connects to the database based on a config. Not much to say here.
#[instrument(skip(config))]
pub async fn connect(config: &DatabaseConfig) -> Pool<Postgres> {
	PoolOptions::<Postgres>::new()
		.max_connections(config.connection_limit)
		.connect_with(
			<sqlx::PgConnection as sqlx::Connection>::Options::new()
				.username(config.user.as_str())
				.password(config.password.as_str())
				.host(config.host.as_str())
				.port(config.port)
				.database(config.database.as_str()),
		)
		.await
		.expect("Failed to connect to database")
}
