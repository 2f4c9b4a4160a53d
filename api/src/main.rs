//! The roadcover API server: users, car insurance policies and the
//! optional extra catalog over PostgreSQL, with JWT bearer
//! authentication and admin/self authorization.

mod app;
mod db;
mod models;
mod prelude;
mod routes;
mod service;
mod utils;

use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{app::AppState, prelude::*};

#[tokio::main]
async fn main() -> Result<(), ErrorType> {
	let config = utils::config::parse_config();

	tracing_subscriber::registry()
		.with(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();
	info!(
		"Configuration read. Running environment set to {}",
		config.environment
	);

	let database = db::connect(&config.database).await;
	debug!("Database connection pool established");

	db::initialize(&database).await?;
	debug!("Database initialized");

	app::start_server(AppState { config, database }).await;

	Ok(())
}
