use sqlx::{Pool, Postgres};
use tokio::net::TcpListener;

use crate::{prelude::*, routes};

/// Shared state handed to every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
	/// The parsed server configuration
	pub config: AppConfig,
	/// The PostgreSQL connection pool
	pub database: Pool<Postgres>,
}

/// Binds the listener and serves the route tree until the process is
/// stopped.
pub async fn start_server(state: AppState) {
	let bind_addr = state.config.bind_addr;
	let router = routes::setup_routes(&state).await;

	let listener = TcpListener::bind(bind_addr)
		.await
		.expect("Failed to bind to the configured address");
	info!("Listening for connections on {bind_addr}");

	axum::serve(listener, router)
		.await
		.expect("Failed to start the server");
}
