//! Commonly used imports for the rest of the crate.

pub use models::prelude::*;
pub use tracing::{debug, info, instrument, trace, warn};

pub use crate::{
	app::AppState,
	models::principal::Principal,
	utils::{config::AppConfig, constants},
};
