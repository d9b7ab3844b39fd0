//! PsychOut demo binary.
//!
//! Composition root: loads configuration, sets up logging, builds the demo
//! [`Client`] and plays its intro, which ends in a scripted combat.
//!
//! # Environment
//!
//! - `PSYCHOUT_LOG_DIR` - also write logs to `<dir>/psychout.log`
//! - `RUST_LOG` - log filter (default: `info`)
//! - `PSYCHOUT_*` runtime settings, see [`RuntimeConfig::from_env`]
//!
//! ```bash
//! RUST_LOG=runtime=debug cargo run -p psychout-client
//! ```

use std::path::PathBuf;

use anyhow::Result;
use psychout_client::{Client, logging};
use runtime::RuntimeConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let log_dir = std::env::var_os("PSYCHOUT_LOG_DIR").map(PathBuf::from);
    let _guard = logging::setup_logging(log_dir.as_deref())?;

    let config = RuntimeConfig::from_env();
    tracing::info!(
        save_dir = ?config.save_data_dir,
        max_rounds = config.game_config.max_rounds,
        priority_order = %config.game_config.priority_order,
        "Starting PsychOut demo"
    );

    let client = Client::builder().config(config).build()?;
    client.run().await?;

    tracing::info!("Demo finished");
    Ok(())
}
