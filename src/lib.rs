pub mod api;
pub mod clock;
pub mod commands;
pub mod config;
pub mod console;
pub mod errors;
pub mod history;
pub mod mock;
pub mod models;
pub mod providers;
pub mod session;

use config::AppConfig;

pub fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(console::run(config))?;
    Ok(())
}
