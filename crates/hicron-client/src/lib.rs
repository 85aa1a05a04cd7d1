//! 定时抓取客户端
//!
//! 负责黄历与双色球开奖数据的请求、解析和入库，供 `hicron` 命令行调用。

use std::{path::PathBuf, str::FromStr, sync::LazyLock};

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod request;
pub mod service;

// 重新导出常用的类型
pub use config::CronConfig;
pub use db::SqliteStore;
pub use error::JobError;
pub use service::{Job, JobKind, JobOutcome};

/// Path of the `.env` file that was loaded, if any.
pub static ENV_GUARD: LazyLock<anyhow::Result<PathBuf>> =
    LazyLock::new(|| dotenvy::dotenv().map_err(|e| anyhow::anyhow!("{e}")));

/// Initialise logging. An explicit level wins over `LOGGER_LEVEL`.
pub fn setup(log_level: Option<log::LevelFilter>) {
    // load .env before the logger reads LOGGER_LEVEL
    let env_file = ENV_GUARD.as_ref();

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("LOGGER_LEVEL", "info")
            .write_style("LOG_STYLE"),
    );
    if let Some(level) = log_level {
        builder.filter_level(level);
    }

    if let Err(e) = builder.try_init() {
        eprintln!("Logger already initialised: {e}");
    }

    match env_file {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) => log::debug!("No .env file loaded: {e}"),
    }
}

/// Read and parse an environment variable, `None` when unset or unparsable.
pub fn parse_from_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {key}: cannot parse {raw:?}");
            None
        }
    }
}

#[cfg(test)]
pub(crate) fn init_test_logger() {
    env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init()
        .ok();
}
