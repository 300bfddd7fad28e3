use std::net::SocketAddr;

use anyhow::Context;
use cpm_schedule::ScheduleConfig;
use cpm_schedule::http_api;
use cpm_schedule::logging;

const ADDR_ENV_VAR: &str = "CPM_HTTP_ADDR";
const CONFIG_ENV_VAR: &str = "CPM_HTTP_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging(None)?;

    let addr: SocketAddr = std::env::var(ADDR_ENV_VAR)
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()
        .with_context(|| format!("invalid {ADDR_ENV_VAR}"))?;

    let config = match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) => ScheduleConfig::from_json_file(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        Err(_) => ScheduleConfig::default(),
    };

    http_api::serve(addr, config).await?;
    Ok(())
}
