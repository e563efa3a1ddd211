use anyhow::Context;
use blocks_hooks::Hook;
use blocks_logger::{Logger, new_logger};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Dropped when main returns, which drains the background writer.
    let _subscriber = Logger::builder().name(env!("CARGO_PKG_NAME")).init()?;

    let cfg = blocks_ping::load_config("ping").context("Critical: Configuration is malformed")?;
    let logx = new_logger(&cfg.logger).context("Critical: Logger configuration is invalid")?;

    let hooks = Hook::new(Duration::from_secs(cfg.server.stop_timeout_secs));
    blocks_ping::flush_on_shutdown(&hooks, &logx);

    blocks_ping::build(&cfg, logx, hooks)?.run().await?;
    Ok(())
}
