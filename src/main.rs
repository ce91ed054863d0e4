use anyhow::Context;
use clap::Parser;
use pastelink::{logger, Config};
use tracing::error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    logger::init(config.log_level.as_deref());

    let role = config.role;
    if let Err(e) = pastelink::run(config)
        .await
        .with_context(|| format!("{role:?} session failed"))
    {
        error!("{e:#}");
        // a pending stdin read would otherwise keep the runtime alive
        std::process::exit(1);
    }
    Ok(())
}
