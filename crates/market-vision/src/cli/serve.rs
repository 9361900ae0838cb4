//! The `market-vision serve` command: run the relay endpoint.

use clap::Args;
use market_vision_core::Config;

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides `[server] host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides `[server] port`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Execute the serve command. Runs until Ctrl-C.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&args, &mut config);
    if config.server.port == 0 {
        anyhow::bail!("--port must be greater than 0");
    }

    market_vision_core::server::serve(&config).await?;
    Ok(())
}

fn apply_overrides(args: &ServeArgs, config: &mut Config) {
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
}
