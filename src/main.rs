use anyhow::Context;
use clap::Parser;

use model_viewer::{cli::Cli, ViewerApp, ViewerConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config =
        ViewerConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply_to(&mut config);

    let app = ViewerApp::new(config).context("failed to start the viewer")?;
    app.run().context("viewer exited with an error")?;
    Ok(())
}
