// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! `sortwise-web`: serves the upload and folder-organizing pages.

use clap::Parser;
use std::path::PathBuf;
use std::process::Command;
use tracing::{info, warn};

use sortwise::config::AppConfig;
use sortwise::Result;

#[derive(Parser, Debug)]
#[command(name = "sortwise-web", version, about = "Browser front end for sortwise")]
struct Args {
    /// Settings file; defaults apply when it is missing
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Listen address, overriding `web.host`
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Listen port, overriding `web.port`
    #[arg(short, long)]
    port: Option<u16>,

    /// Hide the server-side folder form
    #[arg(long)]
    no_folder_pick: bool,

    /// Debug-level logs, request traces included
    #[arg(short, long)]
    verbose: bool,

    /// Launch the system browser on the page once bound
    #[arg(long)]
    open: bool,
}

impl Args {
    /// Fold command line flags into the loaded settings
    fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.web.host = host.clone();
        }
        if let Some(port) = self.port {
            config.web.port = port;
        }
        config.web.allow_folder_pick &= !self.no_folder_pick;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if args.verbose { "debug,tower_http=debug" } else { "info" })
        .with_target(false)
        .init();

    let mut config = AppConfig::load(&args.config)?;
    args.apply(&mut config);
    config.validate()?;

    let url = format!("http://{}:{}", config.web.host, config.web.port);
    info!(
        "sortwise-web {} on {} (model {} at {})",
        env!("CARGO_PKG_VERSION"),
        url,
        config.ai_engine.model,
        config.ai_engine.url
    );

    if args.open {
        if let Err(e) = browser_command(&url).spawn() {
            warn!("Could not launch a browser for {}: {}", url, e);
        }
    }

    sortwise::web::start_server(config).await
}

fn browser_command(url: &str) -> Command {
    if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/c", "start", url]);
        cmd
    } else {
        let mut cmd = Command::new(if cfg!(target_os = "macos") { "open" } else { "xdg-open" });
        cmd.arg(url);
        cmd
    }
}
