use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{config::parse_ordering, load_settings, EmulatorClient, ViewModel};
use shared::domain::{Command, Pane};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Drive a remote register-machine emulator and print its panes")]
struct Args {
    /// Overrides the configured emulator server url.
    #[arg(long)]
    server_url: Option<String>,
    /// `last_write_wins` or `latest_issued`.
    #[arg(long)]
    ordering: Option<String>,
    /// Print the final view model as JSON.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Assemble a source file into ROM.
    AssembleRom { file: PathBuf },
    /// Assemble a source file into Flash.
    AssembleFlash { file: PathBuf },
    /// Run single cycles, waiting for each to settle.
    Step {
        #[arg(default_value_t = 1)]
        cycles: u32,
    },
    Run,
    Reset,
    Flush,
    /// Only refresh the panes.
    Refresh,
}

async fn read_source(file: &PathBuf) -> Result<String> {
    tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read assembly source '{}'", file.display()))
}

async fn execute(client: &EmulatorClient, action: Action) -> Result<()> {
    match action {
        Action::AssembleRom { file } => {
            let source = read_source(&file).await?;
            client.dispatch(Command::AssembleRom { source }).settled().await;
        }
        Action::AssembleFlash { file } => {
            let source = read_source(&file).await?;
            client
                .dispatch(Command::AssembleFlash { source })
                .settled()
                .await;
        }
        Action::Step { cycles } => {
            for _ in 0..cycles {
                client.run_cycle().settled().await;
                if client.snapshot().error.visible {
                    break;
                }
            }
        }
        Action::Run => client.run().settled().await,
        Action::Reset => client.reset().settled().await,
        Action::Flush => client.flush().settled().await,
        Action::Refresh => client.refresh_all().settled().await,
    }
    Ok(())
}

fn render_panes(view: &ViewModel) -> String {
    let mut out = String::new();
    for pane in [Pane::Rom, Pane::Ram, Pane::Flash, Pane::Registers] {
        out.push_str(&format!("== {} ==\n", pane.label()));
        let content = view.pane(pane);
        out.push_str(content);
        if !content.ends_with('\n') {
            out.push('\n');
        }
    }
    if view.error.visible {
        out.push_str(&format!("== Error ==\n{}\n", view.error.message));
    }
    out
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(server_url) = args.server_url {
        client_core::config::validate_server_url(&server_url)?;
        settings.server_url = server_url;
    }
    if let Some(raw) = args.ordering.as_deref() {
        settings.ordering =
            parse_ordering(raw).with_context(|| format!("unknown ordering policy '{raw}'"))?;
    }
    tracing::info!(server_url = %settings.server_url, ordering = ?settings.ordering, "connecting");

    let client = EmulatorClient::from_settings(&settings)?;
    execute(&client, args.action).await?;

    let view = client.snapshot();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render_panes(&view));
    }
    Ok(())
}
