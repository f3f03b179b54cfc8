//! mpns-send - deliver a batch of MPNS notifications.

mod batch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mpns_push::{Dispatcher, HttpTransport};

use crate::batch::Batch;

#[derive(Parser)]
#[command(name = "mpns-send")]
#[command(about = "Deliver Windows Phone push notifications", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send every notification in a batch file
    Send {
        /// Path to the TOML batch file
        batch: PathBuf,
    },

    /// Print the rendered payloads without sending
    Render {
        /// Path to the TOML batch file
        batch: PathBuf,
    },
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<ExitCode> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Send { batch } => cmd_send(Batch::load(&batch)?).await,
        Commands::Render { batch } => cmd_render(&Batch::load(&batch)?),
    }
}

async fn cmd_send(batch: Batch) -> color_eyre::eyre::Result<ExitCode> {
    let transport = HttpTransport::from_config(&batch.dispatcher);
    let mut dispatcher = Dispatcher::from_config(transport, &batch.dispatcher);

    for message in batch.messages() {
        dispatcher.enqueue(message);
    }

    tracing::info!(
        count = dispatcher.count_queued(),
        timeout_secs = dispatcher.timeout().as_secs(),
        "dispatching batch"
    );
    let report = dispatcher.dispatch_all().await;

    for (index, outcome) in report.outcomes.iter().enumerate() {
        let message = dispatcher.message_at(index)?;
        let outcome = outcome.to_string();
        match dispatcher.response_at(index)? {
            Some(status) => println!(
                "{:<16} {}  notification={:?} subscription={:?} device={:?}",
                outcome,
                message.destination,
                status.notification_status,
                status.subscription_status,
                status.device_connection_status,
            ),
            None => println!("{:<16} {}", outcome, message.destination),
        }
    }

    println!(
        "\n{} delivered, {} failed",
        report.delivered(),
        report.failed()
    );

    if dispatcher.count_failed() > 0 {
        println!("\nFailed destinations:");
        for destination in dispatcher.failed_ids() {
            println!("  {destination}");
        }
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_render(batch: &Batch) -> color_eyre::eyre::Result<ExitCode> {
    for message in batch.messages() {
        println!("=== {} ({})", message.destination, message.kind);
        match message.render() {
            Some(payload) => match payload.as_str() {
                Some(text) => println!("{text}"),
                None => println!("<{} bytes of binary payload>", payload.len()),
            },
            None => println!("<no payload>"),
        }
    }

    Ok(ExitCode::SUCCESS)
}
