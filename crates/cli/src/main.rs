//! PubSub CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Load configuration**: read a `.env` file if present, then build a
//!    [`request::Config`] from `PUBSUB_*` environment variables.
//! 2. **Wire observability**: see [`observability`].
//! 3. **Construct infrastructure**: one [`transport::ReqwestTransport`] per
//!    pool, injected into an [`operations::PubSub`].
//! 4. **Run one operation** and print `{"result", "status", "error"}` as JSON
//!    on stdout. Ctrl-C cancels the request in flight.

mod observability;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use operations::PubSub;
use request::{CancellationToken, Config, RequestFailure, StatusResponse};
use serde::Serialize;
use tracing::info;
use transport::ReqwestTransport;

#[derive(Parser, Debug)]
#[command(name = "pubsub")]
#[command(about = "Channel-group registry and subscribe client")]
#[command(version)]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, env = "PUBSUB_LOG_JSON", default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the channels registered in a channel group.
    List {
        #[arg(long)]
        group: String,
    },

    /// Add channels to a channel group.
    Add {
        #[arg(long)]
        group: String,
        /// Channel names, comma-separated or repeated.
        #[arg(long = "channel", value_delimiter = ',')]
        channels: Vec<String>,
    },

    /// Remove channels from a channel group.
    Remove {
        #[arg(long)]
        group: String,
        #[arg(long = "channel", value_delimiter = ',')]
        channels: Vec<String>,
    },

    /// Delete a channel group.
    Delete {
        #[arg(long)]
        group: String,
    },

    /// Run one subscribe long-poll and print the envelope.
    Subscribe {
        #[arg(long = "channel", value_delimiter = ',')]
        channels: Vec<String>,
        #[arg(long = "group", value_delimiter = ',')]
        groups: Vec<String>,
        /// Resume position from a previous envelope (0 starts fresh).
        #[arg(long, default_value_t = 0)]
        timetoken: i64,
        #[arg(long, default_value = "")]
        region: String,
        #[arg(long)]
        filter: Option<String>,
        /// Presence heartbeat in seconds.
        #[arg(long, default_value_t = 0)]
        heartbeat: u32,
        /// Also receive presence events.
        #[arg(long)]
        presence: bool,
    },
}

/// Printed on stdout for every command, success or failure.
#[derive(Serialize)]
struct Report<T: Serialize> {
    result: Option<T>,
    status: StatusResponse,
    error: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let telemetry = observability::init(cli.log_json)?;
    let outcome = run(cli.command).await;
    telemetry.shutdown();
    outcome
}

async fn run(command: Command) -> anyhow::Result<()> {
    let config = Config::from_env().context("loading PUBSUB_* configuration")?;
    let transport = ReqwestTransport::for_non_subscribe(&config)?;
    let subscribe_transport = ReqwestTransport::for_subscribe(&config)?;
    info!(origin = %config.origin, uuid = %config.uuid, "client configured");

    let pubsub = PubSub::new(config, Arc::new(transport), Arc::new(subscribe_transport));
    let token = cancel_on_ctrl_c();

    match command {
        Command::List { group } => {
            let outcome = pubsub
                .list_channels_in_group()
                .channel_group(group)
                .cancellation(token)
                .execute()
                .await;
            emit(outcome)
        }
        Command::Add { group, channels } => {
            let outcome = pubsub
                .add_channels_to_group()
                .channel_group(group)
                .channels(channels)
                .cancellation(token)
                .execute()
                .await;
            emit(outcome)
        }
        Command::Remove { group, channels } => {
            let outcome = pubsub
                .remove_channels_from_group()
                .channel_group(group)
                .channels(channels)
                .cancellation(token)
                .execute()
                .await;
            emit(outcome)
        }
        Command::Delete { group } => {
            let outcome = pubsub
                .delete_group()
                .channel_group(group)
                .cancellation(token)
                .execute()
                .await;
            emit(outcome)
        }
        Command::Subscribe {
            channels,
            groups,
            timetoken,
            region,
            filter,
            heartbeat,
            presence,
        } => {
            let outcome = pubsub
                .subscribe_request()
                .channels(channels)
                .channel_groups(groups)
                .timetoken(timetoken)
                .region(region)
                .filter_expression(filter.unwrap_or_default())
                .heartbeat(heartbeat)
                .with_presence(presence)
                .cancellation(token)
                .execute()
                .await;
            emit(outcome)
        }
    }
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    token
}

/// Prints the report and turns a failed request into the process error.
fn emit<T: Serialize>(outcome: Result<(T, StatusResponse), RequestFailure>) -> anyhow::Result<()> {
    let (report, failure) = match outcome {
        Ok((result, status)) => (
            Report {
                result: Some(result),
                status,
                error: None,
            },
            None,
        ),
        Err(failure) => (
            Report {
                result: None,
                status: failure.status.clone(),
                error: Some(failure.error.to_string()),
            },
            Some(failure),
        ),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    match failure {
        Some(failure) => Err(failure.into()),
        None => Ok(()),
    }
}
