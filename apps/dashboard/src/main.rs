use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roster_core::{config::load_settings, ActionOutcome, EngineEvent, RosterEngine};
use shared::domain::{SortField, UserId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod render;
mod session;

use render::render_view;
use session::{SessionCommand, HELP};

#[derive(Parser, Debug)]
#[command(about = "Browse, search and like users from the user directory")]
struct Cli {
    /// Directory base URL, overrides settings.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the dashboard as JSON.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List {
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long)]
        sort: Option<SortField>,
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    Like {
        user_id: String,
    },
    Dislike {
        user_id: String,
    },
    Session,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref()).context("failed to load settings")?;
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    let engine = RosterEngine::from_settings(settings).context("failed to build engine")?;

    engine
        .fetch_all()
        .await
        .context("failed to fetch users from directory")?;

    match cli.command {
        Command::List {
            query,
            sort,
            desc,
            page,
        } => {
            engine.set_query(query).await;
            if let Some(field) = sort {
                engine.toggle_sort(field).await;
                if desc {
                    engine.toggle_sort(field).await;
                }
            }
            engine.set_page(page).await;
        }
        Command::Like { user_id } => {
            let outcome = engine.like(&UserId::new(user_id.clone())).await?;
            report_outcome("like", &user_id, outcome);
        }
        Command::Dislike { user_id } => {
            let outcome = engine.dislike(&UserId::new(user_id.clone())).await?;
            report_outcome("dislike", &user_id, outcome);
        }
        Command::Session => return run_session(engine, cli.json).await,
    }

    print_view(&engine, cli.json).await
}

fn report_outcome(action: &str, user_id: &str, outcome: ActionOutcome) {
    match outcome {
        ActionOutcome::Applied => println!("{action} applied for user {user_id}"),
        ActionOutcome::UnknownUser => println!("no user {user_id} in the current roster"),
        ActionOutcome::InFlight => println!("{action} for user {user_id} is already pending"),
        ActionOutcome::Discarded => {
            println!("{action} confirmed but user {user_id} left the roster")
        }
    }
}

async fn print_view(engine: &RosterEngine, json: bool) -> Result<()> {
    let view = engine.view().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render_view(&view));
    }
    Ok(())
}

async fn run_session(engine: Arc<RosterEngine>, json: bool) -> Result<()> {
    let mut events = engine.subscribe_events();
    let event_log = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                EngineEvent::RequestFailed { operation, message } => {
                    warn!("session: {operation} failed: {message}")
                }
                other => debug!("session: event {other:?}"),
            }
        }
    });

    println!("{HELP}");
    print_view(&engine, json).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match SessionCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match command {
            SessionCommand::Search(query) => engine.set_query(query).await,
            SessionCommand::Sort(field) => engine.toggle_sort(field).await,
            SessionCommand::Page(page) => engine.set_page(page).await,
            SessionCommand::Like(user_id) => match engine.like(&user_id).await {
                Ok(outcome) => report_outcome("like", user_id.as_str(), outcome),
                Err(err) => println!("{err}"),
            },
            SessionCommand::Dislike(user_id) => match engine.dislike(&user_id).await {
                Ok(outcome) => report_outcome("dislike", user_id.as_str(), outcome),
                Err(err) => println!("{err}"),
            },
            SessionCommand::Refresh => {
                if let Err(err) = engine.fetch_all().await {
                    println!("{err}");
                }
            }
            SessionCommand::Show => {}
            SessionCommand::Help => {
                println!("{HELP}");
                continue;
            }
            SessionCommand::Quit => break,
        }

        print_view(&engine, json).await?;
    }

    event_log.abort();
    Ok(())
}
