//! Materials terminal front-end
//!
//! Mounts a materials session against the REST backend (or an in-process
//! backend with `--in-memory`) and drives it from an interactive prompt.
//!
//! # Usage
//!
//! ```bash
//! # Backend from MATERIALS_API_BASE_URL (or .env), defaulting to localhost:8080
//! materials
//!
//! # Explicit backend with a request timeout
//! materials --base-url http://localhost:4000/api --timeout-secs 10
//!
//! # No backend at all
//! materials --in-memory
//! ```

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use materials_manager::config::parse_base_url;
use materials_manager::view::{render_materials, render_total, FormView};
use materials_manager::{
    ClientConfig, ConfirmPrompt, FieldName, HttpMaterialsApi, InMemoryMaterialsApi,
    MaterialId, MaterialsApi, MaterialsEvent, MaterialsSession, SystemClock,
};

#[derive(Parser, Debug)]
#[command(name = "materials")]
#[command(about = "Manage materials against a REST backend")]
struct Args {
    /// Backend base URL (overrides MATERIALS_API_BASE_URL)
    #[arg(long, short = 'u')]
    base_url: Option<String>,

    /// Request timeout in seconds (overrides MATERIALS_API_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Use an in-process backend instead of HTTP
    #[arg(long)]
    in_memory: bool,
}

#[derive(Debug, PartialEq)]
enum ReplCommand {
    List,
    Select(String),
    Add,
    Delete,
    Set { field: FieldName, value: String },
    Show(MaterialId),
    Total,
    Help,
    Quit,
}

const HELP: &str = "\
Commands:
  list                  show all materials
  select <#n|id>        select by list position or identifier
  add                   add a new material
  delete                delete the selected material
  set <field> <value>   edit name, color, volume, cost or deliveryDate
  show <id>             fetch one material from the server
  total                 show the total cost
  help                  this text
  quit                  exit";

fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let mut parts = line.trim().splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
    let rest = parts.next().map(str::trim).unwrap_or_default();

    match verb.as_str() {
        "list" | "ls" => Ok(ReplCommand::List),
        "add" | "new" => Ok(ReplCommand::Add),
        "delete" | "rm" => Ok(ReplCommand::Delete),
        "total" => Ok(ReplCommand::Total),
        "help" | "?" => Ok(ReplCommand::Help),
        "quit" | "exit" | "q" => Ok(ReplCommand::Quit),
        "select" | "sel" if !rest.is_empty() => Ok(ReplCommand::Select(rest.to_string())),
        "show" if !rest.is_empty() => Ok(ReplCommand::Show(MaterialId::new(rest))),
        "set" => {
            let mut args = rest.splitn(2, char::is_whitespace);
            let field = args
                .next()
                .filter(|f| !f.is_empty())
                .ok_or("usage: set <field> <value>")?
                .parse::<FieldName>()
                .map_err(|e| e.to_string())?;
            let value = args.next().unwrap_or_default().trim().to_string();
            Ok(ReplCommand::Set { field, value })
        }
        "" => Err(String::new()),
        other => Err(format!("unknown command '{}', try 'help'", other)),
    }
}

/// Confirmation on the terminal; anything but "y" counts as declined.
struct TerminalPrompt;

impl ConfirmPrompt for TerminalPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        print!("{} [y/N] ", message.yellow());
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => answer.trim().eq_ignore_ascii_case("y"),
            Err(_) => false,
        }
    }
}

fn build_api(args: &Args) -> Result<Arc<dyn MaterialsApi>> {
    if args.in_memory {
        return Ok(Arc::new(InMemoryMaterialsApi::new()));
    }

    let mut config = ClientConfig::from_env().context("Failed to load client configuration")?;
    if let Some(url) = &args.base_url {
        config.base_url = parse_base_url(url)?;
    }
    if let Some(secs) = args.timeout_secs {
        config.request_timeout = Some(Duration::from_secs(secs));
    }

    println!("Using materials backend at {}", config.base_url);
    Ok(Arc::new(HttpMaterialsApi::new(&config)?))
}

/// Resolve `#n` / `n` (1-based list position) or a literal identifier
fn resolve_selection(session: &MaterialsSession, target: &str) -> MaterialId {
    let position = target.trim_start_matches('#').parse::<usize>().ok();
    position
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| session.controller().collection().id_at(index).cloned())
        .unwrap_or_else(|| MaterialId::new(target))
}

async fn sync_and_render(session: &mut MaterialsSession) {
    if session.in_flight() == 0 {
        return;
    }
    session.settle().await;
    println!("{}\n", render_materials(session.controller()));
}

async fn run(session: &mut MaterialsSession) -> Result<()> {
    let mut editor = DefaultEditor::new().context("Failed to start line editor")?;
    let mut prompt = TerminalPrompt;

    loop {
        let line = match editor.readline("materials> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        let _ = editor.add_history_entry(line.as_str());

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                if !message.is_empty() {
                    println!("{}", message.red());
                }
                continue;
            }
        };

        let event = match command {
            ReplCommand::Quit => break,
            ReplCommand::Help => {
                println!("{}", HELP);
                continue;
            }
            ReplCommand::Total => {
                println!("{}", render_total(session.controller()));
                continue;
            }
            ReplCommand::List => None,
            ReplCommand::Show(id) => {
                match session.api().fetch_one(&id).await {
                    Ok(material) => println!("{}", FormView::from(&material).render()),
                    Err(err) => println!("{}", err.display_message().red()),
                }
                continue;
            }
            ReplCommand::Add => Some(MaterialsEvent::Add),
            ReplCommand::Delete => Some(MaterialsEvent::Delete),
            ReplCommand::Select(target) => Some(MaterialsEvent::Select(resolve_selection(
                session, &target,
            ))),
            ReplCommand::Set { field, value } => {
                Some(MaterialsEvent::FieldBlur { field, raw: value })
            }
        };

        if let Some(event) = event {
            session.handle_event(event, &mut prompt);
        }
        println!("{}\n", render_materials(session.controller()));
        sync_and_render(session).await;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let api = build_api(&args)?;
    let mut session = MaterialsSession::new(api, Arc::new(SystemClock));

    session.initialize();
    session.settle().await;
    println!("{}\n", render_materials(session.controller()));

    run(&mut session).await
}
