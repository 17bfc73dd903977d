//! toolchat CLI - chat with a tool-calling assistant from the terminal

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use toolchat::config::{loader, LoggingConfig};
use toolchat::{ChatSession, ConfigLoader, IngestOutcome, Providers, SessionMode, ToolchatConfig};
use toolchat_core::Role;
use toolchat_prebuilt::{EventHandler, LoopEvent};

#[derive(Parser)]
#[command(name = "toolchat")]
#[command(about = "Tool-augmented chat assistant with an optional translate stage", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Extra config file layered on top of the user and project files
    #[arg(short, long, global = true, env = "TOOLCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging for toolchat crates
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration to ~/.toolchat/toolchat.toml
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,

        /// Write ./.toolchat/toolchat.toml instead
        #[arg(long)]
        project: bool,
    },

    /// Interactive chat (the default)
    Chat {
        /// Session mode: assistant or pipeline
        #[arg(short, long)]
        mode: Option<String>,

        /// Start with translation switched on
        #[arg(short, long)]
        translate: bool,

        /// Documents to ingest before the first message
        #[arg(short, long = "doc")]
        docs: Vec<PathBuf>,
    },

    /// Ask one question and print the answer
    Ask {
        /// The question
        prompt: String,

        /// Session mode: assistant or pipeline
        #[arg(short, long)]
        mode: Option<String>,

        /// Route the answer through the translator (pipeline mode)
        #[arg(short, long)]
        translate: bool,

        /// Documents to ingest first
        #[arg(short, long = "doc")]
        docs: Vec<PathBuf>,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { force, project }) => {
            toolchat::logging::init(&LoggingConfig::default(), cli.verbose)?;
            let path = if project {
                loader::project_config_path()
            } else {
                loader::user_config_path()?
            };
            if loader::write_default_config(&path, force)? {
                println!("{} wrote {}", "✓".green(), path.display());
            } else {
                println!("{} already exists (use --force to overwrite)", path.display());
            }
        }

        Some(Commands::Version) => {
            println!("toolchat {}", toolchat::VERSION);
        }

        Some(Commands::Ask {
            prompt,
            mode,
            translate,
            docs,
        }) => {
            let config = load_config(cli.config.as_deref(), cli.verbose).await?;
            let mut session = start_session(config, mode.as_deref(), translate)?;
            ingest_all(&session, &docs).await?;

            let reply = session.submit(&prompt).await?;
            println!("{}", reply.answer);
            if !reply.completed {
                return Err(anyhow!("the interaction did not complete"));
            }
        }

        Some(Commands::Chat {
            mode,
            translate,
            docs,
        }) => {
            let config = load_config(cli.config.as_deref(), cli.verbose).await?;
            let mut session = start_session(config, mode.as_deref(), translate)?;
            ingest_all(&session, &docs).await?;
            repl(&mut session).await?;
        }

        None => {
            let config = load_config(cli.config.as_deref(), cli.verbose).await?;
            let mut session = start_session(config, None, false)?;
            repl(&mut session).await?;
        }
    }

    Ok(())
}

async fn load_config(explicit: Option<&Path>, verbose: bool) -> anyhow::Result<ToolchatConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = explicit {
        loader = loader.with_explicit(path);
    }
    let config = loader.load().await.context("loading configuration")?;
    toolchat::logging::init(&config.logging, verbose)?;
    Ok(config)
}

fn start_session(
    config: ToolchatConfig,
    mode: Option<&str>,
    translate: bool,
) -> anyhow::Result<ChatSession> {
    let providers = Providers::from_config(&config)?;
    let mut builder = ChatSession::builder(config, providers).with_events(progress_printer());
    if let Some(mode) = mode {
        builder = builder.with_mode(mode.parse::<SessionMode>()?);
    }
    let mut session = builder.build()?;
    if translate {
        session.set_translate(true);
    }
    Ok(session)
}

/// Announce capability calls before they run
fn progress_printer() -> EventHandler {
    Arc::new(|event: &LoopEvent| match event {
        LoopEvent::InvokingCapability { name, .. } => {
            println!("{}", format!("🔧 calling tool {} ...", name).cyan());
        }
        LoopEvent::CapabilityFinished {
            name, failed: true, ..
        } => {
            println!("{}", format!("⚠ tool {} reported an error", name).yellow());
        }
        LoopEvent::ResolverRetry { attempt, .. } => {
            println!("{}", format!("↻ unusable model output, retry {}", attempt).yellow());
        }
        _ => {}
    })
}

async fn ingest_all(session: &ChatSession, docs: &[PathBuf]) -> anyhow::Result<()> {
    for path in docs {
        let outcome = session
            .upload(path)
            .await
            .with_context(|| format!("uploading {}", path.display()))?;
        print_ingest(&outcome);
    }
    Ok(())
}

fn print_ingest(outcome: &IngestOutcome) {
    match outcome {
        IngestOutcome::Ingested { .. } => println!("{} {}", "✓".green(), outcome),
        IngestOutcome::AlreadyKnown { .. } => println!("{} {}", "•".dimmed(), outcome),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /translate on|off   route pipeline answers through the translator");
    println!("  /upload <path>      ingest a pdf, txt or md file");
    println!("  /history            show the conversation");
    println!("  /reset              forget the conversation (documents stay)");
    println!("  /quit               leave");
}

async fn repl(session: &mut ChatSession) -> anyhow::Result<()> {
    println!(
        "{} ({} mode, translate {}). Type /help for commands.",
        "toolchat".bold(),
        session.mode(),
        if session.translate() { "on" } else { "off" }
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", "you>".green().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            let mut parts = command.splitn(2, ' ');
            let name = parts.next().unwrap_or_default();
            let argument = parts.next().map(str::trim).unwrap_or_default();
            match name {
                "quit" | "exit" => break,
                "help" => print_help(),
                "reset" => {
                    session.reset();
                    println!("conversation cleared");
                }
                "history" => {
                    for turn in session.history() {
                        let who = match turn.role {
                            Role::User => "you".green(),
                            _ => "assistant".blue(),
                        };
                        println!("{}: {}", who, turn.text().unwrap_or_default());
                    }
                }
                "translate" => match argument {
                    "on" => {
                        session.set_translate(true);
                        if session.mode() == SessionMode::Assistant {
                            println!("translation only applies in pipeline mode (--mode pipeline)");
                        } else {
                            println!("translation on");
                        }
                    }
                    "off" => {
                        session.set_translate(false);
                        println!("translation off");
                    }
                    _ => println!("usage: /translate on|off"),
                },
                "upload" if !argument.is_empty() => match session.upload(Path::new(argument)).await {
                    Ok(outcome) => print_ingest(&outcome),
                    Err(e) => println!("{} {}", "✗".red(), e),
                },
                "upload" => println!("usage: /upload <path>"),
                other => println!("unknown command /{} (try /help)", other),
            }
            continue;
        }

        match session.submit(line).await {
            Ok(reply) if reply.completed => {
                let label = if reply.translated { "assistant (translated)>" } else { "assistant>" };
                println!("{} {}", label.blue().bold(), reply.answer);
            }
            Ok(reply) => println!("{} {}", "assistant>".red().bold(), reply.answer),
            Err(e) => println!("{} {}", "✗".red(), e),
        }
    }

    Ok(())
}
