use anyhow::Result;
use colored::Colorize;
use dialclock::prelude::*;
use dialclock::{ENGINE_NAME, VERSION as LIB_VERSION};
use rustyline::highlight::Highlighter;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow;
use std::env;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

type ShellEngine = DialclockEngine<RecordingSurface, MemoryDocument>;

/// A custom helper struct for rustyline that enables syntax highlighting.
#[derive(Completer, Helper, Hinter, Validator)]
struct ShellHighlighter;

impl Highlighter for ShellHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if let Some((command, rest)) = line.split_once(' ') {
            Cow::Owned(format!("{} {}", command.yellow().bold(), rest.yellow()))
        } else {
            Cow::Owned(line.yellow().bold().to_string())
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn print_banner() {
    if env::var("QUIET_MODE").is_ok() {
        return;
    }
    let rule = "-".repeat(72);
    println!("{}", "  dialshell :: clock faces on a retained surface".cyan());
    println!("{}", rule.dimmed());
    println!("          Shell   v{:<8} Library   v{:<8}", SHELL_VERSION, LIB_VERSION);
    println!(
        "{}",
        "    Distributed under the MIT OR Apache-2.0 license. Use at your own risk.".dimmed()
    );
    println!("{}", rule.dimmed());
}

/// Prints lifecycle events. Renders are too frequent to echo.
fn spawn_event_listener(engine: &ShellEngine) {
    let mut events = engine.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if !matches!(event, ClockEvent::Rendered { .. }) {
                println!("\n<-- [CLOCK EVENT] {:?}\n>> ", event);
            }
        }
    });
}

async fn add_placeholder(engine: &ShellEngine, token: &str, id: Option<&str>) {
    {
        let document = engine.document();
        let mut document = document.write().await;
        match id {
            Some(id) => document.insert_with_id(id, token),
            None => document.insert(token),
        };
    }
    let created = engine.discover().await;
    if created.is_empty() {
        println!("--> No clock was created from '{}'.", token);
        return;
    }
    let tracker = engine.tracker();
    let tracker = tracker.read().await;
    for id in created {
        if let Some(face) = tracker.get(id) {
            println!(
                "--> Clock '{}' built with skin '{}'.",
                face.element(),
                face.skin_id()
            );
        }
    }
}

async fn list_clocks(engine: &ShellEngine) {
    let document = engine.document();
    let document = document.read().await;
    let tracker = engine.tracker();
    let tracker = tracker.read().await;
    if tracker.is_empty() {
        println!("No clocks.");
        return;
    }
    println!("Clocks:");
    for (id, face) in tracker.iter() {
        let state = if tracker.lookup(face.element()) != Some(id) {
            "replaced".dimmed()
        } else if !document.contains(face.element()) {
            "detached".red()
        } else if face.is_active() {
            "running".green()
        } else {
            "stopped".yellow()
        };
        println!(
            "  {:<28} {:<20} r={:<8.1} renders={:<6} {}",
            face.element().as_str(),
            face.skin_id(),
            face.display_radius(),
            face.renders(),
            state
        );
    }
}

async fn write_svg(engine: &ShellEngine, path: Option<&str>) -> Result<()> {
    let size = {
        let tracker = engine.tracker();
        let tracker = tracker.read().await;
        tracker
            .iter()
            .map(|(_, face)| face.display_radius() * 2.0)
            .fold(0.0, f64::max)
    };
    let svg = engine.surface().read().await.to_svg(size, size);
    match path {
        Some(path) => {
            std::fs::write(path, svg)?;
            println!("--> Wrote {}.", path);
        }
        None => print!("{}", svg),
    }
    Ok(())
}

fn print_help() {
    println!("Available commands:");
    println!("  add <token> [id]      - Adds a placeholder element and discovers it.");
    println!("  list                  - Shows every clock and its state.");
    println!("  start <id>            - Restarts a stopped clock.");
    println!("  stop <id>             - Stops a clock.");
    println!("  remove <id>           - Removes a clock's host element.");
    println!("  svg [path]            - Prints or writes the surface as SVG.");
    println!("  skins                 - Lists the available skins.");
    println!("  exit                  - Quits the shell.");
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = DialclockConfig::load(config_path.as_deref())?;
    let skins = SkinRegistry::from_config(&config)?;
    let marker = config.marker.clone();
    let engine =
        DialclockEngine::new(config, skins, RecordingSurface::new(), MemoryDocument::new());
    spawn_event_listener(&engine);

    info!("Spawning {} in the background...", ENGINE_NAME.cyan());
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let dispatcher = engine.spawn_dispatcher(shutdown_rx);

    let mut rl = Editor::new()?;
    rl.set_helper(Some(ShellHighlighter));

    println!(
        "{} is running. Placeholders start with '{}'. Type 'help' for commands or 'exit' to quit.",
        ENGINE_NAME.cyan(),
        marker
    );

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(_) => break,
        };
        rl.add_history_entry(line.as_str())?;
        let args = line.split_whitespace().collect::<Vec<_>>();
        let Some(command) = args.first() else {
            continue;
        };

        match *command {
            "add" => match args.get(1) {
                Some(token) => add_placeholder(&engine, token, args.get(2).copied()).await,
                None => println!("Usage: add <TOKEN> [ID]  (e.g. add {}:swissRail:85)", marker),
            },
            "list" => list_clocks(&engine).await,
            "start" => match args.get(1) {
                Some(id) if engine.start(&(*id).into()).await => {
                    println!("--> Clock '{}' started.", id)
                }
                Some(id) => println!("Error: no clock in '{}'.", id),
                None => println!("Usage: start <ID>"),
            },
            "stop" => match args.get(1) {
                Some(id) if engine.stop(&(*id).into()).await => {
                    println!("--> Clock '{}' stopped.", id)
                }
                Some(id) => println!("Error: no clock in '{}'.", id),
                None => println!("Usage: stop <ID>"),
            },
            "remove" => match args.get(1) {
                Some(id) if engine.document().write().await.remove(&(*id).into()) => {
                    println!("--> Element '{}' removed. Its clock will stop on its next tick.", id)
                }
                Some(id) => println!("Error: no element '{}'.", id),
                None => println!("Usage: remove <ID>"),
            },
            "svg" => {
                if let Err(error) = write_svg(&engine, args.get(1).copied()).await {
                    println!("Error: {}", error);
                }
            }
            "skins" => {
                println!("Available skins:");
                for id in engine.skins().ids() {
                    println!("  {}", id);
                }
            }
            "help" => print_help(),
            "exit" => break,
            _ => println!("Unknown command: '{}'. Type 'help'.", line.trim()),
        }
    }

    println!("Exiting dialshell...");
    shutdown_tx.send(()).ok();
    dispatcher.await.ok();
    Ok(())
}
