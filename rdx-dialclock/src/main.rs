use anyhow::Result;
use colored::Colorize;
use dialclock::prelude::*;
use dialclock::ENGINE_NAME;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize structured logging. RUST_LOG overrides the default level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // 2. Load the configuration (optionally from the first argument) and skins.
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = DialclockConfig::load(config_path.as_deref())?;
    let skins = SkinRegistry::from_config(&config)?;
    info!("Loaded {} skins.", skins.len());

    // 3. Build a demo document with a handful of placeholders.
    let document = demo_document(&config.marker);

    // 4. Create the engine and listen to its events.
    let engine = DialclockEngine::new(config, skins, RecordingSurface::new(), document);
    spawn_event_listener(&engine);

    // 5. Discover the placeholders and report what was built.
    engine.discover().await;
    print_clocks(&engine).await;

    // 6. Run the engine.
    engine.run().await?;

    Ok(())
}

fn demo_document(marker: &str) -> MemoryDocument {
    let mut document = MemoryDocument::new();
    document.insert_with_id("station", format!("{}:swissRail:85", marker));
    document.insert(format!("{}:chunkySwissOnBlack:60:noSeconds:9", marker));
    document.insert(format!("{}:nightandday:100::::logClock", marker));
    document.insert(format!("{}:fancy:40::-5:showDigital:logClockRev", marker));
    document.insert(format!("{}:broken:wide", marker));
    document.insert("unrelated");
    document
}

/// Spawns a task that logs the engine's event stream.
fn spawn_event_listener(engine: &DialclockEngine<RecordingSurface, MemoryDocument>) {
    let mut events = engine.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ClockEvent::Rendered { .. } => debug!("[CLOCK] => {:?}", event),
                _ => info!("[CLOCK] => {:?}", event),
            }
        }
    });
}

async fn print_clocks(engine: &DialclockEngine<RecordingSurface, MemoryDocument>) {
    let tracker = engine.tracker();
    let tracker = tracker.read().await;
    println!("{} is driving {} clocks:", ENGINE_NAME.cyan(), tracker.len());
    for (_, face) in tracker.iter() {
        println!(
            "  {:<24} skin {:<20} radius {:>6.1}",
            face.element().to_string().yellow(),
            face.skin_id(),
            face.display_radius()
        );
    }
}
