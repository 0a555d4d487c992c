//! Listen to an event stream and survive server restarts.
//!
//! Demonstrates:
//! - Building a ConnectionManager with a greeting and error sink
//! - Receiving decoded events across reconnects
//! - Watching lifecycle state changes
//!
//! Usage:
//!   cargo run --example listen
//!   cargo run --example listen -- ws://localhost:9595/events/users
//!   cargo run --example listen -- --debug

// ============================================================================
// Imports
// ============================================================================

use resocket::{ConnectionManager, Greeting, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

const DEFAULT_ENDPOINT: &str = "ws://localhost:9595/events/users";

// ============================================================================
// Args
// ============================================================================

/// Command-line arguments.
#[derive(Debug, Clone)]
struct Args {
    debug: bool,
    endpoint: String,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self {
            debug: args.iter().any(|a| a == "--debug"),
            endpoint: args
                .iter()
                .find(|a| !a.starts_with("--"))
                .cloned()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned()),
        }
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "resocket=debug,listen=debug"
    } else {
        "resocket=info,listen=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<()> {
    println!("=== listen: {} ===\n", args.endpoint);

    let (manager, mut inbound) = ConnectionManager::builder()
        .endpoint(args.endpoint)
        .greeting(Greeting::new("Yay connection complete!"))
        .on_error(|e| warn!(error = %e, "Reported"))
        .build()?;

    manager.connect();

    let mut status = manager.subscribe();
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = *status.borrow_and_update();
            info!(state = %current.state, generation = %current.generation, "State changed");
        }
    });

    loop {
        tokio::select! {
            event = inbound.recv() => {
                let Some(event) = event else { break };
                println!("[Event] {}", event.value());
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nShutting down...");
                break;
            }
        }
    }

    manager.shutdown().await;
    Ok(())
}
