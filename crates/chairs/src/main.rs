use chairs::prelude::*;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Startup settings
// ---------------------------------------------------------------------------

/// Starting players when `CHAIRS_PLAYERS` is unset.
const NUM_PLAYERS: usize = 4;

/// How events reach stdout.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Narration {
    Prose,
    Json,
}

fn players_from_env() -> Result<usize, ChairsError> {
    match std::env::var("CHAIRS_PLAYERS") {
        Ok(raw) => raw.trim().parse::<usize>().map_err(|_| {
            ChairsError::from(chairs::StateError::InvalidConfig(format!(
                "CHAIRS_PLAYERS is not a number: {raw}"
            )))
        }),
        Err(_) => Ok(NUM_PLAYERS),
    }
}

fn narration_from_env() -> Narration {
    match std::env::var("CHAIRS_EVENTS") {
        Ok(v) if v.eq_ignore_ascii_case("json") => Narration::Json,
        _ => Narration::Prose,
    }
}

fn print_event(event: &GameEvent, narration: Narration) {
    match narration {
        Narration::Prose => match event {
            GameEvent::MusicStarted { .. } | GameEvent::MusicStopped { .. } => {
                println!("\n------------------------------------------");
                println!(" {event}");
                println!("------------------------------------------");
            }
            _ => println!("{event}"),
        },
        Narration::Json => match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "event not serializable"),
        },
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let narration = narration_from_env();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let game = MusicalChairs::builder()
        .players(players_from_env()?)
        .events(tx)
        .build()?;

    if narration == Narration::Prose {
        println!("-----------------------------------------------");
        println!("Welcome to concurrent musical chairs!");
        println!("-----------------------------------------------");
        println!(
            "The game starts with {} players and {} chairs",
            game.config().players,
            game.config().initial_seats()
        );
    }

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            print_event(&event, narration);
        }
    });

    let result = game.run().await;
    // The session (and its sender) is gone once the game returns.
    let _ = printer.await;

    let report = result?;
    if narration == Narration::Prose {
        println!(
            "Musical chairs finished: {} is the winner",
            report.outcome.winner
        );
    }
    Ok(())
}
