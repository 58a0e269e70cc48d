//! Juggle Sim entry point
//!
//! Headless runner: drives the simulation at a fixed frame rate and logs
//! what happens. Rendering hosts embed the library instead.
//!
//! Usage: `juggle-sim [settings.json] [seconds] [timed|apex]`

#[cfg(not(target_arch = "wasm32"))]
use juggle_sim::sim::{Hand, JuggleEvent, Juggler};
#[cfg(not(target_arch = "wasm32"))]
use juggle_sim::{JugglingSettings, Result, TriggerStrategy};

/// Frame rate the headless host pretends to render at
#[cfg(not(target_arch = "wasm32"))]
const HOST_FPS: f32 = 120.0;
#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_SECONDS: f32 = 10.0;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
struct Tally {
    left_throws: u32,
    right_throws: u32,
    catches: u32,
    apexes: u32,
    misses: u32,
}

#[cfg(not(target_arch = "wasm32"))]
impl Tally {
    fn record(&mut self, event: &JuggleEvent) {
        match event {
            JuggleEvent::Thrown { from: Hand::Left, .. } => self.left_throws += 1,
            JuggleEvent::Thrown { from: Hand::Right, .. } => self.right_throws += 1,
            JuggleEvent::Caught { .. } => self.catches += 1,
            JuggleEvent::Apex { .. } => self.apexes += 1,
            JuggleEvent::Missed { hand } => {
                log::debug!("{hand} hand timer fired empty");
                self.misses += 1;
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let mut settings = match args.next() {
        Some(path) => JugglingSettings::load(path)?,
        None => JugglingSettings::default(),
    };
    let seconds = args
        .next()
        .and_then(|s| s.parse::<f32>().ok())
        .filter(|s| *s > 0.0)
        .unwrap_or(DEFAULT_SECONDS);
    if let Some(strategy) = args.next() {
        settings.strategy = strategy.parse::<TriggerStrategy>()?;
    }

    let mut juggler = Juggler::configure(settings)?;
    let mut tally = Tally::default();

    let dt = 1.0 / HOST_FPS;
    let frames = (seconds * HOST_FPS).round() as u32;
    for _ in 0..frames {
        juggler.tick(dt);
        for event in juggler.events() {
            tally.record(event);
        }
    }

    log::info!(
        "{:.1}s simulated: {} throws ({} left, {} right), {} catches, {} apexes, {} empty-hand misses",
        seconds,
        tally.left_throws + tally.right_throws,
        tally.left_throws,
        tally.right_throws,
        tally.catches,
        tally.apexes,
        tally.misses,
    );
    for ball in juggler.balls() {
        log::info!(
            "Ball {}: ({:.1}, {:.1}) {}",
            ball.name,
            ball.pos.x,
            ball.pos.y,
            if ball.is_airborne() { "airborne" } else { "resting" }
        );
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Juggle Sim (headless) starting...");

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts drive the library directly
}
