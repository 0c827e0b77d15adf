//! Portal Breaker native entry point
//!
//! Runs a headless demo game driven by the autopilot and prints a summary.
//! Usage: `portal-breaker [seed] [seconds] [store.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use portal_breaker::leaderboard::{LocalLeaderboard, MultiSink};
    use portal_breaker::persistence::FileStore;
    use portal_breaker::session::Session;
    use portal_breaker::sim::{GameEvent, GameState, autopilot_inputs};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(120.0);
    let store_path = args
        .next()
        .unwrap_or_else(|| "portal_breaker_demo.json".to_string());

    log::info!("Portal Breaker demo: seed {}, {} s, store {}", seed, seconds, store_path);

    let sink = MultiSink::new().with(LocalLeaderboard::open(FileStore::new(&store_path)));
    let mut session = Session::new(
        GameState::new(seed),
        Box::new(sink),
        Box::new(FileStore::new(&store_path)),
        "autopilot",
    );

    let dt = 1.0 / 60.0;
    let frames = (seconds / dt) as u32;
    let mut games = 0;
    let mut levels_cleared = 0;
    for _ in 0..frames {
        for input in autopilot_inputs(session.state()) {
            session.handle_input(input);
        }
        let snapshot = session.advance(dt);
        for event in &snapshot.events {
            match event {
                GameEvent::GameOver { score, level } => {
                    games += 1;
                    println!("Game over: score {} on level {}", score, level);
                }
                GameEvent::LevelComplete { level } => {
                    levels_cleared += 1;
                    println!("Level {} cleared", level);
                }
                _ => {}
            }
        }
    }

    let state = session.state();
    println!(
        "Finished {} games, cleared {} levels; current score {} (level {}), best {}",
        games,
        levels_cleared,
        state.score,
        state.level,
        session.best_score()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}
