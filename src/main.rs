//! Generate and digitize one event with the default detector

use saeta_sim::{SimEvent, TrackCount};

/// Seed used by the demo run
const DEMO_SEED: u64 = 20_240_101;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Saeta Sim starting...");

    let mut sim = match SimEvent::new(DEMO_SEED, true, TrackCount::Auto) {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("Event generation failed: {e}");
            std::process::exit(1);
        }
    };
    sim.event().print_saetas();

    let digitization = sim.digitize();
    for (i, (coords, digits)) in digitization
        .hit_coords
        .iter_rows()
        .zip(digitization.hit_digits.iter_rows())
        .enumerate()
    {
        log::info!("Track #{i} hit_coords: {coords:?}");
        log::info!("Track #{i} hit_digits: {digits:?}");
    }
}
