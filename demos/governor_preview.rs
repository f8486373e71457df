// demos/governor_preview.rs
// Run with:
//   cargo run --example governor_preview

use idle_accrual::systems::calibration::{SyntheticPlayer, preview};
use idle_accrual::systems::emission_governor::{EmissionConfig, GovernorTuning};

fn main() {
    let schedule = EmissionConfig::default().schedule();
    let tuning = GovernorTuning::default();

    println!("== Emission schedule ==");
    println!(
        "target {:.2} coins/user/min, daily cap {}",
        schedule.coins_per_user_min, schedule.daily_cap
    );

    for raw_per_sec in [0.0, 20.0, 63.0, 120.0, 250.0, 1_000.0] {
        let player = SyntheticPlayer { raw_per_sec, jitter: 0.15, seed: 7 };
        let out = preview(schedule, tuning, player, 1_000);
        println!(
            "raw {:>7.1}/s -> difficulty {:.3}, observed {:>9.1}/min, windows {:>3}, converged {}",
            raw_per_sec, out.theta, out.obs.observed_per_min, out.iters, out.converged
        );
    }
}
