use approx::assert_relative_eq;
use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

use rusty_bg::core::channel::Channel;
use rusty_bg::core::signal::DriveStep;
use rusty_bg::core::utils::TimeInterval;
use rusty_bg::simulator::config::{FusTarget, SimulationConfig};
use rusty_bg::simulator::simulator::run_simulation;
use rusty_bg::simulator::sweep::{critical_kappa, kappa_sweep};
use rusty_bg::simulator::SETTLING_TIME;

fn unmodulated(a1: f64, a2: f64, run_duration: f64) -> SimulationConfig {
    SimulationConfig {
        a1,
        a2,
        kappa: 0.0,
        run_duration,
        ..Default::default()
    }
}

fn scenario(kappa: f64) -> SimulationConfig {
    SimulationConfig {
        a1: 1.0,
        a2: 0.5,
        kappa,
        fus_start: 1.0,
        fus_dur: 1.0,
        run_duration: 3.0,
        ..Default::default()
    }
}

#[test]
fn test_stronger_drive_wins() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..20 {
        let a1 = rng.gen_range(0.02..2.0);
        let a2 = a1 * rng.gen_range(0.05..0.95);

        let record = run_simulation(&unmodulated(a1, a2, 1.0)).unwrap();
        assert_eq!(record.winner_at_end(), Some(Channel::One), "A1={}, A2={}", a1, a2);

        let record = run_simulation(&unmodulated(a2, a1, 1.0)).unwrap();
        assert_eq!(record.winner_at_end(), Some(Channel::Two), "A1={}, A2={}", a2, a1);
    }
}

#[test]
fn test_monotonic_in_drive() {
    let striatum_at_end = |a1: f64| {
        let record = run_simulation(&unmodulated(a1, 0.5, 1.0)).unwrap();
        record.striatum.last().unwrap().1[0]
    };
    let levels = [0.6, 0.8, 1.0, 1.5].map(striatum_at_end);
    assert!(levels.windows(2).all(|w| w[0] < w[1]), "{:?}", levels);
}

#[test]
fn test_attenuation_scenario() {
    let record = run_simulation(&scenario(0.8)).unwrap();

    let phases = record.phase_winners(SETTLING_TIME).unwrap();
    assert_eq!(phases.before, Some(Channel::One));
    assert_eq!(phases.during, Some(Channel::Two));
    assert_eq!(phases.after, Some(Channel::One));

    // One switch shortly after each edge of the pulse
    let switches = record.switches();
    assert_eq!(switches.len(), 2);
    assert_eq!(switches[0].from, Channel::One);
    assert_eq!(switches[0].to, Channel::Two);
    assert!(switches[0].time >= 1.0 && switches[0].time < 1.0 + SETTLING_TIME);
    assert_eq!(switches[1].to, Channel::One);
    assert!(switches[1].time >= 2.0 && switches[1].time < 2.0 + SETTLING_TIME);

    let (_, thalamus) = record.thalamus.last().unwrap();
    assert_relative_eq!(thalamus[0], 1.0, epsilon = 1e-3);
    assert_relative_eq!(thalamus[1], 0.0, epsilon = 1e-3);
}

#[test]
fn test_insufficient_attenuation_never_flips() {
    // A1 (1 - kappa) stays above A2
    let record = run_simulation(&scenario(0.3)).unwrap();
    assert!(record.switches().is_empty());
    let all = TimeInterval::build(SETTLING_TIME, 3.1).unwrap();
    assert_eq!(record.dominant_channel(&all), Some(Channel::One));
}

#[test]
fn test_attenuating_the_weaker_channel_keeps_the_winner() {
    let config = SimulationConfig {
        fus_channel: Channel::Two,
        ..scenario(1.0)
    };
    let record = run_simulation(&config).unwrap();
    assert!(record.switches().is_empty());
    assert_eq!(record.winner_at_end(), Some(Channel::One));
}

#[test]
fn test_zero_duration_pulse_is_baseline() {
    let pulse = SimulationConfig {
        fus_dur: 0.0,
        ..scenario(0.8)
    };
    let baseline = scenario(0.0);
    let with_pulse = run_simulation(&pulse).unwrap();
    let without = run_simulation(&baseline).unwrap();
    assert_eq!(with_pulse.times, without.times);
    assert_eq!(with_pulse.series(), without.series());
    assert_eq!(with_pulse.gpi_scale, without.gpi_scale);
}

#[test]
fn test_identical_configs_give_identical_records() {
    let config = SimulationConfig {
        noise_std: 0.02,
        seed: 3,
        ..scenario(0.8)
    };
    assert_eq!(run_simulation(&config).unwrap(), run_simulation(&config).unwrap());
}

#[test]
fn test_silenced_gpi_releases_both_channels() {
    let rest = run_simulation(&SimulationConfig {
        a1: 0.0,
        a2: 0.0,
        ..scenario(0.0)
    })
    .unwrap();
    let (_, rest) = rest.thalamus.last().unwrap();
    assert_relative_eq!(rest[0], rest[1]);

    let silenced = run_simulation(&SimulationConfig {
        gpi_scale_base: 0.0,
        ..scenario(0.0)
    })
    .unwrap();
    let (_, released) = silenced.thalamus.last().unwrap();
    assert!(released[0] > rest[0] + 0.1);
    assert!(released[1] > rest[1] + 0.1);
    assert!(silenced.gpi_scale.iter().all(|&scale| scale == 0.0));
}

fn resting_thalamus() -> f64 {
    let rest = run_simulation(&SimulationConfig {
        a1: 0.0,
        a2: 0.0,
        kappa: 0.0,
        run_duration: 2.0,
        ..Default::default()
    })
    .unwrap();
    rest.thalamus.last().unwrap().1[0]
}

#[test]
fn test_gpi_pulse_disinhibits_both_channels() {
    let rest = resting_thalamus();
    let config = SimulationConfig {
        a1: 0.85,
        a2: 0.65,
        fus_target: FusTarget::Gpi,
        fus_start: 0.6,
        fus_dur: 0.5,
        fus_depth: 0.6,
        run_duration: 1.6,
        ..Default::default()
    };
    let record = run_simulation(&config).unwrap();

    // Before the pulse the weaker channel is held below rest
    let [winner, loser] = record.thalamus.value_at(0.55).unwrap();
    assert!(winner > loser);
    assert!(loser < rest);

    // Inside the pulse both channels rise above rest, the stronger one still leading
    let [winner, loser] = record.thalamus.value_at(1.05).unwrap();
    assert!(winner > rest, "{} vs rest {}", winner, rest);
    assert!(loser > rest, "{} vs rest {}", loser, rest);
    assert!(winner > loser);

    // The selection comes back once the pulse is over
    let [winner, loser] = record.thalamus.value_at(1.6).unwrap();
    assert!(loser < rest);
    assert!(winner > loser);
}

#[test]
fn test_full_gpi_pulse_releases_the_selected_circuit() {
    let config = SimulationConfig {
        fus_target: FusTarget::Gpi,
        fus_depth: 1.0,
        ..scenario(0.0)
    };
    let record = run_simulation(&config).unwrap();

    let [_, loser] = record.thalamus.value_at(0.9).unwrap();
    assert!(loser < 0.1);

    // Without GPi output, both channels settle at the same released level
    let [winner, loser] = record.thalamus.value_at(1.9).unwrap();
    assert_relative_eq!(winner, 1.0 / 1.3, epsilon = 1e-3);
    assert_relative_eq!(loser, 1.0 / 1.3, epsilon = 1e-3);

    let [_, loser] = record.thalamus.value_at(2.9).unwrap();
    assert!(loser < 0.1);
    assert_eq!(record.winner_at_end(), Some(Channel::One));
}

#[test]
fn test_close_strong_drives_are_selected() {
    let record = run_simulation(&unmodulated(2.0, 1.9, 1.0)).unwrap();
    let (_, thalamus) = record.thalamus.last().unwrap();
    assert!(thalamus[0] > thalamus[1] + 0.1, "{:?}", thalamus);
    let (_, gpi) = record.gpi.last().unwrap();
    assert!(gpi[1] > 0.05, "{:?}", gpi);
}

#[test]
fn test_stepped_drive_hands_over_selection() {
    let config = SimulationConfig {
        drive_steps: vec![DriveStep {
            channel: Channel::Two,
            at: 1.0,
            value: 1.5,
        }],
        run_duration: 2.5,
        ..scenario(0.0)
    };
    let record = run_simulation(&config).unwrap();
    let switches = record.switches();
    assert_eq!(switches.len(), 1);
    assert_eq!(switches[0].to, Channel::Two);
    assert_eq!(record.winner_at_end(), Some(Channel::Two));
}

#[test]
fn test_critical_kappa() {
    let kappa = critical_kappa(&scenario(0.0), 1e-2).unwrap().unwrap();
    assert!(kappa > 0.45 && kappa < 0.6, "critical kappa {}", kappa);

    // Just below and well above the critical value
    let records = kappa_sweep(&scenario(0.0), &[kappa - 0.05, 0.8]).unwrap();
    assert_eq!(records[0].leader_at(1.999), Some(Channel::One));
    assert_eq!(records[1].leader_at(1.999), Some(Channel::Two));
}

#[test]
fn test_equal_drives_tie() {
    let config = SimulationConfig {
        a1: 0.7,
        a2: 0.7,
        ..scenario(0.0)
    };
    let record = run_simulation(&config).unwrap();
    assert_eq!(record.winner_at_end(), None);
    assert!(record.switches().is_empty());
}
