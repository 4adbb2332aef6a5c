use crate::config::RunConfig;
use crate::env::{Environment, FlappyConfig, FlappyEnv, FLAP, NOOP};
use crate::error::AgentError;

fn course(config: FlappyConfig) -> FlappyEnv {
    FlappyEnv::new(config).unwrap()
}

/// Zero gravity and a fixed gap height, so the bird hovers at its start height.
fn hovering(gap_y: f32) -> FlappyEnv {
    course(FlappyConfig {
        gravity: 0.0,
        gap_min: gap_y,
        gap_max: gap_y,
        seed: Some(1),
        ..FlappyConfig::default()
    })
}

fn run_until_done<E: Environment>(env: &mut E, action: usize, limit: usize) -> Option<usize> {
    for tick in 1..=limit {
        env.step(action);
        if env.is_done() {
            return Some(tick);
        }
    }
    None
}

#[test]
fn test_reset_state() {
    let env = hovering(300.0);

    assert_eq!(env.state_size(), 4);
    assert_eq!(env.action_count(), 2);
    assert!(!env.is_done());
    assert_eq!(env.score(), 0);
    assert_eq!(env.pipes().len(), 1);
    assert_eq!(env.pipes()[0].x, 800.0);

    let state = env.observe();
    assert_eq!(state.to_vec(), vec![0.5, 0.0, 0.875, 0.5]);
}

#[test]
fn test_flap_sets_upward_velocity() {
    let mut env = course(FlappyConfig { seed: Some(2), ..FlappyConfig::default() });

    env.step(FLAP);

    let expected_velocity = -350.0 + 1000.0 / 60.0;
    assert!((env.bird_velocity() - expected_velocity).abs() < 1e-3);
    assert!((env.bird_y() - (300.0 + expected_velocity / 60.0)).abs() < 1e-3);
    assert_eq!(env.reward(), 0.1);
    assert!(!env.is_done());
    assert!((env.observe()[1] - expected_velocity / 1000.0).abs() < 1e-6);
}

#[test]
fn test_falling_to_the_floor_ends_the_episode() {
    let mut env = course(FlappyConfig { seed: Some(3), ..FlappyConfig::default() });

    let ticks = run_until_done(&mut env, NOOP, 200).expect("bird never hit the floor");

    assert!((40..=50).contains(&ticks), "hit the floor after {} ticks", ticks);
    assert_eq!(env.reward(), -100.0);
    assert!(env.bird_y() + 15.0 > 600.0);
    assert_eq!(env.score(), ticks as u64 - 1);

    // Stepping a finished episode changes nothing
    let y = env.bird_y();
    env.step(FLAP);
    assert_eq!(env.bird_y(), y);
    assert!(env.is_done());
    assert_eq!(env.reward(), -100.0);
}

#[test]
fn test_flying_off_the_top_ends_the_episode() {
    let mut env = course(FlappyConfig { seed: Some(4), ..FlappyConfig::default() });

    let ticks = run_until_done(&mut env, FLAP, 200).expect("bird never hit the ceiling");

    assert!((45..=60).contains(&ticks), "hit the ceiling after {} ticks", ticks);
    assert!(env.bird_y() - 15.0 < 0.0);
    assert_eq!(env.reward(), -100.0);
}

#[test]
fn test_reset_restores_start() {
    let mut env = course(FlappyConfig { seed: Some(5), ..FlappyConfig::default() });
    run_until_done(&mut env, NOOP, 200);
    assert!(env.is_done());

    env.reset();

    assert!(!env.is_done());
    assert_eq!(env.bird_y(), 300.0);
    assert_eq!(env.bird_velocity(), 0.0);
    assert_eq!(env.score(), 0);
    assert_eq!(env.pipes_passed(), 0);
    assert_eq!(env.pipes().len(), 1);
}

#[test]
fn test_passing_through_the_gap() {
    let mut env = hovering(300.0);

    assert_eq!(run_until_done(&mut env, NOOP, 300), None);

    assert_eq!(env.score(), 300);
    assert_eq!(env.pipes_passed(), 1);
    assert_eq!(env.obstacles_passed(), 1);
    assert_eq!(env.reward(), 0.1);
    // The first pair has scrolled off and been dropped
    assert!(env.pipes().iter().all(|pipe| pipe.x >= -50.0));
    assert!(env.pipes().len() >= 2);
}

#[test]
fn test_hitting_a_pipe() {
    // Opening spans 25..175 while the bird hovers at 285..315
    let mut env = hovering(100.0);

    let ticks = run_until_done(&mut env, NOOP, 400).expect("bird never hit the pipe");

    assert!((190..=205).contains(&ticks), "hit the pipe after {} ticks", ticks);
    assert_eq!(env.reward(), -100.0);
    assert_eq!(env.pipes_passed(), 0);
}

#[test]
fn test_observation_tracks_next_pipe() {
    let mut env = hovering(300.0);
    let first = env.observe()[2];

    env.step(NOOP);
    let second = env.observe()[2];

    assert!(second < first);
    assert!((first - second - 200.0 / 60.0 / 800.0).abs() < 1e-5);
}

#[test]
fn test_seeded_courses_repeat() {
    let config = FlappyConfig { seed: Some(77), ..FlappyConfig::default() };
    let mut a = course(config.clone());
    let mut b = course(config);

    for _ in 0..200 {
        a.step(FLAP);
        b.step(FLAP);
        a.step(NOOP);
        b.step(NOOP);
        a.step(NOOP);
        b.step(NOOP);
    }

    assert_eq!(a.pipes(), b.pipes());
    assert_eq!(a.observe(), b.observe());
}

#[test]
fn test_invalid_config() {
    assert!(FlappyEnv::new(FlappyConfig { time_step: 0.0, ..FlappyConfig::default() }).is_err());
    assert!(FlappyEnv::new(FlappyConfig { gap_min: 400.0, gap_max: 200.0, ..FlappyConfig::default() }).is_err());
    assert!(FlappyEnv::new(FlappyConfig { bird_start_y: 900.0, ..FlappyConfig::default() }).is_err());
}

#[test]
fn test_gap_range_must_fit_the_world() {
    // Finite bounds whose difference overflows f32
    let result = RunConfig::from_json_str(r#"{ "env": { "gap_min": -3.0e38, "gap_max": 3.0e38 } }"#);
    assert!(matches!(result, Err(AgentError::InvalidParameter { .. })));

    let invalid = [
        FlappyConfig { gap_min: -10.0, ..FlappyConfig::default() },
        FlappyConfig { gap_max: 601.0, ..FlappyConfig::default() },
        FlappyConfig { gravity: f32::INFINITY, ..FlappyConfig::default() },
        FlappyConfig { death_reward: f32::NAN, ..FlappyConfig::default() },
    ];
    for config in invalid {
        assert!(matches!(FlappyEnv::new(config), Err(AgentError::InvalidParameter { .. })));
    }

    let edges = FlappyConfig { gap_min: 0.0, gap_max: 600.0, seed: Some(8), ..FlappyConfig::default() };
    let env = FlappyEnv::new(edges).unwrap();
    assert!((0.0..=600.0).contains(&env.pipes()[0].gap_y));
}
