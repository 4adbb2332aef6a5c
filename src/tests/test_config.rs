use std::io::Write;

use tempfile::NamedTempFile;

use crate::activations::Activation;
use crate::config::{AgentConfig, RunConfig};
use crate::env::FlappyConfig;
use crate::error::AgentError;
use crate::optimizer::OptimizerKind;

#[test]
fn test_defaults_are_valid() {
    let config = RunConfig::default();
    config.validate().unwrap();

    assert_eq!(config.agent.hidden_layers, vec![64, 64, 32]);
    assert_eq!(config.agent.replay_capacity, 50_000);
    assert_eq!(config.agent.batch_size, 32);
    assert_eq!(config.agent.gamma, 0.95);
    assert_eq!(config.agent.optimizer, OptimizerKind::Adam);
    assert_eq!(config.env.width, 800.0);
}

#[test]
fn test_layer_sizes_and_activations() {
    let config = AgentConfig {
        hidden_layers: vec![8, 4],
        hidden_activation: Activation::Tanh,
        ..AgentConfig::new(3, 5)
    };

    assert_eq!(config.layer_sizes(), vec![3, 8, 4, 5]);
    assert_eq!(config.activations(), vec![Activation::Tanh, Activation::Tanh, Activation::Linear]);
}

#[test]
fn test_agent_validation() {
    let invalid = [
        AgentConfig { gamma: 1.0, ..AgentConfig::default() },
        AgentConfig { gamma: -0.1, ..AgentConfig::default() },
        AgentConfig { epsilon: 0.001, ..AgentConfig::default() },
        AgentConfig { epsilon_decay: 0.0, ..AgentConfig::default() },
        AgentConfig { learning_rate: f32::NAN, ..AgentConfig::default() },
        AgentConfig { batch_size: 0, ..AgentConfig::default() },
        AgentConfig { replay_capacity: 16, batch_size: 32, ..AgentConfig::default() },
        AgentConfig { learn_every: 0, ..AgentConfig::default() },
        AgentConfig { action_count: 0, ..AgentConfig::default() },
    ];
    for config in invalid {
        assert!(
            matches!(config.validate(), Err(AgentError::InvalidParameter { .. })),
            "accepted {:?}",
            config
        );
    }

    AgentConfig { gamma: 0.0, hidden_layers: vec![], ..AgentConfig::default() }.validate().unwrap();
}

#[test]
fn test_partial_json_falls_back_to_defaults() {
    let config = RunConfig::from_json_str(
        r#"{
            "agent": { "hidden_layers": [32, 16], "hidden_activation": "tanh", "seed": 9 },
            "trainer": { "episodes": 20 }
        }"#,
    )
    .unwrap();

    assert_eq!(config.agent.hidden_layers, vec![32, 16]);
    assert_eq!(config.agent.hidden_activation, Activation::Tanh);
    assert_eq!(config.agent.seed, Some(9));
    assert_eq!(config.agent.batch_size, 32);
    assert_eq!(config.trainer.episodes, 20);
    assert_eq!(config.env, FlappyConfig::default());
}

#[test]
fn test_json_errors() {
    assert!(matches!(RunConfig::from_json_str("{ not json"), Err(AgentError::Config(_))));
    assert!(matches!(
        RunConfig::from_json_str(r#"{ "agent": { "state_size": 6 } }"#),
        Err(AgentError::InvalidParameter { .. })
    ));
    assert!(matches!(
        RunConfig::from_json_str(r#"{ "env": { "pipe_gap": -1.0 } }"#),
        Err(AgentError::InvalidParameter { .. })
    ));
}

#[test]
fn test_round_trip_through_file() {
    let mut config = RunConfig::default();
    config.agent.seed = Some(123);
    config.trainer.episodes = 3;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(config.to_json_pretty().unwrap().as_bytes()).unwrap();

    let loaded = RunConfig::from_json_file(file.path()).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = RunConfig::from_json_file(dir.path().join("missing.json"));
    assert!(matches!(result, Err(AgentError::Io(_))));
}
