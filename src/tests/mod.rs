pub mod test_config;
pub mod test_env;
pub mod test_layers;
pub mod test_optimizer;
