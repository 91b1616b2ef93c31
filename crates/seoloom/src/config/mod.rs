pub mod loader;
pub mod schema;

pub use loader::{
    apply_env_overrides, default_config_path, expand_home, load_config, load_config_from_str,
    resolve_config, validate_config,
};
pub use schema::{
    Config, GenerationConfig, LlmConfig, LlmProvider, RetryConfig, SeoConfig, SerpConfig,
};
