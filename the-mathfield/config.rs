use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to parse model config: {0}")]
  Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ModelConfig {
  /// Entering an empty branch that must show content inserts a
  /// placeholder and puts the caret on it.
  pub placeholder_on_entry:     bool,
  /// Leaps stop in empty branches as well as on placeholders.
  pub leap_into_empty_branches: bool,
  /// Skipping over an opening (closing) fence lands after (before) its
  /// balanced counterpart.
  pub match_fences_on_skip:     bool,
  pub placeholder_symbol:       String,
}

impl Default for ModelConfig {
  fn default() -> Self {
    Self {
      placeholder_on_entry:     true,
      leap_into_empty_branches: true,
      match_fences_on_skip:     true,
      placeholder_symbol:       the_atom::tree::DEFAULT_PLACEHOLDER.to_string(),
    }
  }
}

impl ModelConfig {
  pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(source)?)
  }
}
