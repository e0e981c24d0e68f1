use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub board: BoardConfig,
    pub network: NetworkConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub size: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig { size: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Widths of the hidden layers.
    pub hidden: Vec<usize>,
    pub learning_rate: f64,
    /// Plies searched before the network scores a position.
    pub cutoff_depth: usize,
    /// Key of the network in the weight file.
    pub name: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            hidden: vec![18],
            learning_rate: 0.1,
            cutoff_depth: 2,
            name: "value".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Opponent {
    Minimax,
    Random,
    Network,
    Human,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub games: usize,
    pub opponent: Opponent,
    pub alternate_first: bool,
    pub seed: Option<u64>,
    /// Worker threads for the minimax opponent, 0 means one per CPU.
    pub threads: usize,
    pub weights: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            games: 100,
            opponent: Opponent::Random,
            alternate_first: true,
            seed: None,
            threads: 1,
            weights: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // rows are labelled with a single digit
        if self.board.size < 2 || self.board.size > 10 {
            return Err(ConfigError::Validation(
                "board.size must be in [2, 10]".into(),
            ));
        }
        if self.network.hidden.contains(&0) {
            return Err(ConfigError::Validation(
                "network.hidden layers must have at least one node".into(),
            ));
        }
        if self.network.learning_rate <= 0.0 {
            return Err(ConfigError::Validation(
                "network.learning_rate must be > 0".into(),
            ));
        }
        if self.network.cutoff_depth == 0 {
            return Err(ConfigError::Validation(
                "network.cutoff_depth must be >= 1".into(),
            ));
        }
        if self.network.name.is_empty() {
            return Err(ConfigError::Validation(
                "network.name must not be empty".into(),
            ));
        }
        if self.session.games == 0 {
            return Err(ConfigError::Validation(
                "session.games must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Layer widths of the value network: the encoded board, the hidden layers, one output.
    pub fn layout(&self) -> Vec<usize> {
        let mut layout = vec![self.board.size * self.board.size + 1];
        layout.extend(&self.network.hidden);
        layout.push(1);
        layout
    }

    /// A TOML document with every default value spelled out.
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
        assert_eq!(config.layout(), vec![10, 18, 1]);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[network]
hidden = [12, 6]

[session]
opponent = "minimax"
seed = 9
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.layout(), vec![10, 12, 6, 1]);
        assert_eq!(config.session.opponent, Opponent::Minimax);
        assert_eq!(config.session.seed, Some(9));
        // Other fields should be defaults
        assert!((config.network.learning_rate - 0.1).abs() < 1e-12);
        assert_eq!(config.session.games, 100);
        assert_eq!(config.board.size, 3);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_unknown_opponent_is_rejected() {
        assert!(toml::from_str::<AppConfig>("[session]\nopponent = \"oracle\"").is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.board.size = 1;
        assert!(config.validate().is_err());
        config.board.size = 11;
        assert!(config.validate().is_err());
        config.board.size = 4;
        assert!(config.validate().is_ok());
        assert_eq!(config.layout()[0], 17);

        let mut config = AppConfig::default();
        config.network.learning_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.network.cutoff_depth = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.network.hidden = vec![4, 0];
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.session.games = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[board]
size = 4

[session]
games = 7
weights = "value.json"
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.board.size, 4);
        assert_eq!(config.session.games, 7);
        assert_eq!(config.session.weights, Some(PathBuf::from("value.json")));
        assert_eq!(config.network.cutoff_depth, 2);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[network]\nlearning_rate = -1.0\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml().unwrap();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
