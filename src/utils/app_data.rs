use crate::utils::letter_bag::{DEFAULT_DISTRIBUTION, DEFAULT_VALUES, LetterBag};
use crate::utils::letters::DEFAULT_ALPHABET;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "lexdex";
const CONFIG_FILE: &str = "config.json";

/// Engine configuration stored in the app data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Letters a word may contain; anything else is skipped on import
    #[serde(default = "default_alphabet")]
    pub alphabet: String,

    /// Tile counts, `"A:9 B:2 … _:2"` (`_` is the blank)
    #[serde(default = "default_distribution")]
    pub letter_distribution: String,

    /// Letter point values, `"A:1 B:3 …"`
    #[serde(default = "default_values")]
    pub letter_values: String,

    /// Letter pool an alphagram must be drawn from to be a type-two word
    #[serde(default = "default_type_two_letters")]
    pub type_two_letters: String,

    /// Seven-letter word whose combination count is the type-three threshold
    #[serde(default = "default_type_three_seven")]
    pub type_three_seven_reference: String,

    /// Eight-letter word whose combination count is the type-three threshold
    #[serde(default = "default_type_three_eight")]
    pub type_three_eight_reference: String,

    /// Longest word accepted on import
    #[serde(default = "default_max_word_length")]
    pub max_word_length: usize,
}

fn default_alphabet() -> String {
    DEFAULT_ALPHABET.to_string()
}

fn default_distribution() -> String {
    DEFAULT_DISTRIBUTION.to_string()
}

fn default_values() -> String {
    DEFAULT_VALUES.to_string()
}

fn default_type_two_letters() -> String {
    "AAADEEEEGIIILNNOORRSSTTU".to_string()
}

fn default_type_three_seven() -> String {
    "HUNTERS".to_string()
}

fn default_type_three_eight() -> String {
    "NOTIFIED".to_string()
}

fn default_max_word_length() -> usize {
    15
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alphabet: default_alphabet(),
            letter_distribution: default_distribution(),
            letter_values: default_values(),
            type_two_letters: default_type_two_letters(),
            type_three_seven_reference: default_type_three_seven(),
            type_three_eight_reference: default_type_three_eight(),
            max_word_length: default_max_word_length(),
        }
    }
}

impl EngineConfig {
    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load config from an explicit path, or return default if the file is missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
            let config: EngineConfig =
                serde_json::from_str(&content).context("Failed to parse config file")?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the app data directory
    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;
        self.save_to(&config_path)
    }

    /// Save config to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file {}", config_path.display()))?;
        Ok(())
    }

    /// Tile bag described by this config
    pub fn letter_bag(&self) -> crate::Result<LetterBag> {
        LetterBag::new(&self.letter_distribution, &self.letter_values)
    }

    fn validate(&self) -> Result<()> {
        if self.alphabet.is_empty() || !self.alphabet.bytes().all(|b| b.is_ascii_uppercase()) {
            anyhow::bail!("alphabet must be non-empty upper-case ASCII: '{}'", self.alphabet);
        }
        self.letter_bag()?;
        Ok(())
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(CONFIG_FILE))
}

/// Get the application data directory
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    let app_dir = base.join(APP_NAME);

    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}
