//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name inside the config directory.
pub const CONFIG_FILE: &str = "config.ron";

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Dimension shape and world-side switches.
    pub world: WorldConfig,
    /// Server connection and ingest settings.
    pub network: NetworkConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Dimension shape and world-side switches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Lowest block y. Must be a multiple of 16.
    pub min_y: i32,
    /// Number of block layers. Must be a positive multiple of 16.
    pub height: i32,
    /// Whether the dimension has a sky.
    pub has_skylight: bool,
    /// Compute light locally when a chunk batch carries blocks but no light.
    pub calculate_light: bool,
    /// Blend biomes with the cached noise accessor.
    pub noise_biomes: bool,
    /// Hashed seed fed to the noise accessor.
    pub biome_seed: u64,
}

/// Server connection and ingest settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub server_address: String,
    pub server_port: u16,
    /// Chunk radius the server is asked to send.
    pub view_distance: u32,
    /// World updates applied per second.
    pub updates_per_second: u32,
    /// Threads decoding and applying incoming chunk data.
    pub ingest_threads: usize,
}

/// Debug/development settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter (e.g. "info", "debug,lattice_world=trace").
    pub log_level: String,
    /// Re-check packed coordinates against their unpacked parts.
    pub verify_coordinates: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            min_y: 0,
            height: 256,
            has_skylight: true,
            calculate_light: true,
            noise_biomes: false,
            biome_seed: 0,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            server_address: "127.0.0.1".to_string(),
            server_port: 25565,
            view_distance: 8,
            updates_per_second: 20,
            ingest_threads: 2,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            verify_coordinates: false,
        }
    }
}

impl WorldConfig {
    /// Checks the dimension shape.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `min_y` or `height` is not a whole
    /// number of sections, or `height` is not positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_y % 16 != 0 {
            return Err(ConfigError::Invalid {
                field: "world.min_y",
                reason: format!("{} is not a multiple of 16", self.min_y),
            });
        }
        if self.height <= 0 || self.height % 16 != 0 {
            return Err(ConfigError::Invalid {
                field: "world.height",
                reason: format!("{} is not a positive multiple of 16", self.height),
            });
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Platform config directory for lattice, e.g. `~/.config/lattice`.
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("lattice"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;
        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        config.world.validate()?;
        Ok(config)
    }
}
