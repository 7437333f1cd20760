use serde::Deserialize;
use std::time::Duration;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Fixed delay before the fallible action flips its coin.
pub const DEFAULT_FALLIBLE_DELAY: Duration = Duration::from_millis(500);

/// Upper bound (exclusive) of the emitter's random inter-emit sleep.
pub const DEFAULT_EMITTER_MAX_DELAY: Duration = Duration::from_millis(1000);

const DEFAULT_NAME: &str = "tasklab";

#[derive(Debug, Default, Deserialize)]
pub struct TasklabConfig {
    pub app: Option<AppConfig>,
    pub timing: Option<TimingConfig>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Greeting name shown in the header.
    pub name: Option<String>,
    /// RNG seed for reproducible runs. Omit for entropy.
    pub seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TimingConfig {
    pub fallible_delay_ms: Option<u64>,
    pub emitter_max_delay_ms: Option<u64>,
}

impl TasklabConfig {
    /// Primary config path: `~/.tasklab/tasklab.toml`.
    #[must_use]
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".tasklab").join("tasklab.toml"))
    }

    /// Load the first config file that exists, if any.
    ///
    /// A missing file is not an error; read and parse failures are, so the
    /// caller can log them without aborting startup.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let mut candidates = Vec::new();
        if let Some(path) = Self::path() {
            candidates.push(path);
        }
        // Fallback for constrained environments without a home directory.
        candidates.push(PathBuf::from(".tasklab").join("tasklab.toml"));

        for path in candidates {
            if !path.exists() {
                continue;
            }
            return Self::load_from(&path).map(Some);
        }

        Ok(None)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.app
            .as_ref()
            .and_then(|app| app.name.as_deref())
            .unwrap_or(DEFAULT_NAME)
    }

    /// RNG seed, with `TASKLAB_SEED` taking precedence over the config file.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        Self::seed_with_env(env::var("TASKLAB_SEED").ok().as_deref(), self.app.as_ref())
    }

    fn seed_with_env(env_seed: Option<&str>, app: Option<&AppConfig>) -> Option<u64> {
        if let Some(raw) = env_seed {
            match raw.trim().parse::<u64>() {
                Ok(seed) => return Some(seed),
                Err(_) => {
                    tracing::warn!("Ignoring unparsable TASKLAB_SEED: {raw}");
                }
            }
        }
        app.and_then(|app| app.seed)
    }

    #[must_use]
    pub fn fallible_delay(&self) -> Duration {
        self.timing
            .as_ref()
            .and_then(|t| t.fallible_delay_ms)
            .map_or(DEFAULT_FALLIBLE_DELAY, Duration::from_millis)
    }

    #[must_use]
    pub fn emitter_max_delay(&self) -> Duration {
        let delay = self
            .timing
            .as_ref()
            .and_then(|t| t.emitter_max_delay_ms)
            .map_or(DEFAULT_EMITTER_MAX_DELAY, Duration::from_millis);
        // A zero bound would make the random sleep range empty.
        delay.max(Duration::from_millis(1))
    }
}
