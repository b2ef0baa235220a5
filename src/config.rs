use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::Deserialize;

const CONFIG_ENV: &str = "UBASH_CONFIG";
const LOG_ENV: &str = "UBASH_LOG";

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
	pub prompt: PromptConfig,
	pub log: LogConfig,
	pub history: HistoryConfig,
	pub parser: ParserConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
	pub color: bool,
	pub show_cwd: bool,
	pub symbol: String,
}

impl Default for PromptConfig {
	fn default() -> Self {
		PromptConfig { color: true, show_cwd: true, symbol: "$ ".to_string() }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
	pub level: String,
}

impl Default for LogConfig {
	fn default() -> Self {
		LogConfig { level: "warn".to_string() }
	}
}

impl LogConfig {
	/// `UBASH_LOG` wins over the file; unknown names fall back to `warn`.
	pub fn level_filter(&self) -> LevelFilter {
		env::var(LOG_ENV).ok()
			.and_then(|level| level.parse().ok())
			.or_else(|| self.level.parse().ok())
			.unwrap_or(LevelFilter::Warn)
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
	pub enabled: bool,
	pub file: Option<PathBuf>,
	pub max_entries: usize,
}

impl Default for HistoryConfig {
	fn default() -> Self {
		HistoryConfig { enabled: true, file: None, max_entries: 1000 }
	}
}

/// Upper bound on tokens per line.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
	pub max_tokens: usize,
}

impl Default for ParserConfig {
	fn default() -> Self {
		ParserConfig { max_tokens: 256 }
	}
}

impl Config {
	/// Loads `$UBASH_CONFIG`, else `~/.config/ubash/config.toml`. A missing
	/// file gives the defaults; a malformed one is reported and ignored.
	pub fn load() -> Self {
		match Self::path() {
			Some(path) => Self::load_from(&path),
			None => Self::default(),
		}
	}

	fn path() -> Option<PathBuf> {
		if let Some(path) = env::var_os(CONFIG_ENV) {
			return Some(PathBuf::from(path));
		}
		let home = env::var_os("HOME")?;
		Some(Path::new(&home).join(".config/ubash/config.toml"))
	}

	pub fn load_from(path: &Path) -> Self {
		let content = match fs::read_to_string(path) {
			Ok(content) => content,
			Err(_) => return Self::default(),
		};
		match Self::from_toml(&content) {
			Ok(config) => config,
			Err(e) => {
				eprintln!("ubash: config parse error in {}: {}", path.display(), e);
				Self::default()
			}
		}
	}

	pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(content)
	}

	pub fn history_path(&self) -> Option<PathBuf> {
		if !self.history.enabled {
			return None;
		}
		if let Some(file) = &self.history.file {
			return Some(file.clone());
		}
		let home = env::var_os("HOME")?;
		Some(Path::new(&home).join(".ubash_history"))
	}
}
