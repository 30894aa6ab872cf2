// Configuration loading and parsing (league.toml, sources.toml, secrets.toml).

use brocelona_core::schema::SheetSchema;
use brocelona_core::scorer::ScorerParser;
use brocelona_core::standings::GoalCreditPolicy;
use brocelona_core::LeagueOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment switch that selects the published spreadsheet as the source.
pub const REMOTE_ENV_VAR: &str = "USE_GOOGLE_SHEETS";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub schema: SchemaConfig,
    pub scoring: ScoringConfig,
    pub display: DisplayConfig,
    pub sources: SourcesConfig,
    pub secrets: SecretsConfig,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire league.toml file.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    schema: SchemaConfig,
    scoring: ScoringConfig,
    display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub teams: Vec<TeamConfig>,
}

/// A team is any match-sheet column whose header contains `keyword`.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamConfig {
    pub keyword: String,
    /// Any color name ratatui understands ("red", "lightblue", "#ffcc00").
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaConfig {
    pub week_column: String,
    pub round_column: String,
    pub team_column: String,
    pub player_column: String,
    pub week_marker: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    pub own_goal_marker: String,
    #[serde(default)]
    pub goal_credit: GoalCreditPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    pub leaderboard_size: usize,
}

// ---------------------------------------------------------------------------
// sources.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub local: LocalPaths,
    pub remote: RemoteSheets,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalPaths {
    pub matches: String,
    pub attendance: String,
}

/// Sheet (tab) ids of the two tables inside the published spreadsheet.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSheets {
    pub match_gid: String,
    pub attendance_gid: String,
}

// ---------------------------------------------------------------------------
// secrets.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecretsConfig {
    pub spreadsheet_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Derived settings
// ---------------------------------------------------------------------------

impl Config {
    /// Column conventions handed to the schema mapper.
    pub fn sheet_schema(&self) -> SheetSchema {
        SheetSchema {
            week_column: self.schema.week_column.clone(),
            round_column: self.schema.round_column.clone(),
            team_keywords: self.league.teams.iter().map(|t| t.keyword.clone()).collect(),
            team_column: self.schema.team_column.clone(),
            player_column: self.schema.player_column.clone(),
            week_marker: self.schema.week_marker.clone(),
        }
    }

    pub fn league_options(&self) -> LeagueOptions {
        LeagueOptions {
            parser: ScorerParser::new(self.scoring.own_goal_marker.clone()),
            goal_credit: self.scoring.goal_credit,
        }
    }

    /// Configured spreadsheet URL, if any (blank counts as unset).
    pub fn spreadsheet_url(&self) -> Option<&str> {
        self.secrets
            .spreadsheet_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    /// Whether to read from the published spreadsheet. `env_flag` is the
    /// value of `USE_GOOGLE_SHEETS`, if set.
    pub fn use_remote(&self, env_flag: Option<&str>) -> bool {
        let forced = env_flag.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
        forced || self.spreadsheet_url().is_some()
    }

    /// Color configured for the team whose keyword appears in `team`.
    pub fn team_color(&self, team: &str) -> Option<&str> {
        self.league
            .teams
            .iter()
            .find(|t| team.contains(t.keyword.as_str()))
            .and_then(|t| t.color.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml`,
/// `config/sources.toml`, and (optionally) `config/secrets.toml`, all
/// relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_file: LeagueFile = parse_file(&league_path)?;

    // --- sources.toml (required) ---
    let sources_path = config_dir.join("sources.toml");
    let sources: SourcesConfig = parse_file(&sources_path)?;

    // --- secrets.toml (optional) ---
    let secrets_path = config_dir.join("secrets.toml");
    let secrets = if secrets_path.exists() {
        parse_file(&secrets_path)?
    } else {
        SecretsConfig::default()
    };

    let config = Config {
        league: league_file.league,
        schema: league_file.schema,
        scoring: league_file.scoring,
        display: league_file.display,
        sources,
        secrets,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the crate root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.teams.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.teams".into(),
            message: "at least one team is required".into(),
        });
    }
    for (i, team) in config.league.teams.iter().enumerate() {
        if team.keyword.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("league.teams[{i}].keyword"),
                message: "must not be empty".into(),
            });
        }
    }

    let required: &[(&str, &str)] = &[
        ("schema.week_column", &config.schema.week_column),
        ("schema.round_column", &config.schema.round_column),
        ("schema.team_column", &config.schema.team_column),
        ("schema.player_column", &config.schema.player_column),
        ("schema.week_marker", &config.schema.week_marker),
        ("scoring.own_goal_marker", &config.scoring.own_goal_marker),
        ("sources.local.matches", &config.sources.local.matches),
        ("sources.local.attendance", &config.sources.local.attendance),
        ("sources.remote.match_gid", &config.sources.remote.match_gid),
        ("sources.remote.attendance_gid", &config.sources.remote.attendance_gid),
    ];
    for (name, val) in required {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    if config.display.leaderboard_size == 0 {
        return Err(ConfigError::ValidationError {
            field: "display.leaderboard_size".into(),
            message: "must be greater than 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
