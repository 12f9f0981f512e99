//! Command-line configuration management.
//!
//! Merges command-line flags over environment variables and validates the
//! result before any bracket is built.

use bracket_engine::EngineConfig;
use bracket_engine::db::DatabaseConfig;
use bracket_engine::tournament::{BracketError, TeamInput, TournamentFormat, TournamentRequest};
use chrono::{DateTime, Utc};
use pico_args::Arguments;
use std::path::PathBuf;

/// Everything one run of the tool needs
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// JSON roster file: `[{"id": 1, "rating": 1850.0}, ...]`
    pub teams_path: PathBuf,
    pub format: TournamentFormat,
    pub name: String,
    pub group_size: Option<usize>,
    pub advancement_per_group: Option<usize>,
    pub max_teams: Option<usize>,
    pub start_date: Option<DateTime<Utc>>,
    /// Fixed RNG seed for reproducible Swiss shuffles
    pub seed: Option<u64>,
    /// Write to the database instead of printing the plan
    pub persist: bool,
    pub database: DatabaseConfig,
    pub engine: EngineConfig,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required option {var}: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

impl CliConfig {
    /// Parse flags, falling back to environment variables
    ///
    /// # Errors
    ///
    /// Returns error if `--teams` is missing, a flag value does not parse, or
    /// the engine defaults are unusable.
    pub fn from_args(pargs: &mut Arguments) -> Result<Self, ConfigError> {
        let teams_path: PathBuf =
            pargs
                .value_from_str("--teams")
                .map_err(|_| ConfigError::MissingRequired {
                    var: "--teams".to_string(),
                    hint: "Pass a JSON file with the roster".to_string(),
                })?;

        let format = pargs
            .opt_value_from_str::<_, String>("--format")
            .map_err(|e| invalid("--format", e))?
            .or_else(|| std::env::var("BRACKET_FORMAT").ok())
            .map_or(TournamentFormat::SingleElimination, |name| {
                TournamentFormat::from_name(&name)
            });

        let name = pargs
            .opt_value_from_str("--name")
            .map_err(|e| invalid("--name", e))?
            .unwrap_or_else(|| "Tournament".to_string());

        let start_date = pargs
            .opt_value_from_fn("--start", |value| DateTime::parse_from_rfc3339(value))
            .map_err(|e| invalid("--start", e))?
            .map(|date| date.with_timezone(&Utc));

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = pargs
            .opt_value_from_str::<_, String>("--db-url")
            .map_err(|e| invalid("--db-url", e))?
        {
            database.database_url = url;
        }

        let config = CliConfig {
            teams_path,
            format,
            name,
            group_size: pargs
                .opt_value_from_str("--group-size")
                .map_err(|e| invalid("--group-size", e))?,
            advancement_per_group: pargs
                .opt_value_from_str("--advance")
                .map_err(|e| invalid("--advance", e))?,
            max_teams: pargs
                .opt_value_from_str("--max-teams")
                .map_err(|e| invalid("--max-teams", e))?,
            start_date,
            seed: pargs
                .opt_value_from_str("--seed")
                .map_err(|e| invalid("--seed", e))?,
            persist: pargs.contains("--persist"),
            database,
            engine: EngineConfig::from_env(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let TournamentFormat::Custom(name) = &self.format {
            return Err(ConfigError::Invalid {
                var: "--format".to_string(),
                reason: format!("unknown format '{name}'"),
            });
        }

        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "--name".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        self.engine.validate().map_err(|e| {
            let var = match &e {
                BracketError::InvalidSchedule { setting: "round spacing", .. } => {
                    "BRACKET_ROUND_SPACING_HOURS"
                }
                BracketError::InvalidSchedule { setting: "match spacing", .. } => {
                    "BRACKET_MATCH_SPACING_HOURS"
                }
                BracketError::InvalidSchedule { .. } => "BRACKET_START_DELAY_HOURS",
                BracketError::InvalidAdvancement { .. } => "BRACKET_ADVANCEMENT_PER_GROUP",
                _ => "BRACKET_DEFAULT_GROUP_SIZE",
            };
            invalid(var, e)
        })
    }

    /// Request for `teams` under these options
    pub fn request(&self, teams: Vec<TeamInput>) -> TournamentRequest {
        let mut request = TournamentRequest::new(&self.name, self.format.clone(), teams);
        request.group_size = self.group_size;
        request.advancement_per_group = self.advancement_per_group;
        request.max_teams = self.max_teams;
        request.start_date = self.start_date;
        request
    }
}

/// Parse a roster file body
pub fn parse_roster(body: &str) -> Result<Vec<TeamInput>, ConfigError> {
    serde_json::from_str(body).map_err(|e| invalid("--teams", e))
}

fn invalid(var: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        var: var.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn args(list: &[&str]) -> Arguments {
        Arguments::from_vec(list.iter().map(OsString::from).collect())
    }

    #[test]
    fn test_parse_full_flags() {
        let mut pargs = args(&[
            "--teams",
            "roster.json",
            "--format",
            "gsl",
            "--name",
            "Autumn Open",
            "--group-size",
            "4",
            "--start",
            "2026-11-01T18:00:00Z",
            "--seed",
            "7",
            "--persist",
        ]);
        let config = CliConfig::from_args(&mut pargs).unwrap();

        assert_eq!(config.teams_path, PathBuf::from("roster.json"));
        assert_eq!(config.format, TournamentFormat::Gsl);
        assert_eq!(config.name, "Autumn Open");
        assert_eq!(config.group_size, Some(4));
        assert_eq!(config.seed, Some(7));
        assert!(config.persist);
        assert_eq!(
            config.start_date.map(|d| d.to_rfc3339()),
            Some("2026-11-01T18:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_missing_teams_flag() {
        let mut pargs = args(&["--format", "swiss"]);
        assert!(matches!(
            CliConfig::from_args(&mut pargs),
            Err(ConfigError::MissingRequired { .. })
        ));
    }

    #[test]
    fn test_bad_values_are_rejected() {
        let mut pargs = args(&["--teams", "r.json", "--group-size", "four"]);
        assert!(matches!(
            CliConfig::from_args(&mut pargs),
            Err(ConfigError::Invalid { var, .. }) if var == "--group-size"
        ));

        let mut pargs = args(&["--teams", "r.json", "--format", "ladder"]);
        assert!(matches!(
            CliConfig::from_args(&mut pargs),
            Err(ConfigError::Invalid { var, .. }) if var == "--format"
        ));

        let mut pargs = args(&["--teams", "r.json", "--start", "tomorrow"]);
        assert!(CliConfig::from_args(&mut pargs).is_err());
    }

    #[test]
    fn test_request_carries_options() {
        let mut pargs = args(&["--teams", "r.json", "--format", "group_stage_playoffs", "--advance", "1"]);
        let config = CliConfig::from_args(&mut pargs).unwrap();
        let request = config.request(vec![TeamInput::new(1, 1200.0), TeamInput::unrated(2)]);

        assert_eq!(request.format, TournamentFormat::GroupStagePlayoffs);
        assert_eq!(request.advancement_per_group, Some(1));
        assert_eq!(request.teams.len(), 2);
    }

    #[test]
    fn test_unusable_engine_schedule_names_variable() {
        let mut pargs = args(&["--teams", "r.json"]);
        let mut config = CliConfig::from_args(&mut pargs).unwrap();
        config.engine.round_spacing_hours = -4;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { var, .. }) if var == "BRACKET_ROUND_SPACING_HOURS"
        ));
    }

    #[test]
    fn test_parse_roster() {
        let teams = parse_roster(r#"[{"id": 3, "rating": 1500.5}, {"id": 4}]"#).unwrap();
        assert_eq!(teams, vec![TeamInput::new(3, 1500.5), TeamInput::unrated(4)]);
        assert!(parse_roster("{}").is_err());
    }
}
