use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use caloscope_core::domain::{
    common::{ApiConfig, CaloscopeConfig, HistoryConfig, SessionConfig},
    food_history::{HistoryScope, SortOrder},
};
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "caloscope", version, about = "Browse and manage your food history")]
pub struct Args {
    #[command(flatten)]
    pub api: ApiArgs,

    #[command(flatten)]
    pub session: SessionArgs,

    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct ApiArgs {
    #[arg(
        long = "api-url",
        env = "CALOSCOPE_API_URL",
        default_value = "http://localhost:8000/api",
        global = true
    )]
    pub api_url: String,

    #[arg(
        long = "timeout-secs",
        env = "CALOSCOPE_TIMEOUT_SECS",
        default_value_t = 15,
        global = true
    )]
    pub timeout_secs: u64,

    /// How long a finished fetch keeps identical fetches suppressed.
    #[arg(
        long = "fetch-grace-ms",
        env = "CALOSCOPE_FETCH_GRACE_MS",
        default_value_t = 300,
        global = true
    )]
    pub fetch_grace_ms: u64,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct SessionArgs {
    #[arg(long = "session-file", env = "CALOSCOPE_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Keep credentials in memory only.
    #[arg(long, global = true, conflicts_with = "session_file")]
    pub ephemeral: bool,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct LogArgs {
    #[arg(long = "log-level", env = "LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    #[arg(long = "log-json", env = "LOG_JSON", global = true)]
    pub log_json: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sign in, sign up and manage credentials
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
    /// Browse, edit and delete logged food
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
    /// Show or update the user profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum AuthCommand {
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CALOSCOPE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CALOSCOPE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    VerifyOtp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
    },
    ResendOtp {
        #[arg(long)]
        email: String,
    },
    ResetPassword {
        #[arg(long)]
        email: String,
    },
    SetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
        #[arg(long, env = "CALOSCOPE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    ChangePassword,
    SignOut,
    /// Restore the stored session and report who is signed in
    Status,
}

#[derive(Debug, Clone, Default, ClapArgs)]
pub struct ScopeArgs {
    /// Only entries logged on this day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day, group = "scope")]
    pub day: Option<HistoryScope>,

    /// Only entries of a week relative to the current one (0 = this week, -1 = last week)
    #[arg(long, allow_negative_numbers = true, group = "scope")]
    pub week: Option<i32>,

    /// Only entries of a month (YYYY-MM)
    #[arg(long, value_parser = parse_month, group = "scope")]
    pub month: Option<HistoryScope>,
}

impl ScopeArgs {
    pub fn scope(&self) -> HistoryScope {
        if let Some(day) = &self.day {
            return day.clone();
        }
        if let Some(offset) = self.week {
            return HistoryScope::Week(offset);
        }
        self.month.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum HistoryCommand {
    List {
        #[arg(long, default_value_t = SortOrder::Newest)]
        sort: SortOrder,

        #[command(flatten)]
        scope: ScopeArgs,

        /// Load pages up to and including this one
        #[arg(
            long,
            default_value_t = 1,
            conflicts_with = "all",
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        page: u32,

        /// Load every page
        #[arg(long)]
        all: bool,

        #[arg(long)]
        json: bool,
    },
    Edit {
        id: String,

        #[arg(long)]
        calories: String,

        #[arg(long, default_value = "")]
        comment: String,
    },
    Delete {
        id: String,

        /// Do not ask for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ProfileCommand {
    Show {
        #[arg(long)]
        json: bool,
    },
    Update {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        gender: Option<String>,
        /// Centimetres
        #[arg(long)]
        height: Option<f64>,
        /// Kilograms
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long = "goal")]
        daily_calorie_goal: Option<f64>,
    },
}

fn parse_day(value: &str) -> Result<HistoryScope, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(HistoryScope::Day)
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn parse_month(value: &str) -> Result<HistoryScope, String> {
    let (year, month) = value
        .split_once('-')
        .ok_or_else(|| "expected YYYY-MM".to_string())?;
    let year: i32 = year.parse().map_err(|_| "invalid year".to_string())?;
    let month: u32 = month.parse().map_err(|_| "invalid month".to_string())?;
    HistoryScope::month(year, month).map_err(|e| e.to_string())
}

fn default_session_path() -> anyhow::Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("caloscope").join("session.json"))
        .context("could not determine a data directory, pass --session-file")
}

impl TryFrom<&Args> for CaloscopeConfig {
    type Error = anyhow::Error;

    fn try_from(args: &Args) -> Result<Self, Self::Error> {
        let session = if args.session.ephemeral {
            SessionConfig::Ephemeral
        } else {
            let path = match &args.session.session_file {
                Some(path) => path.clone(),
                None => default_session_path()?,
            };
            SessionConfig::File { path }
        };

        Ok(CaloscopeConfig {
            api: ApiConfig {
                base_url: args.api.api_url.clone(),
                timeout: Duration::from_secs(args.api.timeout_secs),
            },
            history: HistoryConfig {
                fetch_grace_period: Duration::from_millis(args.api.fetch_grace_ms),
            },
            session,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_history_list_with_sort_and_month() {
        let args = Args::try_parse_from([
            "caloscope",
            "history",
            "list",
            "--sort",
            "highest-calories",
            "--month",
            "2024-02",
            "--all",
        ])
        .unwrap();

        let Command::History {
            command: HistoryCommand::List {
                sort, scope, all, ..
            },
        } = args.command
        else {
            panic!("expected history list");
        };
        assert_eq!(sort, SortOrder::HighestCalories);
        assert_eq!(
            scope.scope(),
            HistoryScope::Month {
                year: 2024,
                month: 2
            }
        );
        assert!(all);
    }

    #[test]
    fn test_negative_week_offset() {
        let args =
            Args::try_parse_from(["caloscope", "history", "list", "--week", "-1"]).unwrap();
        let Command::History {
            command: HistoryCommand::List { scope, .. },
        } = args.command
        else {
            panic!("expected history list");
        };
        assert_eq!(scope.scope(), HistoryScope::Week(-1));
    }

    #[test]
    fn test_scopes_are_mutually_exclusive() {
        assert!(
            Args::try_parse_from([
                "caloscope",
                "history",
                "list",
                "--day",
                "2024-05-01",
                "--week",
                "0"
            ])
            .is_err()
        );
    }

    #[test]
    fn test_invalid_scope_values_are_rejected() {
        assert!(Args::try_parse_from(["caloscope", "history", "list", "--month", "2024-13"]).is_err());
        assert!(Args::try_parse_from(["caloscope", "history", "list", "--day", "May 1"]).is_err());
        assert!(Args::try_parse_from(["caloscope", "history", "list", "--sort", "random"]).is_err());
    }

    #[test]
    fn test_ephemeral_config() {
        let args = Args::try_parse_from([
            "caloscope",
            "--ephemeral",
            "--api-url",
            "https://api.example.com",
            "--fetch-grace-ms",
            "0",
            "history",
            "delete",
            "42",
            "-y",
        ])
        .unwrap();

        let config = CaloscopeConfig::try_from(&args).unwrap();
        assert!(matches!(config.session, SessionConfig::Ephemeral));
        assert_eq!(config.api.base_url, "https://api.example.com");
        assert!(config.history.fetch_grace_period.is_zero());
    }

    #[test]
    fn test_explicit_session_file() {
        let args = Args::try_parse_from([
            "caloscope",
            "--session-file",
            "/tmp/caloscope-session.json",
            "auth",
            "status",
        ])
        .unwrap();

        let config = CaloscopeConfig::try_from(&args).unwrap();
        assert!(matches!(
            config.session,
            SessionConfig::File { ref path } if path == &PathBuf::from("/tmp/caloscope-session.json")
        ));
    }
}
