//! Command-line interface for redub
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Dub videos into another language
#[derive(Parser, Debug)]
#[command(
    name = "redub",
    version,
    about = "Dub videos into another language: transcribe, translate, re-voice, remux"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: stage details, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a duration budget into whole minutes, rounding up.
///
/// Accepts bare minutes (`45`) or any `humantime` duration (`90m`, `1h30m`).
fn parse_budget_minutes(s: &str) -> Result<u32, String> {
    let s = s.trim();
    if let Ok(minutes) = s.parse::<u32>() {
        return Ok(minutes);
    }
    let duration = humantime::parse_duration(s).map_err(|e| e.to_string())?;
    let minutes = duration.as_secs().div_ceil(60);
    u32::try_from(minutes).map_err(|_| format!("duration too long: {s}"))
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dub a video file
    Dub(DubArgs),

    /// List supported target languages
    Languages,

    /// List available voice presets
    Voices,

    /// Check system dependencies and credentials
    Check,

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Options for a dubbing run. Unset options fall back to the configuration.
#[derive(clap::Args, Debug, Default)]
pub struct DubArgs {
    /// Source video (webm or mp4)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Target language code (e.g., es, fr, de). See `redub languages`
    #[arg(long, short = 'l', value_name = "LANG")]
    pub language: Option<String>,

    /// Voice preset. See `redub voices`
    #[arg(long, value_name = "VOICE")]
    pub voice: Option<String>,

    /// Maximum minutes of source audio to dub (1-300)
    #[arg(long, short = 'm', value_name = "MINUTES", conflicts_with = "max_duration")]
    pub max_minutes: Option<u32>,

    /// Maximum source duration to dub. Examples: 45m, 1h30m
    #[arg(long, value_name = "DURATION", value_parser = parse_budget_minutes)]
    pub max_duration: Option<u32>,

    /// Directory for the dubbed video (default: current directory)
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of chunks to dub concurrently
    #[arg(long, short = 'j', value_name = "N")]
    pub parallel: Option<usize>,

    /// Keep intermediate files in the working directory
    #[arg(long)]
    pub keep_work: bool,
}

impl DubArgs {
    /// Budget in minutes from whichever of `--max-minutes` / `--max-duration` was given.
    pub fn budget_minutes(&self) -> Option<u32> {
        self.max_minutes.or(self.max_duration)
    }
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get a configuration value by key (e.g., dub.voice)
    Get {
        /// Dotted key path (e.g., dub.target_language, api.base_url)
        key: String,
    },
    /// Set a configuration value by key
    Set {
        /// Dotted key path (e.g., dub.target_language, api.base_url)
        key: String,
        /// Value to set
        value: String,
    },
    /// List current configuration values
    List,
    /// Print the configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dub_args(cli: Cli) -> DubArgs {
        match cli.command {
            Commands::Dub(args) => args,
            other => panic!("Expected Dub command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_dub_minimal() {
        let cli = Cli::try_parse_from(["redub", "dub", "talk.mp4"]).unwrap();
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());

        let args = dub_args(cli);
        assert_eq!(args.input, PathBuf::from("talk.mp4"));
        assert!(args.language.is_none());
        assert!(args.voice.is_none());
        assert!(args.budget_minutes().is_none());
        assert!(args.output_dir.is_none());
        assert!(args.parallel.is_none());
        assert!(!args.keep_work);
    }

    #[test]
    fn test_parse_dub_with_options() {
        let cli = Cli::try_parse_from([
            "redub",
            "dub",
            "lecture.webm",
            "--language",
            "fr",
            "--voice",
            "nova",
            "--max-minutes",
            "10",
            "-o",
            "/tmp/out",
            "-j",
            "4",
            "--keep-work",
        ])
        .unwrap();

        let args = dub_args(cli);
        assert_eq!(args.language.as_deref(), Some("fr"));
        assert_eq!(args.voice.as_deref(), Some("nova"));
        assert_eq!(args.budget_minutes(), Some(10));
        assert_eq!(args.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(args.parallel, Some(4));
        assert!(args.keep_work);
    }

    #[test]
    fn test_dub_requires_input() {
        assert!(Cli::try_parse_from(["redub", "dub"]).is_err());
    }

    #[test]
    fn test_command_is_required() {
        assert!(Cli::try_parse_from(["redub"]).is_err());
    }

    #[test]
    fn test_max_duration_humantime() {
        let args = dub_args(
            Cli::try_parse_from(["redub", "dub", "a.mp4", "--max-duration", "1h30m"]).unwrap(),
        );
        assert_eq!(args.budget_minutes(), Some(90));
    }

    #[test]
    fn test_max_duration_rounds_up_to_minutes() {
        let args = dub_args(
            Cli::try_parse_from(["redub", "dub", "a.mp4", "--max-duration", "90s"]).unwrap(),
        );
        assert_eq!(args.budget_minutes(), Some(2));
    }

    #[test]
    fn test_max_minutes_conflicts_with_max_duration() {
        let result = Cli::try_parse_from([
            "redub",
            "dub",
            "a.mp4",
            "--max-minutes",
            "5",
            "--max-duration",
            "5m",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_max_duration() {
        assert!(
            Cli::try_parse_from(["redub", "dub", "a.mp4", "--max-duration", "soon"]).is_err()
        );
    }

    #[test]
    fn test_parse_budget_minutes() {
        assert_eq!(parse_budget_minutes("45"), Ok(45));
        assert_eq!(parse_budget_minutes(" 2h "), Ok(120));
        assert_eq!(parse_budget_minutes("61s"), Ok(2));
        assert!(parse_budget_minutes("").is_err());
    }

    #[test]
    fn test_parse_verbose_double() {
        let cli = Cli::try_parse_from(["redub", "-vv", "languages"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_global_options_after_command() {
        let cli = Cli::try_parse_from([
            "redub",
            "dub",
            "a.mp4",
            "-q",
            "--config",
            "/etc/redub.toml",
        ])
        .unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/redub.toml")));
    }

    #[test]
    fn test_parse_catalog_commands() {
        assert!(matches!(
            Cli::try_parse_from(["redub", "languages"]).unwrap().command,
            Commands::Languages
        ));
        assert!(matches!(
            Cli::try_parse_from(["redub", "voices"]).unwrap().command,
            Commands::Voices
        ));
        assert!(matches!(
            Cli::try_parse_from(["redub", "check"]).unwrap().command,
            Commands::Check
        ));
    }

    #[test]
    fn test_parse_config_actions() {
        match Cli::try_parse_from(["redub", "config", "set", "dub.voice", "onyx"])
            .unwrap()
            .command
        {
            Commands::Config {
                action: ConfigAction::Set { key, value },
            } => {
                assert_eq!(key, "dub.voice");
                assert_eq!(value, "onyx");
            }
            other => panic!("Expected config set, got {other:?}"),
        }
        assert!(matches!(
            Cli::try_parse_from(["redub", "config", "path"]).unwrap().command,
            Commands::Config {
                action: ConfigAction::Path
            }
        ));
        assert!(Cli::try_parse_from(["redub", "config", "get"]).is_err());
    }

    #[test]
    fn test_parse_completions() {
        match Cli::try_parse_from(["redub", "completions", "bash"])
            .unwrap()
            .command
        {
            Commands::Completions { shell } => assert_eq!(shell, Shell::Bash),
            other => panic!("Expected Completions, got {other:?}"),
        }
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["redub", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
