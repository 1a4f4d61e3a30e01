use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use redub::app::run_dub_command;
use redub::cli::{Cli, Commands, ConfigAction};
use redub::config::Config;
use redub::diagnostics::check_dependencies;
use redub::output;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match cli.command {
        Commands::Dub(args) => {
            let config = load_config(cli.config.as_deref())?;
            match run_dub_command(config, &args, cli.quiet).await {
                Ok(artifact) => {
                    if cli.quiet {
                        println!("{}", artifact.path.display());
                    } else {
                        output::print_artifact(&artifact);
                    }
                }
                Err(failure) => {
                    output::print_failure(failure.stage, &failure.error);
                    std::process::exit(1);
                }
            }
        }
        Commands::Languages => {
            let config = load_config(cli.config.as_deref())?;
            print!("{}", output::format_languages(&config.dub.target_language));
        }
        Commands::Voices => {
            let config = load_config(cli.config.as_deref())?;
            print!("{}", output::format_voices(&config.dub.voice));
        }
        Commands::Check => {
            let config = load_config(cli.config.as_deref())?;
            if !check_dependencies(&config) {
                std::process::exit(1);
            }
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "redub", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Route `tracing` output to stderr.
///
/// `-q` shows errors only, default shows warnings, `-v` info, `-vv` debug.
/// `RUST_LOG` takes precedence when set.
fn init_logging(quiet: bool, verbosity: u8) {
    let level = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("redub={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/redub/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };

    Ok(config.with_env_overrides())
}

/// Handle configuration commands.
fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    let config_path = custom_path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    match action {
        ConfigAction::Get { key } => {
            let config = Config::load_or_default(&config_path)?.with_env_overrides();
            match config.get(&key) {
                Ok(value) => println!("{}", display_value(&value)),
                Err(e) => {
                    eprintln!("{} {}", "Error:".red(), e);
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            // Edit the file as stored, without environment overrides leaking in.
            let mut config = Config::load_or_default(&config_path)?;
            if let Err(e) = config.set(&key, &value).and_then(|()| config.validate()) {
                eprintln!("{} {}", "Error:".red(), e);
                std::process::exit(1);
            }
            config.save(&config_path)?;
            println!("Set {} = {}", key, value.green());
        }
        ConfigAction::List => {
            let mut config = Config::load_or_default(&config_path)?.with_env_overrides();
            if config.api.api_key.is_some() {
                config.api.api_key = Some("***".to_string());
            }
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }
    Ok(())
}

/// Strings print bare; everything else in TOML syntax.
fn display_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
