//! System diagnostics and dependency checking.
//!
//! Verifies that the media engine is installed and that the service
//! credential and working directory are usable.

use crate::config::Config;
use crate::services::Credential;
use std::fs;
use std::process::Command;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Tool is installed and working
    Ok,
    /// Tool is not found
    NotFound,
    /// Tool is found but has issues
    Warning(String),
}

/// Check if a command exists and answers a version query.
fn check_command(command: &str, version_arg: &str) -> CheckResult {
    match Command::new(command).arg(version_arg).output() {
        Ok(output) if output.status.success() => CheckResult::Ok,
        Ok(_) => CheckResult::Warning(format!("'{command}' found but {version_arg} failed")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking '{command}': {e}")),
    }
}

/// First line of `ffmpeg -version`, e.g. "ffmpeg version 6.1.1".
fn ffmpeg_version(program: &str) -> Option<String> {
    let output = Command::new(program).arg("-version").output().ok()?;
    let text = String::from_utf8_lossy(&output.stdout);
    let line = text.lines().next()?;
    Some(line.split(" Copyright").next().unwrap_or(line).trim().to_string())
}

fn check_credential(config: &Config) -> CheckResult {
    match Credential::from_option(config.api.api_key.as_deref()) {
        Ok(_) => CheckResult::Ok,
        Err(_) => CheckResult::NotFound,
    }
}

fn check_work_dir(config: &Config) -> CheckResult {
    let dir = config.media.resolved_work_dir();
    match fs::create_dir_all(&dir) {
        Ok(()) => CheckResult::Ok,
        Err(e) => CheckResult::Warning(format!("cannot create {}: {e}", dir.display())),
    }
}

/// Run all checks and print results. Returns true when a run can start.
pub fn check_dependencies(config: &Config) -> bool {
    println!("redub {}", crate::version_string());
    println!("Checking dependencies...\n");
    let mut ready = true;

    print!("ffmpeg ({}): ", config.media.ffmpeg);
    match check_command(&config.media.ffmpeg, "-version") {
        CheckResult::Ok => {
            let version = ffmpeg_version(&config.media.ffmpeg).unwrap_or_default();
            println!("✓ OK {version}");
        }
        CheckResult::NotFound => {
            ready = false;
            println!("✗ NOT FOUND");
            println!("  Install: sudo apt install ffmpeg   (Debian/Ubuntu)");
            println!("           sudo pacman -S ffmpeg     (Arch)");
            println!("           brew install ffmpeg       (macOS)");
        }
        CheckResult::Warning(msg) => {
            ready = false;
            println!("⚠ WARNING: {msg}");
        }
    }

    print!("API key: ");
    match check_credential(config) {
        CheckResult::Ok => println!("✓ configured"),
        CheckResult::NotFound => {
            ready = false;
            println!("✗ NOT FOUND");
            println!("  Set REDUB_API_KEY (or OPENAI_API_KEY), or run:");
            println!("  redub config set api.api_key <KEY>");
        }
        CheckResult::Warning(msg) => {
            ready = false;
            println!("⚠ WARNING: {msg}");
        }
    }

    println!("API endpoint: {}", config.api.base_url);

    print!("Working directory: ");
    match check_work_dir(config) {
        CheckResult::Ok => println!("✓ {}", config.media.resolved_work_dir().display()),
        CheckResult::NotFound => println!("✗ NOT FOUND"),
        CheckResult::Warning(msg) => {
            ready = false;
            println!("⚠ WARNING: {msg}");
        }
    }

    println!();
    if ready {
        println!("✓ Ready to dub.");
    } else {
        println!("⚠ Fix the issues above before running `redub dub`.");
    }
    ready
}
