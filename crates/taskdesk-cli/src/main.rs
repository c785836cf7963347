// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use runtime::{ThreadRuntime, demo_backend};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use taskdesk_api::{Client, FileTokenStore, MemoryTokenStore, TokenStore};
use taskdesk_app::AppState;
use taskdesk_store::{Backend, Dashboard};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "TASKDESK_LOG";

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    match options.action {
        Action::Help => {
            print_help();
            return Ok(());
        }
        Action::PrintConfigPath => {
            println!("{}", options.config_path.display());
            return Ok(());
        }
        Action::PrintExampleConfig => {
            print!("{}", Config::example_config(&options.config_path));
            return Ok(());
        }
        Action::Launch | Action::Check | Action::Logout => {}
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load settings from {} -- compare against `taskdesk --print-example-config`",
            options.config_path.display()
        )
    })?;
    init_logging(&config)?;

    if options.action == Action::Logout {
        let token_path = config.token_path()?;
        FileTokenStore::new(&token_path).clear().with_context(|| {
            format!(
                "remove stored token {} -- delete the file by hand if it persists",
                token_path.display()
            )
        })?;
        info!(path = %token_path.display(), "stored token cleared");
        println!("logged out");
        return Ok(());
    }

    let (tokens, backend): (Arc<dyn TokenStore>, Arc<dyn Backend>) = if options.demo {
        (
            Arc::new(MemoryTokenStore::default()),
            Arc::new(demo_backend()),
        )
    } else {
        let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.token_path()?));
        let client = Client::new(config.base_url(), config.timeout()?, Arc::clone(&tokens))
            .with_context(|| {
                format!(
                    "invalid [api] section in {} -- fix base_url or timeout",
                    options.config_path.display()
                )
            })?;
        (tokens, Arc::new(client))
    };

    if options.action == Action::Check {
        let token = tokens
            .load()
            .context("read stored token -- fix its permissions or run `taskdesk --logout`")?;
        println!(
            "config ok; {}",
            if token.is_some() { "signed in" } else { "signed out" }
        );
        return Ok(());
    }

    let dashboard = Dashboard::new(tokens);
    let mut state = AppState::with_session(dashboard.auth.is_authenticated());
    info!(
        demo = options.demo,
        base_url = config.base_url(),
        authenticated = state.authenticated,
        "starting taskdesk"
    );

    let mut runtime = ThreadRuntime::new(backend);
    taskdesk_tui::run_app(&mut state, dashboard, &mut runtime, config.page_size())
}

/// Sends `tracing` output to the log file; the terminal belongs to the UI.
fn init_logging(config: &Config) -> Result<()> {
    let directives = match env::var(LOG_ENV) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => config.log_level().to_owned(),
    };
    let filter = EnvFilter::try_new(&directives).with_context(|| {
        format!(
            "invalid log filter {directives:?} -- use a level such as info or debug in [log].level or {LOG_ENV}"
        )
    })?;

    let path = config.log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].file to a writable path",
                path.display()
            )
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;
    Ok(())
}

/// What a single invocation should do once the config path is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Launch,
    Help,
    PrintConfigPath,
    PrintExampleConfig,
    Check,
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    action: Action,
    demo: bool,
}

/// `--help` outranks everything; otherwise the last action flag wins.
fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut config_path = default_config_path;
    let mut action = Action::Launch;
    let mut demo = false;
    let mut help = false;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let flag = arg.as_ref();
        match flag {
            "--config" => match args.next() {
                Some(path) if !path.as_ref().trim().is_empty() => {
                    config_path = PathBuf::from(path.as_ref());
                }
                _ => bail!("--config requires a file path"),
            },
            "--demo" => demo = true,
            "--help" | "-h" => help = true,
            "--print-config-path" => action = Action::PrintConfigPath,
            "--print-example-config" => action = Action::PrintExampleConfig,
            "--check" => action = Action::Check,
            "--logout" => action = Action::Logout,
            other => bail!("unknown argument {other:?}; run `taskdesk --help` for usage"),
        }
    }

    if help {
        action = Action::Help;
    }
    Ok(CliOptions {
        config_path,
        action,
        demo,
    })
}

fn print_help() {
    println!("usage: taskdesk [--config <path>] [--demo] [action]");
    println!();
    println!("options:");
    println!("  --config <path>          read settings from <path>");
    println!("  --demo                   use seeded in-memory records instead of the API");
    println!();
    println!("actions:");
    println!("  --print-config-path      show where settings are read from");
    println!("  --print-example-config   write a commented v1 config to stdout");
    println!("  --check                  load config and the saved token, then exit");
    println!("  --logout                 forget the saved token, then exit");
    println!("  -h, --help               show this message");
}
