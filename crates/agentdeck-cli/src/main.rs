// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use agentdeck_api::{Client, Fetcher};
use agentdeck_app::AppState;
use agentdeck_app::list::ListState;
use agentdeck_app::route::Route;
use agentdeck_app::session::{Session, TOKEN_KEY};
use agentdeck_store::Store;
use anyhow::{Context, Result};
use config::Config;
use runtime::ApiRuntime;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `agentdeck --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let db_path = config.db_path()?;
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    init_logging(&config, options.check_only)?;

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or AGENTDECK_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;

    if options.logout {
        let removed = store.clear_token()?;
        tracing::info!(removed, "signed out from the command line");
        println!("signed out");
        return Ok(());
    }

    let cache_ttl = if options.no_cache {
        Duration::ZERO
    } else {
        config.cache_ttl()?
    };
    let client = Client::new(config.base_url(), config.timeout()?, cache_ttl).with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout/cache_ttl values",
            options.config_path.display()
        )
    })?;
    let mut fetcher = Fetcher::new(client);
    let token = store.load_token()?;
    fetcher.set_token(token.clone());

    if options.check_only {
        let filter_options = fetcher
            .filter_options()
            .with_context(|| format!("reach backend at {}", config.base_url()))?;
        let token_saved_at = store.updated_at(TOKEN_KEY)?;
        tracing::info!(
            base_url = config.base_url(),
            industries = filter_options.vertical.len().saturating_sub(1),
            signed_in = token.is_some(),
            token_saved_at = ?token_saved_at,
            "startup check passed"
        );
        return Ok(());
    }

    let session = Session::new(config.expiry_decode())
        .with_token(token)
        .with_expires_at(store.load_token_expiry()?);
    let mut state = AppState::new(session, ListState::new(config.page_size()));
    let initial = match &options.open {
        Some(raw) => Route::parse(raw),
        None => Route::Agents(store.load_last_list_query()?),
    };

    let mut runtime = ApiRuntime::new(&store, fetcher);
    agentdeck_tui::run_app(&mut state, &mut runtime, initial)
}

/// The TUI owns the terminal, so logs go to a file unless running `--check`.
fn init_logging(config: &Config, to_stderr: bool) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level()));

    if to_stderr {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
        return Ok(());
    }

    let log_path = config.log_path()?;
    if let Some(parent) = log_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].file to a writable path",
                log_path.display()
            )
        })?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    print_example: bool,
    open: Option<String>,
    logout: bool,
    check_only: bool,
    no_cache: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        print_example: false,
        open: None,
        logout: false,
        check_only: false,
        no_cache: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--open" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow::anyhow!("--open requires a route such as \"/agents?stage=Prod\"")
                })?;
                options.open = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--logout" => {
                options.logout = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--no-cache" => {
                options.no_cache = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("agentdeck");
    println!("  --config <path>          Use a specific config path");
    println!("  --open <route>           Start at a route, e.g. \"/agents?stage=Prod&page=2\"");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --logout                 Forget the stored session token");
    println!("  --no-cache               Disable the response cache");
    println!("  --check                  Validate config + DB + backend reachability");
    println!("  --help                   Show this help");
}
