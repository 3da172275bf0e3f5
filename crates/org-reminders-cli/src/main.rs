use anyhow::{Context, Result, bail};
use org_reminders_config::Config;
use org_reminders_engine::models::Stamp;
use org_reminders_engine::store::JsonFileStore;
use org_reminders_engine::sync::{self, LogReporter, PassSummary, RecordingReporter, SyncSession};
use std::{env, path::PathBuf, process, time::Duration};

const USAGE: &str = "\
Usage: org-reminders [--org <file>] [--store <file>] [--interval <secs>] <command>

Commands:
  sync         Reconcile the org file with the store once
  update-hash  Stamp edited items in the org file without contacting the store
  watch        Sync on every change to the org file and on a timer
  export       Overwrite the org file with everything in the store (alias: all)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Sync,
    UpdateHash,
    Watch,
    Export,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "sync" => Some(Self::Sync),
            "update-hash" => Some(Self::UpdateHash),
            "watch" => Some(Self::Watch),
            "export" | "all" => Some(Self::Export),
            _ => None,
        }
    }
}

/// Command-line arguments. Anything given here overrides the config file.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    command: Option<Command>,
    org_file: Option<PathBuf>,
    store_file: Option<PathBuf>,
    interval_secs: Option<u64>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args::default();
    let mut rest = args.iter();

    while let Some(arg) = rest.next() {
        let mut value = |flag: &str| {
            rest.next()
                .with_context(|| format!("{flag} needs a value"))
                .cloned()
        };
        match arg.as_str() {
            "--org" => parsed.org_file = Some(PathBuf::from(value("--org")?)),
            "--store" => parsed.store_file = Some(PathBuf::from(value("--store")?)),
            "--interval" => {
                let secs = value("--interval")?;
                parsed.interval_secs = Some(
                    secs.parse()
                        .with_context(|| format!("Invalid interval {secs:?}"))?,
                );
            }
            other => match Command::from_arg(other) {
                Some(command) if parsed.command.is_none() => parsed.command = Some(command),
                _ => bail!("Unexpected argument {other:?}"),
            },
        }
    }
    Ok(parsed)
}

/// Merge the arguments over the config file.
fn resolve(args: &Args, config: Option<Config>) -> Result<Config> {
    let mut config = match (config, &args.org_file) {
        (Some(config), _) => config,
        (None, Some(org_file)) => Config::new(org_file, Config::default_store_file()),
        (None, None) => bail!(
            "No org file given and no config file found at {}",
            Config::config_path().display()
        ),
    };
    if let Some(org_file) = &args.org_file {
        config.org_file = org_file.clone();
    }
    if let Some(store_file) = &args.store_file {
        config.store_file = store_file.clone();
    }
    if let Some(secs) = args.interval_secs {
        config.poll_interval_secs = secs;
    }
    config.org_file = Config::expand_path(&config.org_file).unwrap_or(config.org_file);
    config.store_file = Config::expand_path(&config.store_file).unwrap_or(config.store_file);
    Ok(config)
}

fn print_summary(summary: &PassSummary, reporter: &RecordingReporter) {
    for (target, verb, title) in reporter.summary() {
        println!("{target} {verb}: {title}");
    }
    for failure in &reporter.failures {
        println!(
            "FAILED {} {}: {} ({})",
            failure.target,
            failure.verb,
            failure.entity.title(),
            failure.reason
        );
    }
    println!(
        "{} actions, {} failures, {} stamped, {} duplicates removed{}",
        summary.actions,
        summary.failures,
        summary.stamped,
        summary.duplicates,
        if summary.written { ", file written" } else { "" }
    );
}

fn run(command: Command, config: &Config) -> Result<()> {
    log::info!(
        "Syncing {} with {}",
        config.org_file.display(),
        config.store_file.display()
    );
    let store = JsonFileStore::open(&config.store_file)
        .with_context(|| format!("Opening store {}", config.store_file.display()))?;
    let mut session = SyncSession::open(
        &config.org_file,
        store,
        RecordingReporter::forwarding(LogReporter),
    )?;

    let summary = match command {
        Command::Sync => session.run_pass(Stamp::now())?,
        Command::UpdateHash => session.update_hash(Stamp::now())?,
        Command::Export => session.sync_all()?,
        Command::Watch => {
            let interval: Duration = config.poll_interval();
            sync::watch(&mut session, interval)?;
            return Ok(());
        }
    };
    print_summary(&summary, session.reporter());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{USAGE}");
        return Ok(());
    }

    let parsed = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{USAGE}");
            process::exit(2);
        }
    };
    let Some(command) = parsed.command else {
        eprintln!("{USAGE}");
        process::exit(2);
    };

    let config_path = Config::config_path();
    log::debug!("Config path: {}", config_path.display());
    let config = Config::load().context("Failed to load config file")?;
    let config = resolve(&parsed, config)?;

    run(command, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_parse_flags_and_command() {
        let parsed = parse_args(&args(&["--org", "todo.org", "watch", "--interval", "5"])).unwrap();

        assert_eq!(
            parsed,
            Args {
                command: Some(Command::Watch),
                org_file: Some(PathBuf::from("todo.org")),
                store_file: None,
                interval_secs: Some(5),
            }
        );
    }

    #[test]
    fn test_all_is_export() {
        let parsed = parse_args(&args(&["all"])).unwrap();
        assert_eq!(parsed.command, Some(Command::Export));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_args(&args(&["--org"])).is_err());
        assert!(parse_args(&args(&["--interval", "soon"])).is_err());
        assert!(parse_args(&args(&["sync", "sync"])).is_err());
        assert!(parse_args(&args(&["frobnicate"])).is_err());
    }

    #[test]
    fn test_arguments_override_config() {
        let config = Config::new("/notes/a.org", "/data/store.json");
        let parsed = Args {
            command: Some(Command::Sync),
            org_file: Some(PathBuf::from("/notes/b.org")),
            interval_secs: Some(10),
            ..Args::default()
        };

        let resolved = resolve(&parsed, Some(config)).unwrap();

        assert_eq!(resolved.org_file, PathBuf::from("/notes/b.org"));
        assert_eq!(resolved.store_file, PathBuf::from("/data/store.json"));
        assert_eq!(resolved.poll_interval_secs, 10);
    }

    #[test]
    fn test_org_file_needed_without_config() {
        assert!(resolve(&Args::default(), None).is_err());

        let parsed = Args {
            org_file: Some(PathBuf::from("/notes/a.org")),
            ..Args::default()
        };
        let resolved = resolve(&parsed, None).unwrap();
        assert_eq!(resolved.store_file, Config::default_store_file());
    }
}
