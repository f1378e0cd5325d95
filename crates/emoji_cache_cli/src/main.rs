//! CLI entry point for inspecting and refreshing an emoji cache.
//!
//! # Responsibility
//! - Open the cache described by an optional JSON config file.
//! - Optionally import locale or custom partitions from the configured source.
//! - Print deterministic `key=value` lines for quick local checks.
//!
//! Usage: `emoji_cache_cli [--config <path>] [--import <locale>]... [--custom]`

use emoji_cache_core::{
    cache_store, core_version, init_logging, CacheConfig, CacheStore, EmojiImporter, HttpSource,
    ImportOutcome, Locale, LoggingConfig, PartitionId,
};
use log::{error, info};
use std::process::ExitCode;

#[derive(Debug, Default)]
struct Args {
    config_path: Option<String>,
    import_locales: Vec<String>,
    import_custom: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                args.config_path = Some(iter.next().ok_or("--config needs a path")?);
            }
            "--import" => {
                args.import_locales
                    .push(iter.next().ok_or("--import needs a locale")?);
            }
            "--custom" => args.import_custom = true,
            other => return Err(format!("unknown argument `{other}`")),
        }
    }
    Ok(args)
}

fn load_config(path: Option<&str>) -> Result<CacheConfig, String> {
    let Some(path) = path else {
        return Ok(CacheConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read config `{path}`: {err}"))?;
    CacheConfig::from_json_str(&raw).map_err(|err| err.to_string())
}

fn run(args: Args) -> Result<(), String> {
    let config = load_config(args.config_path.as_deref())?;
    let store = cache_store(&config);

    if !args.import_locales.is_empty() || args.import_custom {
        let source = HttpSource::from_config(&config).map_err(|err| err.to_string())?;
        let importer = EmojiImporter::new(store.clone(), source);
        for locale in &args.import_locales {
            let outcome = importer
                .import_locale_data(locale)
                .map_err(|err| err.to_string())?;
            print_outcome(locale, outcome);
        }
        if args.import_custom {
            let outcome = importer.import_custom_data().map_err(|err| err.to_string())?;
            print_outcome(PartitionId::Custom.as_str(), outcome);
        }
    }

    print_summary(&store)
}

fn print_outcome(partition: &str, outcome: ImportOutcome) {
    match outcome {
        ImportOutcome::NotModified => println!("import partition={partition} status=not_modified"),
        ImportOutcome::Imported { count } => {
            println!("import partition={partition} status=imported count={count}")
        }
    }
}

fn print_summary(store: &CacheStore) -> Result<(), String> {
    store.storage().open().map_err(|err| err.to_string())?;

    let loaded: Vec<Locale> = store.loaded_locales().snapshot();
    let names: Vec<&str> = loaded.iter().map(|locale| locale.as_str()).collect();
    println!("loaded_locales={}", names.join(","));

    for locale in loaded {
        let count = store
            .count_partition(locale.into())
            .map_err(|err| err.to_string())?;
        println!("partition={locale} count={count}");
    }
    let custom = store
        .count_partition(PartitionId::Custom)
        .map_err(|err| err.to_string())?;
    println!("partition=custom count={custom}");
    Ok(())
}

fn main() -> ExitCode {
    println!("emoji_cache_core version={}", core_version());

    if let Err(err) = init_logging(&LoggingConfig::default()) {
        eprintln!("logging disabled: {err}");
    }

    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => {
            info!("event=cli_run module=cli status=ok");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
