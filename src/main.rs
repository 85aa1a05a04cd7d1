//! `hicron`: run the crawl jobs once, meant to be called by cron.

use anyhow::{Context as _, Result, anyhow};
use clap::{Arg, ArgMatches, Command, value_parser};
use hicron_client::{CronConfig, JobKind, SqliteStore, service};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config = CronConfig::load()?;

    let log_level = match matches.get_count("verbose") {
        0 => config.log_level(),
        1 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    };
    hicron_client::setup(log_level);

    match &config.source {
        Some(path) => log::debug!("Loaded config from: {}", path.display()),
        None => log::debug!("No config file found, using defaults"),
    }

    if matches.get_flag("config-check") {
        return config_check(&config);
    }

    match matches.subcommand() {
        Some(("almanac", _)) => run_jobs(&config, &[JobKind::Almanac]).await,
        Some(("ticket", _)) => run_jobs(&config, &[JobKind::Ticket]).await,
        Some(("all", _)) => run_jobs(&config, &JobKind::all()).await,
        Some(("show", sub)) => show(&config, sub),
        _ => {
            cli().print_help()?;
            Ok(())
        }
    }
}

fn cli() -> Command {
    Command::new("hicron")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fetch the daily almanac and the latest shuangseqiu draw into SQLite")
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(clap::ArgAction::Count)
                .help("Set verbose output level"),
        )
        .arg(
            Arg::new("config-check")
                .long("config-check")
                .action(clap::ArgAction::SetTrue)
                .help("Check configuration and database, then exit"),
        )
        .subcommand(Command::new("almanac").about("Store today's almanac if missing"))
        .subcommand(Command::new("ticket").about("Store the latest draw if missing"))
        .subcommand(Command::new("all").about("Run the almanac job, then the ticket job"))
        .subcommand(
            Command::new("show")
                .about("Print the latest stored records")
                .arg(
                    Arg::new("kind")
                        .required(true)
                        .value_parser(value_parser!(JobKind))
                        .help("almanac or ticket"),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .short('n')
                        .default_value("5")
                        .value_parser(value_parser!(i64).range(1..))
                        .help("Number of records"),
                ),
        )
}

fn open_store(config: &CronConfig) -> Result<SqliteStore> {
    SqliteStore::open(&config.database_url)
        .with_context(|| format!("Failed to open database {}", config.database_url))
}

/// Run every job even if an earlier one failed; fail the process if any did.
async fn run_jobs(config: &CronConfig, kinds: &[JobKind]) -> Result<()> {
    let store = match open_store(config) {
        Ok(store) => store,
        Err(e) => {
            log::error!("{e:#}");
            return Err(e);
        }
    };

    let mut failed = Vec::new();
    for &kind in kinds {
        if service::run_job(kind, config, store.clone()).await.is_err() {
            // already logged by the job
            failed.push(kind.to_string());
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("job failed: {}", failed.join(", ")))
    }
}

fn show(config: &CronConfig, matches: &ArgMatches) -> Result<()> {
    let store = open_store(config)?;
    let kind = matches
        .get_one::<JobKind>("kind")
        .copied()
        .context("missing record kind")?;
    let limit = matches.get_one::<i64>("limit").copied().unwrap_or(5);

    match kind {
        JobKind::Almanac => {
            println!("{} almanac records", store.count_almanacs()?);
            for record in store.latest_almanacs(limit)? {
                println!("{record}");
            }
        }
        JobKind::Ticket => {
            println!("{} ticket records", store.count_tickets()?);
            for record in store.latest_tickets(limit)? {
                println!("{record}");
            }
        }
    }
    Ok(())
}

fn config_check(config: &CronConfig) -> Result<()> {
    log::info!("Checking configuration...");

    let zone = config.zone()?;
    log::debug!("Timezone: {zone}");
    log::debug!("Almanac endpoint: {}", config.almanac_url());
    log::debug!("Ticket endpoint: {}", config.ticket_url());

    match open_store(config) {
        Ok(_) => log::debug!("Database connection: OK"),
        Err(e) => {
            log::error!("Database connection failed: {e:#}");
            return Err(e);
        }
    }

    log::info!("Configuration check completed successfully");
    Ok(())
}
