//! The two crawl jobs and what they share.
//!
//! A job run fetches one endpoint, stores at most one new row and reports a
//! [`JobOutcome`]. Failures are logged once through the job's [`ErrorLog`]
//! and handed back to the caller, which decides about the exit status.

use strum::IntoEnumIterator as _;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    clock::SystemClock,
    config::CronConfig,
    db::SqliteStore,
    error::JobError,
    request::ReqwestClient,
};

pub mod almanac;
pub mod ticket;

pub use almanac::AlmanacFetcher;
pub use ticket::TicketFetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum JobKind {
    Almanac,
    Ticket,
}

impl JobKind {
    /// Every job, in the order `hicron all` runs them.
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// A new row was stored under this key.
    Inserted(String),
    /// A row with this key already existed; nothing was written.
    AlreadyPresent(String),
}

impl JobOutcome {
    pub fn key(&self) -> &str {
        match self {
            Self::Inserted(key) | Self::AlreadyPresent(key) => key,
        }
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// Receives job failures.
pub trait ErrorLog {
    fn error(&self, kind: JobKind, err: &JobError);
}

impl<L: ErrorLog + ?Sized> ErrorLog for &L {
    fn error(&self, kind: JobKind, err: &JobError) {
        (**self).error(kind, err);
    }
}

/// Writes each failure as one `log::error!` line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrorSink;

impl ErrorLog for LogErrorSink {
    fn error(&self, kind: JobKind, err: &JobError) {
        log::error!(
            target: "hicron::job",
            "job={kind} category={} error={err:?}: {err}",
            err.category()
        );
    }
}

#[expect(async_fn_in_trait)]
pub trait Job {
    fn kind(&self) -> JobKind;

    fn error_log(&self) -> &dyn ErrorLog;

    /// One fetch-parse-store pass. Errors are returned, not logged.
    async fn run(&self) -> Result<JobOutcome, JobError>;

    /// [`Job::run`], logging a failure exactly once before returning it.
    async fn run_logged(&self) -> Result<JobOutcome, JobError> {
        let kind = self.kind();
        match self.run().await {
            Ok(outcome) => {
                match &outcome {
                    JobOutcome::Inserted(key) => log::debug!("{kind}: stored {key}"),
                    JobOutcome::AlreadyPresent(key) => {
                        log::debug!("{kind}: {key} is up to date");
                    }
                }
                Ok(outcome)
            }
            Err(e) => {
                self.error_log().error(kind, &e);
                Err(e)
            }
        }
    }
}

pub type DefaultAlmanacFetcher =
    AlmanacFetcher<ReqwestClient, SqliteStore, SystemClock, LogErrorSink>;
pub type DefaultTicketFetcher = TicketFetcher<ReqwestClient, SqliteStore, LogErrorSink>;

/// Almanac job wired to the real HTTP client, store and wall clock.
pub fn almanac_job(
    config: &CronConfig,
    store: SqliteStore,
) -> anyhow::Result<DefaultAlmanacFetcher> {
    let http = ReqwestClient::new(config.almanac.timeout())?;
    let clock = SystemClock::new(config.zone()?);
    Ok(AlmanacFetcher::new(
        config.almanac_url(),
        http,
        store,
        clock,
        LogErrorSink,
    ))
}

/// Ticket job wired to the real HTTP client and store.
pub fn ticket_job(
    config: &CronConfig,
    store: SqliteStore,
) -> anyhow::Result<DefaultTicketFetcher> {
    let http = ReqwestClient::new(config.ticket.timeout())?;
    Ok(TicketFetcher::new(config.ticket_url(), http, store, LogErrorSink))
}

/// Run one job by kind with the default wiring.
pub async fn run_job(
    kind: JobKind,
    config: &CronConfig,
    store: SqliteStore,
) -> Result<JobOutcome, JobError> {
    match kind {
        JobKind::Almanac => match almanac_job(config, store) {
            Ok(job) => job.run_logged().await,
            Err(e) => Err(setup_failure(kind, &e)),
        },
        JobKind::Ticket => match ticket_job(config, store) {
            Ok(job) => job.run_logged().await,
            Err(e) => Err(setup_failure(kind, &e)),
        },
    }
}

fn setup_failure(kind: JobKind, e: &anyhow::Error) -> JobError {
    let err = JobError::Config(format!("failed to build {kind} job: {e:#}"));
    LogErrorSink.error(kind, &err);
    err
}
