use crate::{
    clock::{Clock, format_ymd},
    db::RecordStore,
    error::JobError,
    models::AlmanacRecord,
    request::{
        Envelope, HttpClient,
        doniai::{AlmanacTexts, HuangliData},
    },
};

use super::{ErrorLog, Job, JobKind, JobOutcome};

/// Stores today's almanac once per calendar day.
pub struct AlmanacFetcher<H, S, C, L> {
    url: String,
    http: H,
    store: S,
    clock: C,
    log: L,
}

impl<H, S, C, L> AlmanacFetcher<H, S, C, L>
where
    H: HttpClient,
    S: RecordStore<AlmanacRecord>,
    C: Clock,
    L: ErrorLog,
{
    pub fn new(url: impl Into<String>, http: H, store: S, clock: C, log: L) -> Self {
        Self {
            url: url.into(),
            http,
            store,
            clock,
            log,
        }
    }

    /// Request the endpoint and pull out the four texts.
    pub async fn fetch_texts(&self) -> Result<AlmanacTexts, JobError> {
        let body = self.http.get_json(&self.url).await?;
        let data: HuangliData = Envelope::from_value(body)?.into_data()?;
        AlmanacTexts::try_from(data)
    }
}

impl<H, S, C, L> Job for AlmanacFetcher<H, S, C, L>
where
    H: HttpClient,
    S: RecordStore<AlmanacRecord>,
    C: Clock,
    L: ErrorLog,
{
    fn kind(&self) -> JobKind {
        JobKind::Almanac
    }

    fn error_log(&self) -> &dyn ErrorLog {
        &self.log
    }

    async fn run(&self) -> Result<JobOutcome, JobError> {
        let texts = self.fetch_texts().await?;
        let current_date = format_ymd(self.clock.today());

        if self.store.exists(&current_date)? {
            log::debug!("Almanac for {current_date} already stored");
            return Ok(JobOutcome::AlreadyPresent(current_date));
        }

        log::debug!("Inserting almanac for {current_date}");
        let record = AlmanacRecord::new(current_date.clone(), texts);
        self.store.create(&record)?;
        Ok(JobOutcome::Inserted(current_date))
    }
}
