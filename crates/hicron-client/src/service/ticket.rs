use crate::{
    db::RecordStore,
    error::JobError,
    models::TicketRecord,
    request::{Envelope, HttpClient, doniai::FucaiData},
};

use super::{ErrorLog, Job, JobKind, JobOutcome};

/// Stores the latest shuangseqiu draw once per phase.
pub struct TicketFetcher<H, S, L> {
    url: String,
    http: H,
    store: S,
    log: L,
}

impl<H, S, L> TicketFetcher<H, S, L>
where
    H: HttpClient,
    S: RecordStore<TicketRecord>,
    L: ErrorLog,
{
    pub fn new(url: impl Into<String>, http: H, store: S, log: L) -> Self {
        Self {
            url: url.into(),
            http,
            store,
            log,
        }
    }

    /// Request the endpoint and build the draw record.
    pub async fn fetch_latest(&self) -> Result<TicketRecord, JobError> {
        let body = self.http.get_json(&self.url).await?;
        let data: FucaiData = Envelope::from_value(body)?.into_data()?;
        TicketRecord::try_from(data)
    }
}

impl<H, S, L> Job for TicketFetcher<H, S, L>
where
    H: HttpClient,
    S: RecordStore<TicketRecord>,
    L: ErrorLog,
{
    fn kind(&self) -> JobKind {
        JobKind::Ticket
    }

    fn error_log(&self) -> &dyn ErrorLog {
        &self.log
    }

    async fn run(&self) -> Result<JobOutcome, JobError> {
        let ticket = self.fetch_latest().await?;

        if self.store.exists(&ticket.phase)? {
            log::debug!("Ticket for phase {} already stored", ticket.phase);
            return Ok(JobOutcome::AlreadyPresent(ticket.phase));
        }

        log::debug!("Inserting ticket: {ticket}");
        self.store.create(&ticket)?;
        Ok(JobOutcome::Inserted(ticket.phase))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        db::{SqliteStore, tests::temp_store},
        error::ErrorCategory,
        service::testing::{BlindStore, FakeHttp, RecordingLog},
    };

    const URL: &str = "http://crawler.test/api/v1.0/crawler/fucai";

    fn fucai_body(name: &str, amount: Value, count: u32) -> Value {
        let result: Vec<Value> = (1..=count)
            .map(|n| json!({"title": n.to_string(), "color": if n <= 6 { "red" } else { "blue" }}))
            .collect();
        json!({
            "code": 200,
            "data": { "shuangseqiu": { "name": name, "amount": amount, "result": result } }
        })
    }

    fn fetcher<'a>(
        http: &'a FakeHttp,
        store: SqliteStore,
        log: &'a RecordingLog,
    ) -> TicketFetcher<&'a FakeHttp, SqliteStore, &'a RecordingLog> {
        TicketFetcher::new(URL, http, store, log)
    }

    #[tokio::test]
    async fn stores_latest_draw() -> anyhow::Result<()> {
        let (_dir, store) = temp_store();
        let http = FakeHttp::json(fucai_body("第24001期", json!("800000"), 12));
        let log = RecordingLog::default();

        let outcome = fetcher(&http, store.clone(), &log).run_logged().await?;

        assert_eq!(outcome, JobOutcome::Inserted("24001".to_owned()));
        let stored = store.get_ticket_by_phase("24001")?.expect("row stored");
        assert_eq!(
            stored,
            TicketRecord::new(
                "24001".to_owned(),
                "第24001期".to_owned(),
                "800000".to_owned(),
                "1 2 3 4 5 6".to_owned(),
                "7 8 9 10 11 12".to_owned(),
            )
        );
        assert!(log.entries().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn same_phase_twice_keeps_one_row() -> anyhow::Result<()> {
        let (_dir, store) = temp_store();
        let http = FakeHttp::json(fucai_body("第24001期", json!("800000"), 12));
        let log = RecordingLog::default();
        let job = fetcher(&http, store.clone(), &log);

        assert!(job.run_logged().await?.is_inserted());
        assert_eq!(
            job.run_logged().await?,
            JobOutcome::AlreadyPresent("24001".to_owned())
        );
        assert_eq!(store.count_tickets()?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn numeric_amount_is_stored_as_text() -> anyhow::Result<()> {
        let (_dir, store) = temp_store();
        let http = FakeHttp::json(fucai_body("双色球第2024035期", json!(1_234_567), 7));
        let log = RecordingLog::default();

        fetcher(&http, store.clone(), &log).run_logged().await?;

        let stored = store.get_ticket_by_phase("2024035")?.expect("row stored");
        assert_eq!(stored.amount, "1234567");
        assert_eq!(stored.houqu, "7");
        Ok(())
    }

    #[tokio::test]
    async fn non_200_code_logs_once_and_stores_nothing() -> anyhow::Result<()> {
        let (_dir, store) = temp_store();
        let mut body = fucai_body("第24001期", json!("800000"), 12);
        body["code"] = json!(404);
        let http = FakeHttp::json(body);
        let log = RecordingLog::default();

        let result = fetcher(&http, store.clone(), &log).run_logged().await;

        assert!(matches!(result, Err(JobError::Domain { code: 404, .. })), "{result:?}");
        assert_eq!(store.count_tickets()?, 0);
        assert_eq!(log.entries().len(), 1);
        assert_eq!(log.entries()[0].0, JobKind::Ticket);
        Ok(())
    }

    #[tokio::test]
    async fn too_few_results_is_shape_failure() -> anyhow::Result<()> {
        let (_dir, store) = temp_store();
        let http = FakeHttp::json(fucai_body("第24001期", json!("800000"), 6));
        let log = RecordingLog::default();

        let result = fetcher(&http, store.clone(), &log).run_logged().await;

        assert!(matches!(result, Err(JobError::Shape(_))), "{result:?}");
        assert_eq!(store.count_tickets()?, 0);
        assert_eq!(log.entries().len(), 1);
        assert_eq!(log.entries()[0].1, ErrorCategory::Shape);
        Ok(())
    }

    #[tokio::test]
    async fn name_without_phase_fails_instead_of_guessing() -> anyhow::Result<()> {
        let (_dir, store) = temp_store();
        let http = FakeHttp::json(fucai_body("双色球", json!("800000"), 12));
        let log = RecordingLog::default();

        let result = fetcher(&http, store.clone(), &log).run_logged().await;

        assert!(matches!(result, Err(JobError::Shape(_))), "{result:?}");
        assert_eq!(store.count_tickets()?, 0);
        assert_eq!(log.entries().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn lost_race_never_duplicates_the_phase() -> anyhow::Result<()> {
        let (_dir, store) = temp_store();
        let http = FakeHttp::json(fucai_body("第24001期", json!("800000"), 12));
        let log = RecordingLog::default();
        let racing = TicketFetcher::new(URL, &http, BlindStore(store.clone()), &log);

        let (first, second) = tokio::join!(racing.run_logged(), racing.run_logged());

        assert!(first.is_ok() != second.is_ok(), "{first:?} {second:?}");
        assert_eq!(store.count_tickets()?, 1);
        assert_eq!(log.entries().len(), 1);
        assert_eq!(log.entries()[0].1, ErrorCategory::Constraint);
        Ok(())
    }
}
