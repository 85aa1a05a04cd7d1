use diesel::prelude::*;

use super::{RecordStore, SqliteStore, expect_one_row};
use crate::{error::JobError, models::TicketRecord, models::schema::ticket};

impl RecordStore<TicketRecord> for SqliteStore {
    fn exists(&self, phase: &str) -> Result<bool, JobError> {
        let mut connection = self.connection()?;
        let found = diesel::select(diesel::dsl::exists(
            ticket::table.filter(ticket::phase.eq(phase)),
        ))
        .get_result::<bool>(&mut connection)?;
        Ok(found)
    }

    fn create(&self, record: &TicketRecord) -> Result<(), JobError> {
        let mut connection = self.connection()?;
        let count = diesel::insert_into(ticket::table)
            .values(record)
            .execute(&mut connection)?;
        expect_one_row(count, "ticket")
    }
}

impl SqliteStore {
    pub fn get_ticket_by_phase(&self, phase: &str) -> Result<Option<TicketRecord>, JobError> {
        let mut connection = self.connection()?;
        let record = ticket::table
            .find(phase)
            .select(TicketRecord::as_select())
            .first(&mut connection)
            .optional()?;
        Ok(record)
    }

    /// Most recently stored draws first.
    pub fn latest_tickets(&self, limit: i64) -> Result<Vec<TicketRecord>, JobError> {
        let mut connection = self.connection()?;
        let records = ticket::table
            .order((ticket::created_time.desc(), ticket::phase.desc()))
            .limit(limit)
            .select(TicketRecord::as_select())
            .load(&mut connection)?;
        Ok(records)
    }

    pub fn count_tickets(&self) -> Result<i64, JobError> {
        let mut connection = self.connection()?;
        Ok(ticket::table.count().get_result(&mut connection)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db::tests::temp_store;

    fn record(phase: &str) -> TicketRecord {
        TicketRecord::new(
            phase.to_owned(),
            format!("第{phase}期"),
            "800000".to_owned(),
            "03 07 12 19 25 31".to_owned(),
            "09".to_owned(),
        )
    }

    #[test]
    fn insert_then_find_by_phase() -> anyhow::Result<()> {
        let (_dir, store) = temp_store();

        assert!(!RecordStore::<TicketRecord>::exists(&store, "24001")?);
        store.create(&record("24001"))?;
        assert!(RecordStore::<TicketRecord>::exists(&store, "24001")?);

        let found = store.get_ticket_by_phase("24001")?;
        assert_eq!(found, Some(record("24001")));
        Ok(())
    }

    #[test]
    fn duplicate_phase_is_constraint_failure() -> anyhow::Result<()> {
        let (_dir, store) = temp_store();

        store.create(&record("24001"))?;
        let second = store.create(&record("24001"));

        assert!(matches!(second, Err(JobError::Constraint(_))), "{second:?}");
        assert_eq!(store.count_tickets()?, 1);
        Ok(())
    }

    #[test]
    fn latest_respects_limit() -> anyhow::Result<()> {
        let (_dir, store) = temp_store();
        for phase in ["24001", "24002", "24003"] {
            store.create(&record(phase))?;
        }

        assert_eq!(store.latest_tickets(2)?.len(), 2);
        assert_eq!(store.count_tickets()?, 3);
        Ok(())
    }
}
