use diesel::prelude::*;

use super::{RecordStore, SqliteStore, expect_one_row};
use crate::{error::JobError, models::AlmanacRecord, models::schema::almanac};

impl RecordStore<AlmanacRecord> for SqliteStore {
    fn exists(&self, current_date: &str) -> Result<bool, JobError> {
        let mut connection = self.connection()?;
        let found = diesel::select(diesel::dsl::exists(
            almanac::table.filter(almanac::current_date.eq(current_date)),
        ))
        .get_result::<bool>(&mut connection)?;
        Ok(found)
    }

    fn create(&self, record: &AlmanacRecord) -> Result<(), JobError> {
        let mut connection = self.connection()?;
        let count = diesel::insert_into(almanac::table)
            .values(record)
            .execute(&mut connection)?;
        expect_one_row(count, "almanac")
    }
}

impl SqliteStore {
    pub fn get_almanac(&self, current_date: &str) -> Result<Option<AlmanacRecord>, JobError> {
        let mut connection = self.connection()?;
        let record = almanac::table
            .find(current_date)
            .select(AlmanacRecord::as_select())
            .first(&mut connection)
            .optional()?;
        Ok(record)
    }

    pub fn latest_almanacs(&self, limit: i64) -> Result<Vec<AlmanacRecord>, JobError> {
        let mut connection = self.connection()?;
        let records = almanac::table
            .order(almanac::current_date.desc())
            .limit(limit)
            .select(AlmanacRecord::as_select())
            .load(&mut connection)?;
        Ok(records)
    }

    pub fn count_almanacs(&self) -> Result<i64, JobError> {
        let mut connection = self.connection()?;
        Ok(almanac::table.count().get_result(&mut connection)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::tests::temp_store, request::doniai::AlmanacTexts};

    fn record(date: &str) -> AlmanacRecord {
        AlmanacRecord::new(
            date.to_owned(),
            AlmanacTexts {
                suitable: "祭祀 祈福".to_owned(),
                taboo: "开市".to_owned(),
                good_luck: "天恩 母仓".to_owned(),
                ferocious: "河魁".to_owned(),
            },
        )
    }

    #[test]
    fn insert_then_exists() -> anyhow::Result<()> {
        let (_dir, store) = temp_store();

        assert!(!RecordStore::<AlmanacRecord>::exists(&store, "20240101")?);
        store.create(&record("20240101"))?;
        assert!(RecordStore::<AlmanacRecord>::exists(&store, "20240101")?);
        assert!(!RecordStore::<AlmanacRecord>::exists(&store, "20240102")?);

        assert_eq!(store.get_almanac("20240101")?, Some(record("20240101")));
        assert_eq!(store.get_almanac("20240102")?, None);
        Ok(())
    }

    #[test]
    fn duplicate_date_is_constraint_failure() -> anyhow::Result<()> {
        let (_dir, store) = temp_store();

        store.create(&record("20240101"))?;
        let second = store.create(&record("20240101"));

        assert!(matches!(second, Err(JobError::Constraint(_))), "{second:?}");
        assert_eq!(store.count_almanacs()?, 1);
        Ok(())
    }

    #[test]
    fn latest_are_newest_first() -> anyhow::Result<()> {
        let (_dir, store) = temp_store();
        for date in ["20240101", "20240103", "20240102"] {
            store.create(&record(date))?;
        }

        let dates: Vec<String> = store
            .latest_almanacs(2)?
            .into_iter()
            .map(|r| r.current_date)
            .collect();
        assert_eq!(dates, ["20240103", "20240102"]);
        Ok(())
    }
}
