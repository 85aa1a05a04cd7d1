use chrono::NaiveDateTime;
use console::style;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::request::doniai::AlmanacTexts;

/// One day of almanac texts, keyed by `current_date` (`YYYYMMDD`).
#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::models::schema::almanac)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AlmanacRecord {
    pub current_date: String,
    pub suitable: String,
    pub taboo: String,
    pub good_luck: String,
    pub ferocious: String,
    pub created_time: NaiveDateTime,
}

impl AlmanacRecord {
    pub fn new(current_date: String, texts: AlmanacTexts) -> Self {
        let AlmanacTexts {
            suitable,
            taboo,
            good_luck,
            ferocious,
        } = texts;

        Self {
            current_date,
            suitable,
            taboo,
            good_luck,
            ferocious,
            created_time: chrono::Utc::now().naive_utc(),
        }
    }
}

impl PartialEq for AlmanacRecord {
    fn eq(&self, other: &Self) -> bool {
        self.current_date == other.current_date
            && self.suitable == other.suitable
            && self.taboo == other.taboo
            && self.good_luck == other.good_luck
            && self.ferocious == other.ferocious
    }
}

impl Eq for AlmanacRecord {}

impl Display for AlmanacRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", style(&self.current_date).green().bold())?;
        writeln!(f, "  宜: {}", style(&self.suitable).green())?;
        writeln!(f, "  忌: {}", style(&self.taboo).red())?;
        writeln!(f, "  吉: {}", style(&self.good_luck).cyan())?;
        write!(f, "  凶: {}", style(&self.ferocious).yellow())
    }
}
