use chrono::NaiveDateTime;
use console::style;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// One shuangseqiu draw, keyed by `phase`.
///
/// `qianqu` and `houqu` hold the space-joined titles of the first and second
/// result groups exactly as the source reports them.
#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::models::schema::ticket)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TicketRecord {
    pub phase: String,
    pub name: String,
    pub amount: String,
    pub qianqu: String,
    pub houqu: String,
    pub created_time: NaiveDateTime,
}

impl TicketRecord {
    pub fn new(
        phase: String,
        name: String,
        amount: String,
        qianqu: String,
        houqu: String,
    ) -> Self {
        Self {
            phase,
            name,
            amount,
            qianqu,
            houqu,
            created_time: chrono::Utc::now().naive_utc(),
        }
    }
}

impl PartialEq for TicketRecord {
    fn eq(&self, other: &Self) -> bool {
        self.phase == other.phase
            && self.name == other.name
            && self.amount == other.amount
            && self.qianqu == other.qianqu
            && self.houqu == other.houqu
    }
}

impl Eq for TicketRecord {}

impl Display for TicketRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} + {} ({})",
            style(&self.phase).green().bold(),
            self.name,
            style(&self.qianqu).red().bold(),
            style(&self.houqu).blue().bold(),
            self.amount
        )
    }
}
