use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::Scalar;
use crate::{error::JobError, models::TicketRecord};

/// Numbers per result group.
pub const GROUP_SIZE: usize = 6;

static PHASE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("phase pattern is valid"));

#[derive(Debug, Deserialize, Clone)]
pub struct FucaiData {
    pub shuangseqiu: Shuangseqiu,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Shuangseqiu {
    pub name: String,
    pub amount: Scalar,
    pub result: Vec<Ball>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Ball {
    #[serde(default)]
    pub title: Option<Scalar>,
}

/// First run of digits (with an optional `.digits` tail) in the draw name.
pub fn parse_phase(name: &str) -> Option<&str> {
    PHASE_PATTERN.find(name).map(|m| m.as_str())
}

fn join_titles(balls: &[Ball]) -> String {
    balls
        .iter()
        .filter_map(|ball| ball.title.as_ref().map(ToString::to_string))
        .collect::<Vec<_>>()
        .join(" ")
}

impl TryFrom<FucaiData> for TicketRecord {
    type Error = JobError;

    fn try_from(data: FucaiData) -> Result<Self, Self::Error> {
        let Shuangseqiu {
            name,
            amount,
            result,
        } = data.shuangseqiu;

        let phase = parse_phase(&name)
            .ok_or_else(|| JobError::shape(format!("no phase number in name {name:?}")))?
            .to_owned();

        let mut groups = result.chunks(GROUP_SIZE);
        let (Some(front), Some(back)) = (groups.next(), groups.next()) else {
            return Err(JobError::shape(format!(
                "result needs more than {GROUP_SIZE} entries, got {}",
                result.len()
            )));
        };

        Ok(Self::new(
            phase,
            name,
            amount.to_string(),
            join_titles(front),
            join_titles(back),
        ))
    }
}
