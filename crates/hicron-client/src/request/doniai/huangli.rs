use serde::Deserialize;

use crate::error::JobError;

#[derive(Debug, Deserialize, Clone)]
pub struct HuangliData {
    pub huangli_list: HuangliList,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HuangliList {
    pub texts1: Vec<TextRow>,
    pub texts2: Vec<TextRow>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TextRow {
    #[serde(default)]
    pub row_data: Option<String>,
}

/// The four almanac texts, in storage order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlmanacTexts {
    pub suitable: String,
    pub taboo: String,
    pub good_luck: String,
    pub ferocious: String,
}

/// `row_data` of every row that has one, in order.
fn column(rows: Vec<TextRow>) -> Vec<String> {
    rows.into_iter().filter_map(|row| row.row_data).collect()
}

/// First two values of a column, failing when fewer exist.
fn first_pair(rows: Vec<TextRow>, field: &str) -> Result<(String, String), JobError> {
    let mut values = column(rows).into_iter();
    match (values.next(), values.next()) {
        (Some(first), Some(second)) => Ok((first, second)),
        (first, _) => Err(JobError::shape(format!(
            "{field} needs 2 row_data entries, got {}",
            usize::from(first.is_some())
        ))),
    }
}

impl TryFrom<HuangliData> for AlmanacTexts {
    type Error = JobError;

    fn try_from(data: HuangliData) -> Result<Self, Self::Error> {
        let HuangliList { texts1, texts2 } = data.huangli_list;

        let (suitable, taboo) = first_pair(texts1, "texts1")?;
        let (good_luck, ferocious) = first_pair(texts2, "texts2")?;

        Ok(Self {
            suitable,
            taboo,
            good_luck,
            ferocious,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn data(value: serde_json::Value) -> HuangliData {
        serde_json::from_value(value).expect("valid huangli payload")
    }

    #[test]
    fn picks_first_two_rows_of_each_column() -> anyhow::Result<()> {
        let texts = AlmanacTexts::try_from(data(json!({
            "huangli_list": {
                "texts1": [{"row_data": "A"}, {"row_data": "B"}, {"row_data": "extra"}],
                "texts2": [{"row_data": "C"}, {"row_data": "D"}]
            }
        })))?;

        assert_eq!(
            texts,
            AlmanacTexts {
                suitable: "A".to_owned(),
                taboo: "B".to_owned(),
                good_luck: "C".to_owned(),
                ferocious: "D".to_owned(),
            }
        );
        Ok(())
    }

    #[test]
    fn rows_without_row_data_are_skipped() -> anyhow::Result<()> {
        let texts = AlmanacTexts::try_from(data(json!({
            "huangli_list": {
                "texts1": [{"title": "宜"}, {"row_data": "A"}, {"row_data": "B"}],
                "texts2": [{"row_data": "C"}, {"other": 1}, {"row_data": "D"}]
            }
        })))?;

        assert_eq!(texts.suitable, "A");
        assert_eq!(texts.taboo, "B");
        assert_eq!(texts.ferocious, "D");
        Ok(())
    }

    #[test]
    fn short_column_is_shape_failure() {
        let result = AlmanacTexts::try_from(data(json!({
            "huangli_list": {
                "texts1": [{"row_data": "A"}, {"row_data": "B"}],
                "texts2": [{"row_data": "C"}]
            }
        })));

        match result {
            Err(JobError::Shape(msg)) => assert!(msg.contains("texts2"), "{msg}"),
            other => panic!("expected shape failure, got {other:?}"),
        }
    }

    #[test]
    fn empty_column_is_shape_failure() {
        let result = AlmanacTexts::try_from(data(json!({
            "huangli_list": { "texts1": [], "texts2": [] }
        })));
        assert!(matches!(result, Err(JobError::Shape(_))));
    }
}
