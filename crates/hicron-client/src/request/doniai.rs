//! Payload schemas of the `hi.doniai.com` crawler API.

use std::fmt::Display;

use serde::Deserialize;

pub mod fucai;
pub mod huangli;

pub use fucai::FucaiData;
pub use huangli::{AlmanacTexts, HuangliData};

pub const RETURN_CODE_SUCCESS: i64 = 200;

/// A JSON leaf that the API sends either quoted or bare.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}
