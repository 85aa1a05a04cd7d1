use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{error::JobError, request::doniai::RETURN_CODE_SUCCESS};

/// Outer `{ code, data }` wrapper shared by every crawler endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn from_value(body: Value) -> Result<Self, JobError> {
        serde_json::from_value(body)
            .map_err(|e| JobError::shape(format!("invalid response envelope: {e}")))
    }

    pub fn is_success(&self) -> bool {
        self.code == RETURN_CODE_SUCCESS
    }

    /// Check the code, then decode `data` into the endpoint payload.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, JobError> {
        if !self.is_success() {
            return Err(JobError::Domain {
                code: self.code,
                msg: self.msg,
            });
        }

        let data = self
            .data
            .ok_or_else(|| JobError::shape("response has no data"))?;

        serde_json::from_value(data).map_err(|e| JobError::shape(e.to_string()))
    }
}
