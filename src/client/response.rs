use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// What a request produced after content negotiation.
#[derive(Debug)]
pub enum ApiResponse {
    /// A JSON body, parsed.
    Json(Value),
    /// Anything else, handed back untouched (files, redirect targets).
    Raw(reqwest::Response),
}

impl ApiResponse {
    pub fn is_json(&self) -> bool {
        matches!(self, ApiResponse::Json(_))
    }

    /// The parsed payload. Raw responses are a decode error here.
    pub fn into_json(self) -> Result<Value> {
        match self {
            ApiResponse::Json(value) => Ok(value),
            ApiResponse::Raw(response) => Err(Error::Decode(format!(
                "expected a JSON response, got content type '{}'",
                content_type(&response).unwrap_or("none")
            ))),
        }
    }

    /// The payload deserialized into `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        let value = self.into_json()?;
        serde_json::from_value(value).map_err(|e| Error::Decode(e.to_string()))
    }

    pub fn into_raw(self) -> Option<reqwest::Response> {
        match self {
            ApiResponse::Raw(response) => Some(response),
            ApiResponse::Json(_) => None,
        }
    }
}

pub(crate) fn content_type(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
}

pub(crate) fn is_json_response(response: &reqwest::Response) -> bool {
    content_type(response)
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}
