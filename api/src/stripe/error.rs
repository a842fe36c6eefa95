use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// The `error` object the remote API returns alongside a non-2xx status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorDetail {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<String>,
    pub decline_code: Option<String>,
    pub param: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{}", api_message(.status, .detail))]
    Api {
        status: StatusCode,
        detail: ApiErrorDetail,
    },
    #[error("request to payment api failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("could not decode payment api response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

impl Error {
    pub(crate) fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let detail = serde_json::from_slice::<ApiErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_default();
        Error::Api { status, detail }
    }
}

fn api_message(status: &StatusCode, detail: &ApiErrorDetail) -> String {
    match &detail.message {
        Some(message) => message.clone(),
        None => format!("payment api request failed with status {status}"),
    }
}
