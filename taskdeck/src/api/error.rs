use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("failed to call {call}: {source}")]
    Transport {
        call: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{call} returned status {status}")]
    Status { call: String, status: u16 },
    #[error("{call} was rejected: session expired or invalid")]
    Unauthorized { call: String },
    #[error("failed to parse {call} response: {message}")]
    Decode { call: String, message: String },
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn status(call: impl Into<String>, status: u16) -> Self {
        Self::Status {
            call: call.into(),
            status,
        }
    }
}
