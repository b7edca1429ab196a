use std::io;

#[derive(thiserror::Error, Debug)]
pub enum DashboardError {
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout")]
    Timeout,
    #[error("http error: {0}")]
    Http(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("analysis failed: {0}")]
    Endpoint(String),
    #[error("unknown detection type: {0}")]
    UnknownType(String),
    #[error("no detection with id {0}")]
    UnknownDetection(u64),
    #[error("{0} already in progress")]
    Busy(&'static str),
    #[error("artifact error: {0}")]
    Artifact(String),
    #[error("unknown error")]
    Unknown,
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DashboardError::Timeout
        } else if err.is_connect() {
            DashboardError::Network(err.to_string())
        } else if err.is_status() {
            DashboardError::Http(err.to_string())
        } else {
            DashboardError::Unknown
        }
    }
}
