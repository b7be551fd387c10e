use std::io;

#[derive(thiserror::Error, Debug)]
pub enum TriageError {
    #[error("upstream returned a malformed JSON body: {0}")]
    InvalidOuterJson(String),
    #[error("upstream returned malformed nested JSON in the response field: {raw}")]
    InvalidNestedJson { raw: String },
    #[error(
        "upstream workflow did not return analysis data; check that the workflow \
         includes AI analysis nodes and returns threat_score, cause, remedy, \
         mitre_technique, approach"
    )]
    MissingAnalysisFields,
    #[error("upstream workflow error (status {status}): {message}")]
    UpstreamHttp {
        status: u16,
        message: String,
        hint: Option<String>,
    },
    #[error("cannot reach the analysis endpoint: {0}")]
    NetworkUnreachable(String),
    #[error("history storage unavailable: {0}")]
    PersistenceUnavailable(String),
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<reqwest::Error> for TriageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_status() {
            TriageError::UpstreamHttp {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                message: err.to_string(),
                hint: None,
            }
        } else {
            TriageError::NetworkUnreachable(err.to_string())
        }
    }
}

impl From<rusqlite::Error> for TriageError {
    fn from(err: rusqlite::Error) -> Self {
        TriageError::PersistenceUnavailable(err.to_string())
    }
}
