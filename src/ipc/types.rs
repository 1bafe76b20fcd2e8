use crate::insights::SubjectMatch;
use crate::source::RecordSource;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub source: Option<Box<dyn RecordSource>>,
    pub subject_match: SubjectMatch,
}
