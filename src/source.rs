use crate::config::{SourceConfig, SourceSettings};
use crate::records::{self, Child, Teacher};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

pub const TEACHERS_ENDPOINT: &str = "GetTeachers";
pub const CHILDREN_ENDPOINT: &str = "GetChildren";
pub const TEACHERS_FIXTURE: &str = "teachers.xml";
pub const CHILDREN_FIXTURE: &str = "children.xml";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("records source answered {endpoint} with status {status}")]
    Unavailable { endpoint: String, status: u16 },
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },
    #[error("could not decode {endpoint} payload: {message}")]
    Malformed { endpoint: String, message: String },
}

impl SourceError {
    pub fn code(&self) -> &'static str {
        match self {
            SourceError::Unavailable { .. } | SourceError::Transport { .. } => {
                "source_unavailable"
            }
            SourceError::Malformed { .. } => "source_malformed",
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            SourceError::Unavailable { endpoint, .. }
            | SourceError::Transport { endpoint, .. }
            | SourceError::Malformed { endpoint, .. } => endpoint,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Unavailable { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Supplies the two record lists every view is built from.
pub trait RecordSource {
    fn kind(&self) -> &'static str;
    fn fetch_teachers(&self) -> Result<Vec<Teacher>, SourceError>;
    fn fetch_children(&self) -> Result<Vec<Child>, SourceError>;
}

pub fn open(settings: SourceSettings) -> Result<Box<dyn RecordSource>, SourceError> {
    match settings {
        SourceSettings::Http(cfg) => Ok(Box::new(HttpRecordSource::new(cfg)?)),
        SourceSettings::Fixtures(dir) => Ok(Box::new(FixtureRecordSource::new(dir))),
    }
}

fn decode<T>(
    endpoint: &str,
    body: &str,
    parse: fn(&str) -> Result<Vec<T>, quick_xml::DeError>,
) -> Result<Vec<T>, SourceError> {
    parse(body).map_err(|e| SourceError::Malformed {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

pub struct HttpRecordSource {
    config: SourceConfig,
    client: Client,
}

impl HttpRecordSource {
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::Transport {
                endpoint: config.base_url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { config, client })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    fn post(&self, endpoint: &str) -> Result<String, SourceError> {
        let url = self.url(endpoint);
        info!(endpoint, "http request to records source started");
        let transport = |e: reqwest::Error| SourceError::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        };
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .map_err(transport)?;
        let status = resp.status();
        if status != StatusCode::OK {
            warn!(endpoint, status = status.as_u16(), "records source unavailable");
            return Err(SourceError::Unavailable {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().map_err(transport)
    }
}

impl RecordSource for HttpRecordSource {
    fn kind(&self) -> &'static str {
        "http"
    }

    fn fetch_teachers(&self) -> Result<Vec<Teacher>, SourceError> {
        let body = self.post(TEACHERS_ENDPOINT)?;
        let teachers = decode(TEACHERS_ENDPOINT, &body, records::parse_teachers_xml)?;
        info!(count = teachers.len(), "fetched teachers");
        Ok(teachers)
    }

    fn fetch_children(&self) -> Result<Vec<Child>, SourceError> {
        let body = self.post(CHILDREN_ENDPOINT)?;
        let children = decode(CHILDREN_ENDPOINT, &body, records::parse_children_xml)?;
        info!(count = children.len(), "fetched children");
        Ok(children)
    }
}

/// Reads the same XML payloads from local files.
pub struct FixtureRecordSource {
    dir: PathBuf,
}

impl FixtureRecordSource {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn read(&self, file: &str) -> Result<String, SourceError> {
        let path = self.dir.join(file);
        std::fs::read_to_string(&path).map_err(|e| {
            warn!(path = %path.display(), "fixture unreadable");
            SourceError::Transport {
                endpoint: path.to_string_lossy().to_string(),
                message: e.to_string(),
            }
        })
    }
}

impl RecordSource for FixtureRecordSource {
    fn kind(&self) -> &'static str {
        "fixtures"
    }

    fn fetch_teachers(&self) -> Result<Vec<Teacher>, SourceError> {
        let body = self.read(TEACHERS_FIXTURE)?;
        decode(TEACHERS_FIXTURE, &body, records::parse_teachers_xml)
    }

    fn fetch_children(&self) -> Result<Vec<Child>, SourceError> {
        let body = self.read(CHILDREN_FIXTURE)?;
        decode(CHILDREN_FIXTURE, &body, records::parse_children_xml)
    }
}
