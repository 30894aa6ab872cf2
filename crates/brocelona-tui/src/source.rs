// Table sourcing: local tab-separated files or the CSV export of a published
// spreadsheet, with the local files as fallback.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use brocelona_core::schema::RawTable;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;

/// Give up on the spreadsheet export after this long and use local files.
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {name}: {source}")]
    Csv { name: String, source: csv::Error },

    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("cannot find a spreadsheet id in {url:?}")]
    InvalidSpreadsheetUrl { url: String },

    #[error("no table source available: {message}")]
    Unavailable { message: String },
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Where a set of tables was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOrigin {
    Local,
    Remote,
}

impl fmt::Display for TableOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableOrigin::Local => write!(f, "local files"),
            TableOrigin::Remote => write!(f, "spreadsheet"),
        }
    }
}

/// The two raw tables the league is computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueTables {
    pub matches: RawTable,
    pub attendance: RawTable,
    pub origin: TableOrigin,
}

/// Anything that can produce both league tables.
#[async_trait]
pub trait TableSource: Send + Sync {
    async fn fetch(&self) -> Result<LeagueTables, SourceError>;
}

// ---------------------------------------------------------------------------
// Reader-based parsing (enables testing without temp files)
// ---------------------------------------------------------------------------

/// Read a delimited table: first record is the header, every later record a
/// row. Ragged rows are accepted; `RawTable::new` pads them.
pub fn parse_table<R: Read>(rdr: R, delimiter: u8) -> Result<RawTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(rdr);
    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(RawTable::new(headers, rows))
}

/// Load a tab-separated file.
pub fn read_tsv(path: &Path) -> Result<RawTable, SourceError> {
    let file = std::fs::File::open(path).map_err(|e| SourceError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_table(file, b'\t').map_err(|e| SourceError::Csv {
        name: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Local source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LocalSource {
    matches: PathBuf,
    attendance: PathBuf,
}

impl LocalSource {
    pub fn new(matches: impl Into<PathBuf>, attendance: impl Into<PathBuf>) -> Self {
        LocalSource {
            matches: matches.into(),
            attendance: attendance.into(),
        }
    }

    /// Paths from `sources.toml`, resolved against `base_dir`.
    pub fn from_config(config: &Config, base_dir: &Path) -> Self {
        LocalSource::new(
            base_dir.join(&config.sources.local.matches),
            base_dir.join(&config.sources.local.attendance),
        )
    }
}

#[async_trait]
impl TableSource for LocalSource {
    async fn fetch(&self) -> Result<LeagueTables, SourceError> {
        let matches = read_tsv(&self.matches)?;
        let attendance = read_tsv(&self.attendance)?;
        Ok(LeagueTables {
            matches,
            attendance,
            origin: TableOrigin::Local,
        })
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet source
// ---------------------------------------------------------------------------

/// Extract the document id from a spreadsheet URL (`.../d/{id}/...`).
pub fn spreadsheet_id(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("/d/")?;
    let id = rest.split(['/', '?', '#']).next()?;
    (!id.is_empty()).then_some(id)
}

/// CSV export URL of one sheet of a published spreadsheet.
pub fn export_url(doc_id: &str, gid: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{doc_id}/export?format=csv&gid={gid}")
}

pub struct SheetSource {
    http: reqwest::Client,
    doc_id: String,
    match_gid: String,
    attendance_gid: String,
}

impl SheetSource {
    pub fn new(
        spreadsheet_url: &str,
        match_gid: impl Into<String>,
        attendance_gid: impl Into<String>,
    ) -> Result<Self, SourceError> {
        let doc_id = spreadsheet_id(spreadsheet_url).ok_or_else(|| {
            SourceError::InvalidSpreadsheetUrl {
                url: spreadsheet_url.to_string(),
            }
        })?;
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| SourceError::Http {
                url: spreadsheet_url.to_string(),
                source: e,
            })?;
        Ok(SheetSource {
            http,
            doc_id: doc_id.to_string(),
            match_gid: match_gid.into(),
            attendance_gid: attendance_gid.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let url = config.spreadsheet_url().unwrap_or_default();
        SheetSource::new(
            url,
            config.sources.remote.match_gid.clone(),
            config.sources.remote.attendance_gid.clone(),
        )
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    async fn fetch_sheet(&self, gid: &str) -> Result<RawTable, SourceError> {
        let url = export_url(&self.doc_id, gid);
        let http_err = |e: reqwest::Error| SourceError::Http {
            url: url.clone(),
            source: e,
        };
        let body = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_err)?
            .bytes()
            .await
            .map_err(http_err)?;
        parse_table(body.as_ref(), b',').map_err(|e| SourceError::Csv { name: url, source: e })
    }
}

#[async_trait]
impl TableSource for SheetSource {
    async fn fetch(&self) -> Result<LeagueTables, SourceError> {
        let matches = self.fetch_sheet(&self.match_gid).await?;
        let attendance = self.fetch_sheet(&self.attendance_gid).await?;
        Ok(LeagueTables {
            matches,
            attendance,
            origin: TableOrigin::Remote,
        })
    }
}

// ---------------------------------------------------------------------------
// Source selection
// ---------------------------------------------------------------------------

/// The sources tried on every load: an optional remote, then the local files.
pub struct SourceSet {
    pub remote: Option<Box<dyn TableSource>>,
    pub local: Box<dyn TableSource>,
}

impl SourceSet {
    /// Build from config. `env_flag` is the value of `USE_GOOGLE_SHEETS`.
    /// A remote that cannot be built (bad URL) is logged and left out.
    pub fn from_config(config: &Config, base_dir: &Path, env_flag: Option<&str>) -> Self {
        let local: Box<dyn TableSource> = Box::new(LocalSource::from_config(config, base_dir));
        let remote: Option<Box<dyn TableSource>> = if config.use_remote(env_flag) {
            match SheetSource::from_config(config) {
                Ok(sheet) => {
                    info!("Reading league tables from spreadsheet {}", sheet.doc_id());
                    Some(Box::new(sheet))
                }
                Err(e) => {
                    warn!("Spreadsheet source disabled, using local files: {}", e);
                    None
                }
            }
        } else {
            None
        };
        SourceSet { remote, local }
    }

    /// Fetch from the remote when configured, falling back to local files.
    pub async fn load(&self) -> Result<LeagueTables, SourceError> {
        let mut remote_error = None;
        if let Some(remote) = &self.remote {
            match remote.fetch().await {
                Ok(tables) => return Ok(tables),
                Err(e) => {
                    warn!("Spreadsheet fetch failed, falling back to local files: {}", e);
                    remote_error = Some(e);
                }
            }
        }
        self.local.fetch().await.map_err(|local| {
            let message = match remote_error {
                Some(remote) => format!("{remote}; {local}"),
                None => local.to_string(),
            };
            SourceError::Unavailable { message }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
