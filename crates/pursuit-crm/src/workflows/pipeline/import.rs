use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::StakeholderKind;

/// One usable row from a portfolio export. Rows missing a project code or
/// name are dropped by the parser, not surfaced as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioRow {
    pub code: String,
    pub name: String,
    pub client: Option<String>,
    pub client_kind: StakeholderKind,
    pub owner: String,
}

#[derive(Debug)]
pub enum PortfolioImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for PortfolioImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortfolioImportError::Io(err) => write!(f, "failed to read portfolio export: {}", err),
            PortfolioImportError::Csv(err) => write!(f, "invalid portfolio CSV data: {}", err),
        }
    }
}

impl std::error::Error for PortfolioImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PortfolioImportError::Io(err) => Some(err),
            PortfolioImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for PortfolioImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for PortfolioImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct PortfolioImporter;

impl PortfolioImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<PortfolioRow>, PortfolioImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<PortfolioRow>, PortfolioImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut rows = Vec::new();

        for record in csv_reader.deserialize::<PortfolioCsvRow>() {
            let row = record?;
            if row.code.trim().is_empty() || row.name.trim().is_empty() {
                continue;
            }

            rows.push(PortfolioRow {
                code: row.code.trim().to_string(),
                name: row.name.trim().to_string(),
                client: row.client.filter(|value| !value.is_empty()),
                client_kind: parse_kind(row.client_kind.as_deref()),
                owner: row
                    .owner
                    .filter(|value| !value.is_empty())
                    .unwrap_or_else(|| "unassigned".to_string()),
            });
        }

        Ok(rows)
    }
}

#[derive(Debug, Deserialize)]
struct PortfolioCsvRow {
    #[serde(rename = "Project Code")]
    code: String,
    #[serde(rename = "Project Name")]
    name: String,
    #[serde(rename = "Client", default, deserialize_with = "empty_string_as_none")]
    client: Option<String>,
    #[serde(
        rename = "Client Kind",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    client_kind: Option<String>,
    #[serde(rename = "Owner", default, deserialize_with = "empty_string_as_none")]
    owner: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_kind(raw: Option<&str>) -> StakeholderKind {
    match raw.map(|value| value.trim().to_ascii_lowercase()) {
        Some(value) if value == "consultant" => StakeholderKind::Consultant,
        Some(value) if value == "partner" => StakeholderKind::Partner,
        _ => StakeholderKind::Client,
    }
}
