//! Input file loading.

use crate::error::{CliError, CliResult};
use persona_core::{Demographics, RawResponseSet};
use serde::Deserialize;
use std::path::Path;

/// One respondent in a population file: raw answers plus demographics.
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyRecord {
    pub id: String,
    pub responses: serde_json::Value,
    #[serde(default)]
    pub demographics: Demographics,
}

pub fn read_text(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> CliResult<T> {
    let text = read_text(path)?;
    parse_json(path, &text)
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &Path, text: &str) -> CliResult<T> {
    serde_json::from_str(text).map_err(|e| CliError::Json {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// A JSON object of item id to integer score.
pub fn load_responses(path: &Path) -> CliResult<RawResponseSet> {
    let value: serde_json::Value = read_json(path)?;
    Ok(RawResponseSet::from_json(&value)?)
}

/// A JSON object of demographic field to value; absent path means none.
pub fn load_demographics(path: Option<&Path>) -> CliResult<Demographics> {
    match path {
        Some(path) => read_json(path),
        None => Ok(Demographics::new()),
    }
}

/// A JSON array of `SurveyRecord`.
pub fn load_population(path: &Path) -> CliResult<Vec<SurveyRecord>> {
    read_json(path)
}
