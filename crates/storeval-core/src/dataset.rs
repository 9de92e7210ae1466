//! Dataset ingestion: resolve heterogeneous inputs (inline records, nested
//! lists, file locators) into an ordered sequence of [`ScenarioRow`]s.
//!
//! A referenced file is either a single JSON array or newline-delimited JSON
//! records. Resolution is recursive with no depth limit; ordering follows
//! traversal order exactly. Malformed records are fatal: silent data loss in
//! an evaluation dataset is worse than a hard failure.

use std::path::PathBuf;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::types::ScenarioRow;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("{source_ref}: missing required field `{field}`")]
    MissingField {
        source_ref: String,
        field: &'static str,
    },
    #[error("{source_ref}: {message}")]
    Parse { source_ref: String, message: String },
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
}

/// One raw dataset record before resolution. The system prompt may be given
/// inline or as a path to a file holding its full text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_truth: Option<String>,
}

impl ScenarioRecord {
    pub fn inline(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: Some(system_prompt.into()),
            system_prompt_path: None,
            user_prompt: Some(user_prompt.into()),
            ground_truth: None,
        }
    }
}

/// A dataset input: a record, a nested list, or a locator for a JSON-array
/// or JSON-Lines file.
#[derive(Debug, Clone)]
pub enum DatasetInput {
    Record(ScenarioRecord),
    List(Vec<DatasetInput>),
    Path(PathBuf),
}

impl From<ScenarioRecord> for DatasetInput {
    fn from(record: ScenarioRecord) -> Self {
        DatasetInput::Record(record)
    }
}

impl From<PathBuf> for DatasetInput {
    fn from(path: PathBuf) -> Self {
        DatasetInput::Path(path)
    }
}

impl From<&str> for DatasetInput {
    fn from(path: &str) -> Self {
        DatasetInput::Path(PathBuf::from(path))
    }
}

/// Flatten `inputs` into scenario rows, preserving traversal order.
/// Repeatable: same inputs, same rows. Any unresolvable record aborts.
pub async fn flatten(inputs: &[DatasetInput]) -> Result<Vec<ScenarioRow>, DatasetError> {
    let mut rows = Vec::new();
    for input in inputs {
        resolve(input.clone(), "inline input".to_string(), &mut rows).await?;
    }
    Ok(rows)
}

fn resolve<'a>(
    input: DatasetInput,
    source_ref: String,
    rows: &'a mut Vec<ScenarioRow>,
) -> BoxFuture<'a, Result<(), DatasetError>> {
    async move {
        match input {
            DatasetInput::Record(record) => {
                rows.push(resolve_record(&record, &source_ref).await?);
                Ok(())
            }
            DatasetInput::List(items) => {
                for item in items {
                    resolve(item, source_ref.clone(), rows).await?;
                }
                Ok(())
            }
            DatasetInput::Path(path) => {
                let display = path.display().to_string();
                let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
                    DatasetError::Read {
                        path: display.clone(),
                        message: e.to_string(),
                    }
                })?;
                let text = text.trim();
                if text.starts_with('[') {
                    let value: Value =
                        serde_json::from_str(text).map_err(|e| DatasetError::Parse {
                            source_ref: display.clone(),
                            message: e.to_string(),
                        })?;
                    let item = input_from_value(value, &display)?;
                    resolve(item, display, rows).await
                } else {
                    for (idx, line) in text.lines().enumerate() {
                        if line.trim().is_empty() {
                            continue;
                        }
                        let line_ref = format!("{}:{}", display, idx + 1);
                        let value: Value =
                            serde_json::from_str(line).map_err(|e| DatasetError::Parse {
                                source_ref: line_ref.clone(),
                                message: e.to_string(),
                            })?;
                        let item = input_from_value(value, &line_ref)?;
                        resolve(item, line_ref, rows).await?;
                    }
                    Ok(())
                }
            }
        }
    }
    .boxed()
}

fn input_from_value(value: Value, source_ref: &str) -> Result<DatasetInput, DatasetError> {
    match value {
        Value::Object(_) => {
            let record: ScenarioRecord =
                serde_json::from_value(value).map_err(|e| DatasetError::Parse {
                    source_ref: source_ref.to_string(),
                    message: e.to_string(),
                })?;
            Ok(DatasetInput::Record(record))
        }
        Value::Array(items) => {
            let mut nested = Vec::with_capacity(items.len());
            for item in items {
                nested.push(input_from_value(item, source_ref)?);
            }
            Ok(DatasetInput::List(nested))
        }
        other => Err(DatasetError::Parse {
            source_ref: source_ref.to_string(),
            message: format!("expected object or array, got {}", json_type_name(&other)),
        }),
    }
}

async fn resolve_record(
    record: &ScenarioRecord,
    source_ref: &str,
) -> Result<ScenarioRow, DatasetError> {
    let user_prompt = record
        .user_prompt
        .clone()
        .ok_or_else(|| DatasetError::MissingField {
            source_ref: source_ref.to_string(),
            field: "user_prompt",
        })?;
    let system_prompt = if let Some(inline) = &record.system_prompt {
        inline.clone()
    } else if let Some(path) = &record.system_prompt_path {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DatasetError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
    } else {
        return Err(DatasetError::MissingField {
            source_ref: source_ref.to_string(),
            field: "system_prompt",
        });
    };
    Ok(ScenarioRow {
        system_prompt,
        user_prompt,
        ground_truth: record.ground_truth.clone().unwrap_or_default(),
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
