//! Bulk recipe import / 批量导入菜谱
//!
//! Reads a JSON dataset (an array of recipe objects, or an object whose values
//! are recipe objects), normalizes each record and replaces the whole
//! collection with the result.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::db::{ImportReport, RecipeStore};
use crate::models::{NewRecipe, Nutrients, NUTRIENT_KEYS};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Usage: recipes-import <path-to-recipes.json>")]
    MissingArgument,

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Expected a JSON array or object of recipes, found {0}")]
    UnsupportedShape(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Parsed dataset / 解析结果
#[derive(Debug, Default)]
pub struct Dataset {
    pub recipes: Vec<NewRecipe>,
    /// Entries that were not JSON objects / 非对象条目数
    pub skipped: u64,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Resolve a CLI path against the working directory / 解析为绝对路径
pub fn resolve_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    }
}

/// Read and normalize a dataset file / 读取并规范化数据文件
pub fn load_dataset(path: &Path) -> Result<Dataset, ImportError> {
    let path = resolve_path(path);
    if !path.is_file() {
        return Err(ImportError::FileNotFound(path));
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ImportError::Read {
        path: path.clone(),
        source,
    })?;

    parse_dataset(&content)
}

/// Normalize dataset JSON text / 规范化数据集
pub fn parse_dataset(content: &str) -> Result<Dataset, ImportError> {
    let parsed: Value = serde_json::from_str(content)?;
    let entries: Vec<Value> = match parsed {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        other => return Err(ImportError::UnsupportedShape(json_kind(&other))),
    };

    let mut dataset = Dataset::default();
    for (index, entry) in entries.iter().enumerate() {
        match entry {
            Value::Object(record) => dataset.recipes.push(normalize_record(record)),
            other => {
                dataset.skipped += 1;
                tracing::warn!("Skipping entry #{}: expected an object, found {}", index, json_kind(other));
            }
        }
    }
    Ok(dataset)
}

/// Normalize one raw record / 规范化单条记录
pub fn normalize_record(record: &Map<String, Value>) -> NewRecipe {
    let text = |key: &str| record.get(key).and_then(to_text);
    let number = |key: &str| record.get(key).and_then(to_number);

    let mut nutrients = Nutrients::default();
    if let Some(Value::Object(raw)) = record.get("nutrients") {
        for key in NUTRIENT_KEYS {
            if let Some(value) = raw.get(key).and_then(stringify) {
                nutrients.set(key, value);
            }
        }
    }

    NewRecipe {
        cuisine: text("cuisine"),
        title: text("title"),
        rating: number("rating"),
        prep_time: number("prep_time"),
        cook_time: number("cook_time"),
        total_time: number("total_time"),
        description: text("description"),
        nutrients,
        serves: text("serves"),
    }
}

/// Finite number or nothing / 数值转换（非有限值为空）
fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse::<f64>().ok()
            }
        }
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Text fields keep strings, scalars are cast, containers are dropped
fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(_) | Value::Bool(_) => stringify(value),
        _ => None,
    }
}

/// Render any JSON value as text; null counts as absent
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(format_number(n)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Integral floats print without a trailing ".0", like a JS runtime would
fn format_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// Replace the store contents with a parsed dataset / 全量替换
pub async fn import_dataset(store: &RecipeStore, dataset: &Dataset) -> Result<ImportReport, ImportError> {
    let mut report = store.replace_all(&dataset.recipes).await?;
    report.failed += dataset.skipped;

    if report.failed > 0 {
        tracing::warn!("{} of {} entries were not imported", report.failed, report.failed + report.inserted);
    }
    tracing::info!("Replaced {} old recipes with {} new ones", report.deleted, report.inserted);
    Ok(report)
}
