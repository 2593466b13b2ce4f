use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A single posting as extracted from its detail page.
///
/// Scalar fields are never null: anything the extractor could not find is an
/// empty string, and `skills` is an empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    /// Raw breadcrumb, segments joined by " > ".
    pub category: String,
    pub min_education: String,
    pub location: String,
    pub work_type: String,
    pub skills: Vec<String>,
    pub url: String,
    pub fetched_at: DateTime<Utc>,
}

impl JobRecord {
    /// A record with every field empty except the source URL.
    pub fn empty(url: &str) -> Self {
        Self {
            title: String::new(),
            category: String::new(),
            min_education: String::new(),
            location: String::new(),
            work_type: String::new(),
            skills: Vec::new(),
            url: url.to_string(),
            fetched_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub min_education: String,
    pub location: String,
    pub work_type: String,
    pub skills: Json<Vec<String>>,
    pub url: String,
    pub fetched_at: DateTime<Utc>,
}

/// A persisted job together with its resolved category chain (parent → child).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredJob {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub min_education: String,
    pub location: String,
    pub work_type: String,
    pub skills: Vec<String>,
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    pub categories: Vec<String>,
}

impl StoredJob {
    pub fn from_row(row: JobRow, categories: Vec<String>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            category: row.category,
            min_education: row.min_education,
            location: row.location,
            work_type: row.work_type,
            skills: row.skills.0,
            url: row.url,
            fetched_at: row.fetched_at,
            categories,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}
