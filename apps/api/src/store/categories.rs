//! Category Decomposer: breadcrumb string to a parent → child chain in the
//! category forest, with the owning job linked to every node.

use async_trait::async_trait;

use crate::store::StoreError;

/// Ordered, trimmed, non-empty segments. `>` is what the extractor emits;
/// the comma variants cover breadcrumbs stored by older crawls.
pub fn split_breadcrumb(raw: &str) -> Vec<String> {
    raw.split(|c| matches!(c, '>' | ',' | '،'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Write access to the category forest within one unit of work.
#[async_trait]
pub trait CategoryForest: Send {
    /// Id of the node named `name` directly under `parent` (root when `None`),
    /// creating it if absent.
    async fn find_or_create(&mut self, name: &str, parent: Option<i64>) -> Result<i64, StoreError>;

    /// Idempotent: linking the same pair twice is a no-op.
    async fn link_job(&mut self, job_id: i64, category_id: i64, position: i32) -> Result<(), StoreError>;
}

/// Walks the breadcrumb left to right and returns the chain of node ids.
pub async fn link_category_chain<F>(
    forest: &mut F,
    job_id: i64,
    breadcrumb: &str,
) -> Result<Vec<i64>, StoreError>
where
    F: CategoryForest + ?Sized,
{
    let mut parent = None;
    let mut chain = Vec::new();
    for (position, name) in split_breadcrumb(breadcrumb).iter().enumerate() {
        let id = forest.find_or_create(name, parent).await?;
        forest.link_job(job_id, id, position as i32).await?;
        chain.push(id);
        parent = Some(id);
    }
    Ok(chain)
}
