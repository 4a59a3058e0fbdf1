use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::models::{RecipeList, RecipePage};
use crate::search::{RecipeQuery, SearchParams};
use crate::state::AppState;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;

/// Kept as strings so "abc" falls back to the default instead of a 400
#[derive(Debug, Default)]
pub struct PaginationQuery {
    page: Option<String>,
    limit: Option<String>,
}

impl PaginationQuery {
    /// First value of each key wins, so `?page=1&page=2` is page 1
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut query.page,
                "limit" => &mut query.limit,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// Positive integer or the default / 解析正整数，否则使用默认值
fn positive_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

/// GET /api/recipes - 分页列出菜谱（按评分降序）
pub async fn list_recipes(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<RecipePage>, ApiError> {
    let params = PaginationQuery::from_pairs(pairs);
    let page = positive_or(params.page.as_deref(), DEFAULT_PAGE);
    let limit = positive_or(params.limit.as_deref(), DEFAULT_LIMIT);
    let offset = (page - 1).saturating_mul(limit);

    let (data, total) = tokio::try_join!(
        state.store.list_page(offset, limit),
        state.store.count()
    )?;

    Ok(Json(RecipePage { page, limit, total, data }))
}

/// GET /api/recipes/search - 条件搜索（最多200条）
pub async fn search_recipes(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<RecipeList>, ApiError> {
    let query = RecipeQuery::from_params(SearchParams::from_pairs(pairs))?;
    if query.is_empty() {
        tracing::debug!("Search without filters, returning top rated");
    }
    let data = state.store.search(&query).await?;

    tracing::debug!("Search matched {} recipes", data.len());
    Ok(Json(RecipeList { data }))
}
