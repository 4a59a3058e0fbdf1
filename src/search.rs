//! Recipe search query construction / 菜谱搜索条件构建
//!
//! Turns raw query-string filters into a validated [`RecipeQuery`], then into
//! SQL predicates over the `recipes` table. All supplied filters are ANDed.

use sqlx::{QueryBuilder, Sqlite};

use crate::filter::NumericFilter;

/// Upper bound on search results / 搜索结果上限
pub const MAX_SEARCH_RESULTS: usize = 200;

/// Numeric fields that accept comparator filters / 支持比较过滤的数值字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Rating,
    TotalTime,
    Calories,
}

impl NumericField {
    /// Query parameter name, also used in error messages
    pub fn param(&self) -> &'static str {
        match self {
            NumericField::Rating => "rating",
            NumericField::TotalTime => "total_time",
            NumericField::Calories => "calories",
        }
    }

    /// Backing column. Calories compare against the number extracted at import time.
    pub fn column(&self) -> &'static str {
        match self {
            NumericField::Rating => "rating",
            NumericField::TotalTime => "total_time",
            NumericField::Calories => "calories_value",
        }
    }
}

/// Raw search parameters as they arrive on the query string / 搜索请求参数
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub title: Option<String>,
    pub cuisine: Option<String>,
    pub rating: Option<String>,
    pub total_time: Option<String>,
    pub calories: Option<String>,
}

impl SearchParams {
    /// Collect from decoded query pairs. A repeated key keeps its first value,
    /// unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "title" => &mut params.title,
                "cuisine" => &mut params.cuisine,
                "rating" => &mut params.rating,
                "total_time" => &mut params.total_time,
                "calories" => &mut params.calories,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

/// A numeric filter that failed to parse, tagged with its field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidFilter(pub NumericField);

/// Validated search / 校验后的搜索条件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeQuery {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Exact cuisine
    pub cuisine: Option<String>,
    pub rating: Option<NumericFilter>,
    pub total_time: Option<NumericFilter>,
    pub calories: Option<NumericFilter>,
}

/// Empty query-string values count as "not supplied"
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_numeric(
    field: NumericField,
    raw: Option<String>,
) -> Result<Option<NumericFilter>, InvalidFilter> {
    match non_empty(raw) {
        Some(raw) => raw.parse().map(Some).map_err(|e| {
            tracing::debug!("Rejected {} filter: {}", field.param(), e);
            InvalidFilter(field)
        }),
        None => Ok(None),
    }
}

impl RecipeQuery {
    /// Validate raw parameters. The first malformed numeric filter wins, in
    /// rating, total_time, calories order.
    pub fn from_params(params: SearchParams) -> Result<Self, InvalidFilter> {
        Ok(Self {
            title: non_empty(params.title),
            cuisine: non_empty(params.cuisine),
            rating: parse_numeric(NumericField::Rating, params.rating)?,
            total_time: parse_numeric(NumericField::TotalTime, params.total_time)?,
            calories: parse_numeric(NumericField::Calories, params.calories)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.cuisine.is_none()
            && self.numeric_filters().next().is_none()
    }

    fn numeric_filters(&self) -> impl Iterator<Item = (NumericField, NumericFilter)> + '_ {
        [
            (NumericField::Rating, self.rating),
            (NumericField::TotalTime, self.total_time),
            (NumericField::Calories, self.calories),
        ]
        .into_iter()
        .filter_map(|(field, filter)| filter.map(|f| (field, f)))
    }

    /// Append `AND ...` predicates to a builder whose SQL already has a WHERE clause
    pub fn push_predicates(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        if let Some(title) = &self.title {
            // title_lower is lowercased with the same Unicode rules at insert time
            qb.push(" AND instr(title_lower, ")
                .push_bind(title.to_lowercase())
                .push(") > 0");
        }
        if let Some(cuisine) = &self.cuisine {
            qb.push(" AND cuisine = ").push_bind(cuisine.clone());
        }
        for (field, filter) in self.numeric_filters() {
            // NULL never satisfies a comparison, so missing values drop out
            qb.push(format!(" AND {} {} ", field.column(), filter.op.as_sql()))
                .push_bind(filter.value);
        }
    }
}
