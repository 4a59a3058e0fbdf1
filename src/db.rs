//! Recipe store on SQLite / 菜谱存储
//!
//! Owns the connection pool. Opened once at startup, handed to the HTTP layer
//! through `AppState`, closed after shutdown.

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use crate::models::{NewRecipe, Nutrients, Recipe};
use crate::search::{RecipeQuery, MAX_SEARCH_RESULTS};

const RECIPE_COLUMNS: &str = "id, cuisine, title, rating, prep_time, cook_time, total_time, description, serves, nutrients";

/// Rating descending, missing ratings last, insertion order for ties
const RECIPE_ORDER: &str = " ORDER BY rating DESC, rowid ASC";

#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: String,
    cuisine: Option<String>,
    title: Option<String>,
    rating: Option<f64>,
    prep_time: Option<f64>,
    cook_time: Option<f64>,
    total_time: Option<f64>,
    description: Option<String>,
    serves: Option<String>,
    nutrients: Json<Nutrients>,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Recipe {
            id: row.id,
            cuisine: row.cuisine,
            title: row.title,
            rating: row.rating,
            prep_time: row.prep_time,
            cook_time: row.cook_time,
            total_time: row.total_time,
            description: row.description,
            nutrients: row.nutrients.0,
            serves: row.serves,
        }
    }
}

/// Outcome of a full-replace import / 导入结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Rows removed before inserting / 删除的旧记录数
    pub deleted: u64,
    /// Rows inserted / 成功插入数
    pub inserted: u64,
    /// Records that could not be inserted / 失败数
    pub failed: u64,
}

#[derive(Clone)]
pub struct RecipeStore {
    pool: SqlitePool,
}

impl RecipeStore {
    /// Open the pool and make sure the schema exists / 连接数据库并初始化表结构
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10));

        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let pool_options = if in_memory {
            // An in-memory database lives only as long as its connection
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    /// Create table and indexes if missing / 创建表结构（不删除已有数据）
    pub async fn init(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recipes (
                id TEXT PRIMARY KEY,
                cuisine TEXT,
                title TEXT,
                title_lower TEXT,
                rating REAL,
                prep_time REAL,
                cook_time REAL,
                total_time REAL,
                description TEXT,
                serves TEXT,
                nutrients TEXT NOT NULL DEFAULT '{}',
                calories_value REAL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        for ddl in [
            "CREATE INDEX IF NOT EXISTS idx_recipes_cuisine ON recipes(cuisine)",
            "CREATE INDEX IF NOT EXISTS idx_recipes_title_lower ON recipes(title_lower)",
            "CREATE INDEX IF NOT EXISTS idx_recipes_rating ON recipes(rating)",
            "CREATE INDEX IF NOT EXISTS idx_recipes_total_time ON recipes(total_time)",
        ] {
            sqlx::query(ddl).execute(&self.pool).await?;
        }

        Ok(())
    }

    /// Close the pool / 关闭数据库连接池
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
            .fetch_one(&self.pool)
            .await
    }

    /// One page of all recipes by rating / 分页列出菜谱
    pub async fn list_page(&self, offset: i64, limit: i64) -> Result<Vec<Recipe>, sqlx::Error> {
        let rows: Vec<RecipeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM recipes{} LIMIT ? OFFSET ?",
            RECIPE_COLUMNS, RECIPE_ORDER
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    /// Filtered search, capped at MAX_SEARCH_RESULTS / 条件搜索
    pub async fn search(&self, query: &RecipeQuery) -> Result<Vec<Recipe>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM recipes WHERE 1 = 1",
            RECIPE_COLUMNS
        ));
        query.push_predicates(&mut qb);
        qb.push(RECIPE_ORDER);
        qb.push(" LIMIT ").push_bind(MAX_SEARCH_RESULTS as i64);

        tracing::debug!("Recipe search: {}", qb.sql());

        let rows: Vec<RecipeRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    /// Delete everything, then insert all records in one transaction / 全量替换
    ///
    /// A record that fails to insert is logged and counted; the rest still go in.
    pub async fn replace_all(&self, recipes: &[NewRecipe]) -> Result<ImportReport, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM recipes")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut report = ImportReport { deleted, ..Default::default() };
        for (index, recipe) in recipes.iter().enumerate() {
            match insert_recipe(&mut tx, recipe).await {
                Ok(()) => report.inserted += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!("Failed to insert record #{} ({:?}): {}", index, recipe.title, e);
                }
            }
        }

        tx.commit().await?;
        Ok(report)
    }
}

async fn insert_recipe(conn: &mut SqliteConnection, recipe: &NewRecipe) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO recipes (
            id, cuisine, title, title_lower, rating, prep_time, cook_time, total_time,
            description, serves, nutrients, calories_value
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&recipe.cuisine)
    .bind(&recipe.title)
    .bind(recipe.title.as_ref().map(|t| t.to_lowercase()))
    .bind(recipe.rating)
    .bind(recipe.prep_time)
    .bind(recipe.cook_time)
    .bind(recipe.total_time)
    .bind(&recipe.description)
    .bind(&recipe.serves)
    .bind(Json(&recipe.nutrients))
    .bind(recipe.nutrients.calories_value())
    .execute(conn)
    .await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::filter::NumericFilter;
    use crate::search::SearchParams;

    pub(crate) async fn memory_store() -> RecipeStore {
        RecipeStore::connect("sqlite::memory:").await.unwrap()
    }

    pub(crate) fn recipe(title: &str, rating: Option<f64>) -> NewRecipe {
        NewRecipe {
            title: Some(title.to_string()),
            rating,
            ..Default::default()
        }
    }

    fn with_calories(mut r: NewRecipe, calories: &str) -> NewRecipe {
        r.nutrients.calories = Some(calories.to_string());
        r
    }

    fn titles(recipes: &[Recipe]) -> Vec<String> {
        recipes.iter().map(|r| r.title.clone().unwrap_or_default()).collect()
    }

    fn query(params: SearchParams) -> RecipeQuery {
        RecipeQuery::from_params(params).unwrap()
    }

    #[tokio::test]
    async fn test_list_page_orders_by_rating() {
        let store = memory_store().await;
        // Ratings 0.0, 0.1 ... 2.4 inserted in ascending order
        let recipes: Vec<NewRecipe> = (0..25)
            .map(|i| recipe(&format!("r{:02}", i), Some(i as f64 / 10.0)))
            .collect();
        store.replace_all(&recipes).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 25);

        let page = store.list_page(10, 10).await.unwrap();
        let expected: Vec<String> = (5..15).rev().map(|i| format!("r{:02}", i)).collect();
        assert_eq!(titles(&page), expected);

        let tail = store.list_page(20, 10).await.unwrap();
        assert_eq!(tail.len(), 5);
        assert!(store.list_page(30, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_rating_sorts_last() {
        let store = memory_store().await;
        store
            .replace_all(&[recipe("none", None), recipe("low", Some(1.0)), recipe("high", Some(5.0))])
            .await
            .unwrap();
        let all = store.list_page(0, 10).await.unwrap();
        assert_eq!(titles(&all), vec!["high", "low", "none"]);
        assert!(all[2].rating.is_none());
    }

    #[tokio::test]
    async fn test_replace_all_is_full_replace() {
        let store = memory_store().await;
        let input = vec![recipe("a", Some(1.0)), recipe("b", Some(2.0))];

        let first = store.replace_all(&input).await.unwrap();
        assert_eq!(first, ImportReport { deleted: 0, inserted: 2, failed: 0 });

        let second = store.replace_all(&input).await.unwrap();
        assert_eq!(second, ImportReport { deleted: 2, inserted: 2, failed: 0 });

        assert_eq!(store.count().await.unwrap(), 2);
        let all = store.list_page(0, 10).await.unwrap();
        assert_eq!(titles(&all), vec!["b", "a"]);
        assert_ne!(all[0].id, all[1].id);
    }

    #[tokio::test]
    async fn test_round_trips_all_fields() {
        let store = memory_store().await;
        let mut input = with_calories(recipe("Apple Pie", Some(4.8)), "389 kcal");
        input.cuisine = Some("Southern Recipes".to_string());
        input.prep_time = Some(20.0);
        input.cook_time = Some(60.0);
        input.total_time = Some(80.0);
        input.description = Some("Flaky.".to_string());
        input.serves = Some("8 servings".to_string());
        input.nutrients.fat_content = Some("18 g".to_string());
        store.replace_all(&[input.clone()]).await.unwrap();

        let got = store.list_page(0, 1).await.unwrap().remove(0);
        assert_eq!(got.cuisine, input.cuisine);
        assert_eq!(got.title, input.title);
        assert_eq!(got.rating, Some(4.8));
        assert_eq!(got.prep_time, Some(20.0));
        assert_eq!(got.cook_time, Some(60.0));
        assert_eq!(got.total_time, Some(80.0));
        assert_eq!(got.description, input.description);
        assert_eq!(got.serves, input.serves);
        assert_eq!(got.nutrients, input.nutrients);
    }

    #[tokio::test]
    async fn test_search_title_case_insensitive() {
        let store = memory_store().await;
        store
            .replace_all(&[
                recipe("Apple PIE", Some(4.0)),
                recipe("Shepherd's pie", Some(3.0)),
                recipe("Pancakes", Some(5.0)),
                NewRecipe::default(),
            ])
            .await
            .unwrap();

        let hits = store
            .search(&query(SearchParams { title: Some("pie".into()), ..Default::default() }))
            .await
            .unwrap();
        assert_eq!(titles(&hits), vec!["Apple PIE", "Shepherd's pie"]);

        // LIKE wildcards carry no special meaning
        let hits = store
            .search(&query(SearchParams { title: Some("%".into()), ..Default::default() }))
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_cuisine_exact() {
        let store = memory_store().await;
        let mut a = recipe("a", Some(1.0));
        a.cuisine = Some("Italian".to_string());
        let mut b = recipe("b", Some(2.0));
        b.cuisine = Some("Italian Desserts".to_string());
        store.replace_all(&[a, b]).await.unwrap();

        let hits = store
            .search(&query(SearchParams { cuisine: Some("Italian".into()), ..Default::default() }))
            .await
            .unwrap();
        assert_eq!(titles(&hits), vec!["a"]);
    }

    #[tokio::test]
    async fn test_search_rating_and_time() {
        let store = memory_store().await;
        let mut quick = recipe("quick", Some(4.5));
        quick.total_time = Some(15.0);
        let mut slow = recipe("slow", Some(4.9));
        slow.total_time = Some(240.0);
        let meh = recipe("meh", Some(4.4));
        store.replace_all(&[quick, slow, meh]).await.unwrap();

        let hits = store
            .search(&query(SearchParams { rating: Some(">=4.5".into()), ..Default::default() }))
            .await
            .unwrap();
        assert_eq!(titles(&hits), vec!["slow", "quick"]);
        let filter: NumericFilter = ">=4.5".parse().unwrap();
        assert!(hits.iter().all(|r| filter.accepts(r.rating)));

        let hits = store
            .search(&query(SearchParams {
                rating: Some(">=4.5".into()),
                total_time: Some("<=30".into()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(titles(&hits), vec!["quick"]);
    }

    #[tokio::test]
    async fn test_search_calories() {
        let store = memory_store().await;
        store
            .replace_all(&[
                with_calories(recipe("light", Some(3.0)), "389 kcal"),
                with_calories(recipe("heavy", Some(4.0)), "812 kcal"),
                with_calories(recipe("garbage", Some(5.0)), "not a number"),
                recipe("unknown", Some(2.0)),
            ])
            .await
            .unwrap();

        let hits = store
            .search(&query(SearchParams { calories: Some("<=400".into()), ..Default::default() }))
            .await
            .unwrap();
        assert_eq!(titles(&hits), vec!["light"]);

        for filter in [">=0", "<=100000", "=0", ">0", "<1"] {
            let hits = store
                .search(&query(SearchParams { calories: Some(filter.into()), ..Default::default() }))
                .await
                .unwrap();
            assert!(
                !titles(&hits).iter().any(|t| t == "garbage" || t == "unknown"),
                "{filter} matched a recipe without numeric calories"
            );
        }
    }

    #[tokio::test]
    async fn test_search_caps_results() {
        let store = memory_store().await;
        let recipes: Vec<NewRecipe> = (0..250).map(|i| recipe(&format!("pie {}", i), Some(4.0))).collect();
        store.replace_all(&recipes).await.unwrap();

        let hits = store.search(&RecipeQuery::default()).await.unwrap();
        assert_eq!(hits.len(), MAX_SEARCH_RESULTS);

        let hits = store
            .search(&query(SearchParams { title: Some("pie".into()), ..Default::default() }))
            .await
            .unwrap();
        assert_eq!(hits.len(), MAX_SEARCH_RESULTS);
    }
}
