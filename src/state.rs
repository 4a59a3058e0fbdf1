use crate::db::RecipeStore;

/// Shared handler state / 共享状态
///
/// Handlers only read through the store; there is no other mutable state.
pub struct AppState {
    pub store: RecipeStore,
}

impl AppState {
    pub fn new(store: RecipeStore) -> Self {
        Self { store }
    }
}
