use serde::{Deserialize, Serialize};

/// Nutrient keys accepted from the dataset, in display order / 营养成分字段
pub const NUTRIENT_KEYS: [&str; 10] = [
    "calories",
    "carbohydrateContent",
    "cholesterolContent",
    "fiberContent",
    "proteinContent",
    "saturatedFatContent",
    "sodiumContent",
    "sugarContent",
    "fatContent",
    "unsaturatedFatContent",
];

/// Free-form nutrient values such as "389 kcal" / 营养成分（原始文本）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrients {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbohydrate_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cholesterol_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated_fat_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsaturated_fat_content: Option<String>,
}

impl Nutrients {
    /// Set a nutrient by its dataset key, returns false for unknown keys
    pub fn set(&mut self, key: &str, value: String) -> bool {
        let slot = match key {
            "calories" => &mut self.calories,
            "carbohydrateContent" => &mut self.carbohydrate_content,
            "cholesterolContent" => &mut self.cholesterol_content,
            "fiberContent" => &mut self.fiber_content,
            "proteinContent" => &mut self.protein_content,
            "saturatedFatContent" => &mut self.saturated_fat_content,
            "sodiumContent" => &mut self.sodium_content,
            "sugarContent" => &mut self.sugar_content,
            "fatContent" => &mut self.fat_content,
            "unsaturatedFatContent" => &mut self.unsaturated_fat_content,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Numeric calorie value with the unit suffix removed / 提取卡路里数值
    pub fn calories_value(&self) -> Option<f64> {
        self.calories.as_deref().and_then(parse_leading_quantity)
    }
}

/// Parse "389 kcal" style text into 389.0
///
/// Trailing alphabetic characters are treated as the unit. Anything that is
/// not a finite number once the unit is gone yields `None`.
pub fn parse_leading_quantity(text: &str) -> Option<f64> {
    let number = text
        .trim()
        .trim_end_matches(|c: char| c.is_alphabetic())
        .trim();
    if number.is_empty() {
        return None;
    }
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Stored recipe as returned by the API / 菜谱
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub nutrients: Nutrients,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serves: Option<String>,
}

/// Normalized recipe waiting to be inserted (no id yet) / 待导入的菜谱
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRecipe {
    pub cuisine: Option<String>,
    pub title: Option<String>,
    pub rating: Option<f64>,
    pub prep_time: Option<f64>,
    pub cook_time: Option<f64>,
    pub total_time: Option<f64>,
    pub description: Option<String>,
    pub nutrients: Nutrients,
    pub serves: Option<String>,
}

/// GET /api/recipes response
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipePage {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub data: Vec<Recipe>,
}

/// GET /api/recipes/search response
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeList {
    pub data: Vec<Recipe>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leading_quantity() {
        assert_eq!(parse_leading_quantity("389 kcal"), Some(389.0));
        assert_eq!(parse_leading_quantity("389kcal"), Some(389.0));
        assert_eq!(parse_leading_quantity("  12.5 g "), Some(12.5));
        assert_eq!(parse_leading_quantity("400"), Some(400.0));
        assert_eq!(parse_leading_quantity("not a number"), None);
        assert_eq!(parse_leading_quantity("kcal"), None);
        assert_eq!(parse_leading_quantity(""), None);
        assert_eq!(parse_leading_quantity("NaN"), None);
        assert_eq!(parse_leading_quantity("inf kcal"), None);
    }

    #[test]
    fn test_nutrients_serialize_skips_absent() {
        let mut nutrients = Nutrients::default();
        assert!(nutrients.set("calories", "389 kcal".to_string()));
        assert!(nutrients.set("unsaturatedFatContent", "7 g".to_string()));
        assert!(!nutrients.set("vitaminC", "1 mg".to_string()));

        let json = serde_json::to_value(&nutrients).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"calories": "389 kcal", "unsaturatedFatContent": "7 g"})
        );
        assert_eq!(nutrients.calories_value(), Some(389.0));
    }

    #[test]
    fn test_every_known_key_is_settable() {
        let mut nutrients = Nutrients::default();
        for key in NUTRIENT_KEYS {
            assert!(nutrients.set(key, "1 g".to_string()), "{key}");
        }
        let json = serde_json::to_value(&nutrients).unwrap();
        assert_eq!(json.as_object().unwrap().len(), NUTRIENT_KEYS.len());
    }

    #[test]
    fn test_recipe_omits_missing_fields() {
        let recipe = Recipe {
            id: "abc".to_string(),
            cuisine: None,
            title: Some("Apple Pie".to_string()),
            rating: Some(4.5),
            prep_time: None,
            cook_time: None,
            total_time: None,
            description: None,
            nutrients: Nutrients::default(),
            serves: None,
        };
        let json = serde_json::to_value(&recipe).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "abc", "title": "Apple Pie", "rating": 4.5, "nutrients": {}})
        );
    }
}
