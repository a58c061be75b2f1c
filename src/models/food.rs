use serde::{Deserialize, Serialize};

/// A nutrient amount as delivered by the food catalog.
///
/// The catalog mixes plain numbers with locale-formatted strings ("1,5")
/// and trace markers ("tr"), so both shapes are accepted as-is and only
/// interpreted by [`crate::nutrition::parse_nutrient_value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NutrientValue {
    Number(f64),
    Text(String),
}

impl Default for NutrientValue {
    fn default() -> Self {
        NutrientValue::Text(String::new())
    }
}

impl From<f64> for NutrientValue {
    fn from(value: f64) -> Self {
        NutrientValue::Number(value)
    }
}

impl From<&str> for NutrientValue {
    fn from(value: &str) -> Self {
        NutrientValue::Text(value.to_string())
    }
}

impl From<String> for NutrientValue {
    fn from(value: String) -> Self {
        NutrientValue::Text(value)
    }
}

/// A food catalog record returned by a search, with values per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub food_code: String,

    pub name: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub kcal_per100: NutrientValue,

    #[serde(default)]
    pub protein_per100: NutrientValue,

    #[serde(default)]
    pub carb_per100: NutrientValue,

    #[serde(default)]
    pub fat_per100: NutrientValue,
}

impl SearchResult {
    /// Category label, with a placeholder when the catalog has none.
    pub fn category_label(&self) -> &str {
        self.category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or("Categoria non disponibile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_accepts_mixed_numeric_shapes() {
        let json = r#"{
            "foodCode": "A001",
            "name": "Pasta di semola",
            "kcalPer100": 353,
            "proteinPer100": "10,9",
            "carbPer100": "79.1",
            "fatPer100": "tr"
        }"#;

        let result: SearchResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.kcal_per100, NutrientValue::Number(353.0));
        assert_eq!(result.protein_per100, NutrientValue::Text("10,9".to_string()));
        assert_eq!(result.fat_per100, NutrientValue::Text("tr".to_string()));
        assert_eq!(result.category, None);
        assert_eq!(result.category_label(), "Categoria non disponibile");
    }

    #[test]
    fn test_missing_nutrient_defaults_to_empty_text() {
        let json = r#"{"foodCode": "B002", "name": "Acqua", "category": "Bevande"}"#;
        let result: SearchResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.carb_per100, NutrientValue::default());
        assert_eq!(result.category_label(), "Bevande");
    }
}
