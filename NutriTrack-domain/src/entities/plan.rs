use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::meal::MealType;
use super::recipe::{ProteinBase, RecipeIngredient};

/// A catalog recipe with every gram and macro figure multiplied by the
/// plan's scale factor and rounded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PlannedRecipe {
    pub recipe_id: String,
    pub name: String,
    pub emoji: String,
    pub meal_type: MealType,
    pub protein_base: ProteinBase,
    pub ingredients: Vec<RecipeIngredient>,
    pub total_calories: u32,
    pub total_protein: u32,
    pub total_carbs: u32,
    pub total_fat: u32,
    pub preparation_tip: String,
    pub video_url: String,
    pub scale_factor: f64,
}

/// One recipe per slot plus plan-level totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub protein: ProteinBase,
    pub breakfast: PlannedRecipe,
    pub lunch: PlannedRecipe,
    pub dinner: PlannedRecipe,
    pub snack: PlannedRecipe,
    pub total_calories: u32,
    pub total_protein: u32,
    pub total_carbs: u32,
    pub total_fat: u32,
    pub scale_factor: f64,
    pub remaining_calories: f64,
}

impl MealPlan {
    pub fn slot(&self, meal_type: MealType) -> &PlannedRecipe {
        match meal_type {
            MealType::Breakfast => &self.breakfast,
            MealType::Lunch => &self.lunch,
            MealType::Dinner => &self.dinner,
            MealType::Snack => &self.snack,
        }
    }

    /// Recipes in slot order
    pub fn recipes(&self) -> [&PlannedRecipe; 4] {
        [&self.breakfast, &self.lunch, &self.dinner, &self.snack]
    }

    pub fn recipe_ids(&self) -> Vec<String> {
        self.recipes().iter().map(|r| r.recipe_id.clone()).collect()
    }
}

/// Recipe ids handed out per local date
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuggestionHistory(BTreeMap<NaiveDate, Vec<String>>);

impl SuggestionHistory {
    /// Every id recorded on or after `since`
    pub fn ids_since(&self, since: NaiveDate) -> HashSet<String> {
        self.0
            .range(since..)
            .flat_map(|(_, ids)| ids.iter().cloned())
            .collect()
    }

    pub fn ids_on(&self, date: NaiveDate) -> &[String] {
        self.0.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn record(&mut self, date: NaiveDate, ids: impl IntoIterator<Item = String>) {
        self.0.entry(date).or_default().extend(ids);
    }

    /// Drop every date strictly before `cutoff`
    pub fn prune_before(&mut self, cutoff: NaiveDate) {
        self.0 = self.0.split_off(&cutoff);
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.0.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_history_window_and_prune() {
        let mut history = SuggestionHistory::default();
        history.record(date(1), vec!["a".to_string()]);
        history.record(date(3), vec!["b".to_string()]);
        history.record(date(3), vec!["c".to_string()]);

        let recent = history.ids_since(date(2));
        assert_eq!(recent.len(), 2);
        assert!(recent.contains("b") && recent.contains("c"));

        history.prune_before(date(3));
        assert_eq!(history.dates().count(), 1);
        assert_eq!(history.ids_on(date(3)), ["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_history_layout_is_date_map() {
        let mut history = SuggestionHistory::default();
        history.record(date(9), vec!["x".to_string()]);
        assert_eq!(
            serde_json::to_string(&history).unwrap(),
            r#"{"2024-05-09":["x"]}"#
        );
    }
}
