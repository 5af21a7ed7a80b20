use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::remote::{FoodAnalysis, FoodImage, NutritionBackend, RemoteError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("The image is empty")]
    EmptyImage,

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// A photo with no recognizable food is a normal outcome, not an error
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    NothingDetected { description: String },
    Detected(FoodAnalysis),
}

/// Proxy to the external food photo analysis
pub struct FoodAnalysisService {
    backend: Arc<dyn NutritionBackend>,
}

impl fmt::Debug for FoodAnalysisService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoodAnalysisService").finish_non_exhaustive()
    }
}

impl FoodAnalysisService {
    pub fn new(backend: Arc<dyn NutritionBackend>) -> Self {
        Self { backend }
    }

    pub async fn analyze(&self, image: FoodImage) -> Result<AnalysisOutcome, AnalysisError> {
        if image.bytes.is_empty() {
            return Err(AnalysisError::EmptyImage);
        }

        let analysis = self.backend.analyze_food(&image).await.map_err(|e| {
            warn!("Food analysis of {} failed: {}", image.file_name, e);
            e
        })?;

        if !analysis.success || analysis.matched_foods.is_empty() {
            info!("No food detected in {}", image.file_name);
            return Ok(AnalysisOutcome::NothingDetected {
                description: analysis.meal_description,
            });
        }

        info!(
            "Detected {} foods in {} ({:.0} kcal)",
            analysis.matched_foods.len(),
            image.file_name,
            analysis.total_calories
        );
        Ok(AnalysisOutcome::Detected(analysis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{DetectedFood, MockNutritionBackend};

    fn image() -> FoodImage {
        FoodImage {
            bytes: vec![0xFF, 0xD8, 0xFF],
            file_name: "lunch.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
        }
    }

    fn analysis(foods: Vec<DetectedFood>) -> FoodAnalysis {
        FoodAnalysis {
            success: true,
            matched_foods: foods,
            meal_description: "Plate".to_string(),
            total_calories: 0.0,
            total_protein: 0.0,
            total_carbs: 0.0,
            total_fat: 0.0,
        }
    }

    #[tokio::test]
    async fn test_empty_image_is_rejected_locally() {
        let mut backend = MockNutritionBackend::new();
        backend.expect_analyze_food().times(0);
        let service = FoodAnalysisService::new(Arc::new(backend));

        let mut empty = image();
        empty.bytes.clear();
        assert_eq!(service.analyze(empty).await, Err(AnalysisError::EmptyImage));
    }

    #[tokio::test]
    async fn test_no_foods_is_not_an_error() {
        let mut backend = MockNutritionBackend::new();
        backend.expect_analyze_food().returning(|_| Ok(analysis(vec![])));
        let service = FoodAnalysisService::new(Arc::new(backend));

        assert_eq!(
            service.analyze(image()).await,
            Ok(AnalysisOutcome::NothingDetected {
                description: "Plate".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_detected_foods_are_returned() {
        let food = DetectedFood {
            detected_name: "banana".to_string(),
            matched_food_id: Some("banana".to_string()),
            matched_food_name: Some("Plátano".to_string()),
            estimated_grams: 118.0,
            preparation: "raw".to_string(),
            confidence: 0.95,
            match_confidence: Some(0.9),
            calories: 105.0,
            protein: 1.3,
            carbs: 27.0,
            fat: 0.4,
            emoji: "🍌".to_string(),
        };
        let mut backend = MockNutritionBackend::new();
        let returned = analysis(vec![food]);
        backend
            .expect_analyze_food()
            .returning(move |_| Ok(returned.clone()));
        let service = FoodAnalysisService::new(Arc::new(backend));

        match service.analyze(image()).await.unwrap() {
            AnalysisOutcome::Detected(result) => assert_eq!(result.matched_foods.len(), 1),
            other => panic!("expected detection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_stays_an_error() {
        let mut backend = MockNutritionBackend::new();
        backend.expect_analyze_food().returning(|_| Err(RemoteError::Timeout));
        let service = FoodAnalysisService::new(Arc::new(backend));

        assert_eq!(
            service.analyze(image()).await,
            Err(AnalysisError::Remote(RemoteError::Timeout))
        );
    }
}
