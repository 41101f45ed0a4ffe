use crate::models::{CognitiveProfile, LearnerRecord, TutorCandidate};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the platform directory
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Platform directory client
///
/// The directory owns learner and tutor records; the engine reads from it
/// per request and never writes back. Operations:
/// - Fetching a learner and their requested subjects
/// - Fetching a learner's cognitive assessment (absence is not an error)
/// - Querying the qualified tutor pool
pub struct DirectoryClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl DirectoryClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }

    /// Fetch a learner record by id
    pub async fn get_learner(&self, learner_id: &str) -> Result<LearnerRecord, DirectoryError> {
        let url = format!(
            "{}/learners/{}",
            self.base_url.trim_end_matches('/'),
            learner_id
        );

        tracing::debug!("Fetching learner from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Service-Key", &self.api_key)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DirectoryError::NotFound(format!(
                "Learner {learner_id} not found"
            )));
        }

        if !response.status().is_success() {
            return Err(DirectoryError::ApiError(format!(
                "Failed to fetch learner: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        serde_json::from_value(json).map_err(|e| {
            DirectoryError::InvalidResponse(format!("Failed to parse learner: {e}"))
        })
    }

    /// Fetch a learner's finalized cognitive assessment
    ///
    /// Returns `None` when the learner has not completed an assessment; the
    /// caller decides whether that is an error.
    pub async fn get_assessment(
        &self,
        learner_id: &str,
    ) -> Result<Option<CognitiveProfile>, DirectoryError> {
        let url = format!(
            "{}/learners/{}/assessment",
            self.base_url.trim_end_matches('/'),
            learner_id
        );

        tracing::debug!("Fetching assessment from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Service-Key", &self.api_key)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(DirectoryError::ApiError(format!(
                "Failed to fetch assessment: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let profile = serde_json::from_value(json).map_err(|e| {
            DirectoryError::InvalidResponse(format!("Failed to parse assessment: {e}"))
        })?;

        Ok(Some(profile))
    }

    /// Query the qualified tutor pool
    ///
    /// The directory pre-filters to tutors with complete pedagogy profiles;
    /// records that fail to parse are skipped rather than failing the whole
    /// pool.
    pub async fn get_qualified_tutors(&self) -> Result<Vec<TutorCandidate>, DirectoryError> {
        let url = format!("{}/tutors/qualified", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .header("X-Service-Key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DirectoryError::ApiError(format!(
                "Failed to query tutors: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);

        let records = json
            .get("tutors")
            .and_then(|t| t.as_array())
            .ok_or_else(|| DirectoryError::InvalidResponse("Missing tutors array".into()))?;

        let tutors: Vec<TutorCandidate> = records
            .iter()
            .filter_map(|record| serde_json::from_value(record.clone()).ok())
            .collect();

        tracing::debug!("Queried {} qualified tutors (total: {})", tutors.len(), total);

        Ok(tutors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_client_creation() {
        let client = DirectoryClient::new(
            "https://directory.test/api".to_string(),
            "test_key".to_string(),
        );

        assert_eq!(client.base_url, "https://directory.test/api");
        assert_eq!(client.api_key, "test_key");
    }

    #[tokio::test]
    async fn test_get_assessment_absent_maps_to_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/learners/l1/assessment")
            .with_status(404)
            .create_async()
            .await;

        let client = DirectoryClient::new(server.url(), "k".to_string());
        let assessment = client.get_assessment("l1").await.unwrap();
        assert!(assessment.is_none());
    }

    #[tokio::test]
    async fn test_get_assessment_parses_profile() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "confidence": 20.0,
            "anxiety": 80.0,
            "processingSpeed": 35.0,
            "workingMemory": 45.0,
            "precision": 55.0,
            "errorCorrection": 60.0,
            "exploration": 75.0,
            "impulsivity": 30.0,
            "logicalReasoning": 65.0,
            "hypotheticalReasoning": 70.0
        });
        server
            .mock("GET", "/learners/l1/assessment")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = DirectoryClient::new(server.url(), "k".to_string());
        let assessment = client.get_assessment("l1").await.unwrap().unwrap();
        assert_eq!(assessment.confidence, 20.0);
        assert_eq!(assessment.hypothetical_reasoning, 70.0);
    }

    #[tokio::test]
    async fn test_get_qualified_tutors_skips_malformed_records() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "total": 2,
            "tutors": [
                {
                    "id": "t1",
                    "name": "Asha",
                    "lessonPrice": 650.0,
                    "subjects": ["Mathematics"],
                    "pedagogy": {
                        "tcs": "HIGH", "tspi": "HIGH", "twmls": "HIGH", "tpo": "HIGH",
                        "tecp": "HIGH", "tet": "LOW", "tics": "HIGH", "trd": "LOW"
                    }
                },
                { "id": "broken" }
            ]
        });
        server
            .mock("GET", "/tutors/qualified")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = DirectoryClient::new(server.url(), "k".to_string());
        let tutors = client.get_qualified_tutors().await.unwrap();
        assert_eq!(tutors.len(), 1);
        assert_eq!(tutors[0].id, "t1");
    }

    #[tokio::test]
    async fn test_learner_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/learners/missing")
            .with_status(404)
            .create_async()
            .await;

        let client = DirectoryClient::new(server.url(), "k".to_string());
        let err = client.get_learner("missing").await.unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound(_)));
    }
}
