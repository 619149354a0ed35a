use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use super::ClassifyImages;
use crate::{checker_config::Api, verdict::Verdict, HttpClient};

/// Errors internal to one chunk call. They never escape `classify`: the
/// public surface collapses them into a uniform `ApiError` verdict for every
/// row of the chunk.
#[derive(Debug, Error)]
enum ClassifyError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model returned {got} outputs for {expected} inputs")]
    OutputMismatch { expected: usize, got: usize },
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    #[serde(default)]
    outputs: Vec<ModelOutput>,
}

#[derive(Debug, Default, Deserialize)]
struct ModelOutput {
    #[serde(default)]
    data: OutputData,
}

#[derive(Debug, Default, Deserialize)]
struct OutputData {
    #[serde(default)]
    concepts: Vec<Concept>,
}

#[derive(Debug, Clone, Deserialize)]
struct Concept {
    name: String,
    value: f32,
}

/// Client for a Clarifai-style model outputs endpoint. One request per
/// chunk, all image urls as inputs, responses aligned to request order.
pub struct ClarifaiClient {
    http_client: HttpClient,
    api: Api,
}

impl ClarifaiClient {
    pub fn new(http_client: HttpClient, api: Api) -> Self {
        Self { http_client, api }
    }

    async fn request_outputs(
        &self,
        model_id: &str,
        image_urls: &[String],
    ) -> Result<Vec<ModelOutput>, ClassifyError> {
        let url = self.api.model_outputs_url(model_id);
        let inputs: Vec<_> = image_urls
            .iter()
            .map(|url| json!({ "data": { "image": { "url": url } } }))
            .collect();

        let resp = self
            .http_client
            .post(url)
            .header("Authorization", format!("Key {}", self.api.key))
            .json(&json!({ "inputs": inputs }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(ClassifyError::Api { status, message });
        }

        let body = resp.text().await?;
        let parsed: ClassifyResponse = serde_json::from_str(&body)?;

        if parsed.outputs.len() != image_urls.len() {
            return Err(ClassifyError::OutputMismatch {
                expected: image_urls.len(),
                got: parsed.outputs.len(),
            });
        }

        Ok(parsed.outputs)
    }
}

impl ClassifyImages for ClarifaiClient {
    async fn classify(
        &self,
        model_id: &str,
        image_urls: &[String],
        threshold: f32,
    ) -> Vec<Verdict> {
        match self.request_outputs(model_id, image_urls).await {
            Ok(outputs) => outputs
                .into_iter()
                .map(|output| verdict_for_output(output, threshold))
                .collect(),
            Err(e) => {
                tracing::error!(
                    "Classification call to model {} failed for {} inputs: {}",
                    model_id,
                    image_urls.len(),
                    e
                );
                let message = e.to_string();
                image_urls
                    .iter()
                    .map(|_| Verdict::ApiError(message.clone()))
                    .collect()
            }
        }
    }
}

/// First concept meeting the threshold wins; no qualifying concept fails the
/// row. A missing concepts list behaves as an empty one.
fn verdict_for_output(output: ModelOutput, threshold: f32) -> Verdict {
    match output
        .data
        .concepts
        .into_iter()
        .find(|c| c.value >= threshold)
    {
        Some(concept) => Verdict::Pass {
            concept: concept.name,
            confidence_pct: concept.value * 100.0,
        },
        None => Verdict::Fail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(concepts: Vec<(&str, f32)>) -> ModelOutput {
        ModelOutput {
            data: OutputData {
                concepts: concepts
                    .into_iter()
                    .map(|(name, value)| Concept {
                        name: name.to_string(),
                        value,
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn test_first_qualifying_concept_wins() {
        let verdict = verdict_for_output(
            output(vec![("blurry", 0.40), ("grill", 0.95), ("clean", 0.99)]),
            0.93,
        );
        assert_eq!(
            verdict,
            Verdict::Pass {
                concept: "grill".to_string(),
                confidence_pct: 95.0,
            }
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let verdict = verdict_for_output(output(vec![("grill", 0.93)]), 0.93);
        assert!(matches!(verdict, Verdict::Pass { .. }));
    }

    #[test]
    fn test_below_threshold_fails() {
        let verdict = verdict_for_output(output(vec![("grill", 0.80)]), 0.93);
        assert_eq!(verdict, Verdict::Fail);
    }

    #[test]
    fn test_missing_concepts_fail() {
        let verdict = verdict_for_output(ModelOutput::default(), 0.5);
        assert_eq!(verdict, Verdict::Fail);
    }

    #[test]
    fn test_response_parsing_tolerates_missing_concepts() {
        let body = r#"{
            "outputs": [
                { "data": { "concepts": [ { "name": "grill", "value": 0.95 } ] } },
                { "data": {} },
                {}
            ]
        }"#;

        let parsed: ClassifyResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.outputs.len(), 3);
        assert_eq!(parsed.outputs[0].data.concepts[0].name, "grill");
        assert!(parsed.outputs[1].data.concepts.is_empty());
        assert!(parsed.outputs[2].data.concepts.is_empty());
    }
}
