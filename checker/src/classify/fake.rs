use std::{
    collections::VecDeque,
    sync::Mutex,
};

use super::ClassifyImages;
use crate::verdict::Verdict;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub model_id: String,
    pub image_urls: Vec<String>,
    pub threshold: f32,
}

/// Test double: replays scripted verdict batches in order and records every
/// call. Once the script runs out it fails each input, which keeps the
/// one-verdict-per-input contract for arbitrary chunk sizes.
#[derive(Debug, Default)]
pub struct FakeClassifier {
    responses: Mutex<VecDeque<Vec<Verdict>>>,
    pub calls: Mutex<Vec<RecordedCall>>,
}

impl FakeClassifier {
    pub fn scripted(responses: Vec<Vec<Verdict>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_all() -> Self {
        Self::scripted(Vec::new())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ClassifyImages for FakeClassifier {
    async fn classify(
        &self,
        model_id: &str,
        image_urls: &[String],
        threshold: f32,
    ) -> Vec<Verdict> {
        self.calls.lock().unwrap().push(RecordedCall {
            model_id: model_id.to_string(),
            image_urls: image_urls.to_vec(),
            threshold,
        });

        match self.responses.lock().unwrap().pop_front() {
            Some(batch) => batch,
            None => image_urls.iter().map(|_| Verdict::Fail).collect(),
        }
    }
}
