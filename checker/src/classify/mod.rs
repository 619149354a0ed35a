mod clarifai;
#[cfg(test)]
pub mod fake;

pub use clarifai::ClarifaiClient;

use crate::verdict::Verdict;

/// One remote classification round-trip per call. Implementations return
/// exactly one verdict per input url, in input order, and express every
/// failure as verdicts — `classify` itself never fails, so the dispatch loop
/// needs no recovery path.
#[allow(async_fn_in_trait)]
pub trait ClassifyImages {
    async fn classify(&self, model_id: &str, image_urls: &[String], threshold: f32)
        -> Vec<Verdict>;
}
