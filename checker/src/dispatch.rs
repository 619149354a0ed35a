use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use lib_table::TableStore;

use crate::{
    classify::ClassifyImages, error::AppResult, grouper::Group, rate_limiter::RequestPacer,
    verdict::Verdict, writer::ResultWriter,
};

/// Remote API cap on inputs per request.
pub const MAX_BATCH: usize = 128;

/// Counters for one dispatch run.
#[derive(Debug)]
pub struct RunStats {
    pub started_at: DateTime<Utc>,
    pub rows_classified: usize,
    pub chunks_sent: usize,
    pub chunks_failed: usize,
}

/// Sends each group's members to its remote model in consecutive chunks of
/// at most [`MAX_BATCH`], strictly sequentially, pacing every call through
/// the limiter. Verdicts map back onto member rows by position.
pub struct BatchDispatcher<'a, C: ClassifyImages> {
    client: &'a C,
    pacer: RequestPacer,
}

impl<'a, C: ClassifyImages> BatchDispatcher<'a, C> {
    pub fn new(client: &'a C, pacer: RequestPacer) -> Self {
        Self { client, pacer }
    }

    /// A failed chunk only degrades its own rows to error verdicts; later
    /// chunks and groups still run. Only a store write failure aborts.
    pub async fn run<S: TableStore>(
        &self,
        groups: &IndexMap<String, Group>,
        writer: &mut ResultWriter<'_, S>,
    ) -> AppResult<RunStats> {
        let mut stats = RunStats {
            started_at: Utc::now(),
            rows_classified: 0,
            chunks_sent: 0,
            chunks_failed: 0,
        };

        for group in groups.values() {
            tracing::info!(
                "Dispatching {} rows to model {} in chunks of {}",
                group.members.len(),
                group.model_id,
                MAX_BATCH
            );

            for chunk in group.members.chunks(MAX_BATCH) {
                let urls: Vec<String> = chunk.iter().map(|m| m.image_url.clone()).collect();

                self.pacer.acquire_one().await;
                let verdicts = self
                    .client
                    .classify(&group.model_id, &urls, group.threshold)
                    .await;
                debug_assert_eq!(verdicts.len(), chunk.len());

                stats.chunks_sent += 1;
                if verdicts
                    .iter()
                    .any(|v| matches!(v, Verdict::ApiError(_)))
                {
                    stats.chunks_failed += 1;
                }

                for (member, verdict) in chunk.iter().zip(verdicts.iter()) {
                    writer.write(member.row_index, verdict)?;
                    stats.rows_classified += 1;
                }
            }
        }

        let elapsed = Utc::now() - stats.started_at;
        tracing::info!(
            "Dispatch finished: {} rows across {} chunks ({} degraded) in {}s",
            stats.rows_classified,
            stats.chunks_sent,
            stats.chunks_failed,
            elapsed.num_seconds()
        );

        Ok(stats)
    }
}
