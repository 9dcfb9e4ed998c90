use std::time::Duration;

use anyhow::{Context, Result};
use redis::{AsyncCommands, Client};
use tracing::info;
use uuid::Uuid;

use crate::modules::transcription::model::JobOutcome;

// Results are kept around for a day, then the backend reaps them. A waiter
// that timed out before its job finished simply never collects the entry.
const RESULT_TTL_SECS: i64 = 86_400;

fn result_key(job_id: Uuid) -> String {
    format!("transcription:result:{job_id}")
}

/// Redis connection plus the job result backend: workers push terminal
/// outcomes under the job id, waiters do a blocking pop on that key.
#[derive(Clone)]
pub struct RedisService {
    client: Client,
}

impl RedisService {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = Client::open(connection_string)?;

        // Test connection
        let _conn = client.get_multiplexed_async_connection().await?;

        info!("✅ Connected to Redis");
        Ok(Self { client })
    }

    /// Report a job's terminal outcome. Pushed onto a single-entry list so
    /// the waiting side can block on it.
    pub async fn store_outcome(&self, outcome: &JobOutcome) -> Result<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .context("result backend unavailable")?;

        let key = result_key(outcome.job_id);
        let payload = serde_json::to_string(outcome)?;

        let _: () = conn.rpush(&key, payload).await?;
        let _: () = conn.expire(&key, RESULT_TTL_SECS).await?;

        Ok(())
    }

    /// Block until the job's outcome lands or `ceiling` elapses. Runs on its
    /// own connection, since BLPOP parks the connection server-side and the
    /// shared one must not be used here. `None` means the ceiling elapsed.
    pub async fn wait_for_outcome(
        &self,
        job_id: Uuid,
        ceiling: Duration,
    ) -> Result<Option<JobOutcome>> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .context("result backend unavailable")?;

        let reply: Option<(String, String)> = conn
            .blpop(result_key(job_id), ceiling.as_secs_f64())
            .await?;

        match reply {
            Some((_key, raw)) => {
                let outcome = serde_json::from_str(&raw).context("malformed outcome payload")?;
                Ok(Some(outcome))
            }
            None => Ok(None),
        }
    }
}
