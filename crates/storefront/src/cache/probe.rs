//! Cache liveness probe.

use std::time::Duration;

use storefront_core::cache::{Cache, LIVENESS_PROBE_KEY};

/// TTL of the probe token; short so repeated probes never read a stale one.
const PROBE_TTL: Duration = Duration::from_secs(2);

/// Reports whether cache round-trips are currently succeeding.
///
/// Writes a uniquely timestamped token under the reserved probe key, reads it
/// back, and compares. Every failure mode - write error, read error, missing
/// or mismatched value - yields `false`; nothing is propagated, so the
/// diagnostic surface stays up while the cache is down.
pub async fn probe_liveness(cache: &dyn Cache) -> bool {
    let token = format!(
        "{}:{}",
        chrono::Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4()
    );

    if let Err(err) = cache
        .set(LIVENESS_PROBE_KEY, token.as_bytes(), Some(PROBE_TTL))
        .await
    {
        tracing::debug!(error = %err, "Liveness probe write failed");
        return false;
    }

    match cache.get(LIVENESS_PROBE_KEY).await {
        Ok(Some(bytes)) => bytes == token.as_bytes(),
        Ok(None) => false,
        Err(err) => {
            tracing::debug!(error = %err, "Liveness probe read failed");
            false
        }
    }
}
