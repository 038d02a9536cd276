//! Telemetry metric name constants.
//!
//! Centralised metric names for doorman operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `doorman_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`), gauges name the
//! quantity they track.
//!
//! # Common labels
//!
//! - `tier` — caller tier ("free" | "paid") on queue metrics, cache tier
//!   ("volatile" | "durable") on cache metrics
//! - `status` — job outcome: "ok" | "error" | "cancelled"

/// Total jobs reaching a terminal state.
///
/// Labels: `tier`, `status` ("ok" | "error" | "cancelled").
pub const JOBS_TOTAL: &str = "doorman_jobs_total";

/// Time a job spent queued before admission, in seconds.
///
/// Labels: `tier`.
pub const JOB_WAIT_SECONDS: &str = "doorman_job_wait_seconds";

/// Time a job spent processing after admission, in seconds.
///
/// Labels: `tier`.
pub const JOB_PROCESSING_SECONDS: &str = "doorman_job_processing_seconds";

/// Number of jobs currently pending admission.
pub const QUEUE_DEPTH: &str = "doorman_queue_depth";

/// Total cache hits.
///
/// Labels: `tier` ("volatile" | "durable").
pub const CACHE_HITS_TOTAL: &str = "doorman_cache_hits_total";

/// Total cache misses.
///
/// Labels: `tier` ("volatile" | "durable").
pub const CACHE_MISSES_TOTAL: &str = "doorman_cache_misses_total";

/// Total durable-store operations that failed and degraded to a miss.
pub const STORE_DEGRADED_TOTAL: &str = "doorman_store_degraded_total";
