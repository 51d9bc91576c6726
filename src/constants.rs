/// Fixed names shared between the CLI, the config defaults and the pipeline.

// Default locations, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_CONFIG_FILE: &str = "pr_export.toml";

// Source tables
pub const PULL_REQUEST_FILE: &str = "all_pull_request.parquet";
pub const REPOSITORY_FILE: &str = "all_repository.parquet";
pub const TASK_TYPE_FILE: &str = "pr_task_type.parquet";
pub const COMMIT_DETAILS_FILE: &str = "pr_commit_details.parquet";

/// Row cap applied to every product file before it is split into parts.
pub const DEFAULT_MAX_ROWS_PER_FILE: usize = 25_000;

/// Name of the JSON manifest written to the output root after a run.
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

/// Prometheus text snapshot of the run's metrics, written next to the manifest.
pub const RUN_METRICS_FILE: &str = "run_metrics.prom";

/// Security-relevant vocabulary, matched as case-insensitive literal substrings.
pub const DEFAULT_SECURITY_KEYWORDS: &[&str] = &[
    "race",
    "racy",
    "buffer",
    "overflow",
    "stack",
    "integer",
    "signedness",
    "underflow",
    "improper",
    "unauthenticated",
    "gain access",
    "permission",
    "cross site",
    "css",
    "xss",
    "denial service",
    "dos",
    "crash",
    "deadlock",
    "injection",
    "request forgery",
    "csrf",
    "xsrf",
    "forged",
    "security",
    "vulnerability",
    "vulnerable",
    "exploit",
    "attack",
    "bypass",
    "backdoor",
    "threat",
    "expose",
    "breach",
    "violate",
    "fatal",
    "blacklist",
    "overrun",
    "insecure",
];

/// Owned copy of the default vocabulary, in declaration order.
pub fn default_security_keywords() -> Vec<String> {
    DEFAULT_SECURITY_KEYWORDS.iter().map(|k| k.to_string()).collect()
}
