//! Writer Phase Metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

/// Metrics for the row-capped CSV writer
pub struct WriterMetrics;

impl WriterMetrics {
    /// Record one table written as `files` files holding `rows` data rows
    pub fn record_table_written(files: usize, rows: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "writer", "tables_written")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "writer", "files_written")).increment(files as u64);
        ::metrics::counter!(phase_metric!(counter, "writer", "rows_written")).increment(rows as u64);
        ::metrics::histogram!(phase_metric!(histogram, "writer", "duration_seconds"))
            .record(duration_secs);
    }
}

impl PhaseMetrics for WriterMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "writer", "tables_written"));
        let _ = counter!(phase_metric!(counter, "writer", "files_written"));
        let _ = counter!(phase_metric!(counter, "writer", "rows_written"));
        let _ = histogram!(phase_metric!(histogram, "writer", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "writer"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "writer", "tables_written"),
                metric_type: MetricType::Counter,
                help: "Tables written to the output root",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "writer", "files_written"),
                metric_type: MetricType::Counter,
                help: "CSV files written, counting each part file",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "writer", "rows_written"),
                metric_type: MetricType::Counter,
                help: "Data rows written, excluding header rows",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "writer", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent writing one table in seconds",
                labels: vec![],
            },
        ]
    }
}
