//! Pipeline Driver Metrics
//!
//! Source loads and per-product completion, labelled by table/product name.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct PipelineMetrics;

impl PipelineMetrics {
    pub fn record_source_loaded(table: &str, rows: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "source_rows"), "table" => table.to_string())
            .increment(rows as u64);
        ::metrics::histogram!(phase_metric!(histogram, "pipeline", "load_duration_seconds"), "table" => table.to_string())
            .record(duration_secs);
    }

    pub fn record_product_completed(product: &str, rows: usize, files: usize) {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "products_completed"), "product" => product.to_string())
            .increment(1);
        ::metrics::gauge!(phase_metric!(gauge, "pipeline", "product_rows"), "product" => product.to_string())
            .set(rows as f64);
        ::metrics::gauge!(phase_metric!(gauge, "pipeline", "product_files"), "product" => product.to_string())
            .set(files as f64);
    }

    pub fn record_run_finished(duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "runs")).increment(1);
        ::metrics::histogram!(phase_metric!(histogram, "pipeline", "run_duration_seconds"))
            .record(duration_secs);
    }
}

impl PhaseMetrics for PipelineMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge, histogram};

        let _ = counter!(phase_metric!(counter, "pipeline", "source_rows"));
        let _ = counter!(phase_metric!(counter, "pipeline", "products_completed"));
        let _ = counter!(phase_metric!(counter, "pipeline", "runs"));
        let _ = gauge!(phase_metric!(gauge, "pipeline", "product_rows"));
        let _ = gauge!(phase_metric!(gauge, "pipeline", "product_files"));
        let _ = histogram!(phase_metric!(histogram, "pipeline", "load_duration_seconds"));
        let _ = histogram!(phase_metric!(histogram, "pipeline", "run_duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "pipeline"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "pipeline", "source_rows"),
                metric_type: MetricType::Counter,
                help: "Rows loaded from each source table",
                labels: vec!["table"],
            },
            MetricDoc {
                name: phase_metric!(counter, "pipeline", "products_completed"),
                metric_type: MetricType::Counter,
                help: "Products fully written",
                labels: vec!["product"],
            },
            MetricDoc {
                name: phase_metric!(counter, "pipeline", "runs"),
                metric_type: MetricType::Counter,
                help: "Completed pipeline runs",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "pipeline", "product_rows"),
                metric_type: MetricType::Gauge,
                help: "Rows in the most recent output of each product",
                labels: vec!["product"],
            },
            MetricDoc {
                name: phase_metric!(gauge, "pipeline", "product_files"),
                metric_type: MetricType::Gauge,
                help: "Files in the most recent output of each product",
                labels: vec!["product"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "pipeline", "load_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent loading each source table in seconds",
                labels: vec!["table"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "pipeline", "run_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "End-to-end pipeline duration in seconds",
                labels: vec![],
            },
        ]
    }
}
