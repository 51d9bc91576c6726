//! Security Classifier Metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct ClassifierMetrics;

impl ClassifierMetrics {
    /// Record one classification pass over `flagged + clean` records
    pub fn record_classified(flagged: usize, clean: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "classifier", "records_flagged"))
            .increment(flagged as u64);
        ::metrics::counter!(phase_metric!(counter, "classifier", "records_clean"))
            .increment(clean as u64);
        ::metrics::histogram!(phase_metric!(histogram, "classifier", "duration_seconds"))
            .record(duration_secs);
    }
}

impl PhaseMetrics for ClassifierMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "classifier", "records_flagged"));
        let _ = counter!(phase_metric!(counter, "classifier", "records_clean"));
        let _ = histogram!(phase_metric!(histogram, "classifier", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "classifier"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "classifier", "records_flagged"),
                metric_type: MetricType::Counter,
                help: "Records whose title or body matched a security keyword",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "classifier", "records_clean"),
                metric_type: MetricType::Counter,
                help: "Records with no security keyword match",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "classifier", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent classifying one table in seconds",
                labels: vec![],
            },
        ]
    }
}
