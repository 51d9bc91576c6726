//! Metrics registry for coordinating phase-specific metrics
//!
//! Registers every phase's metrics and detects name conflicts early.

use crate::metrics::{MetricDoc, MetricType, PhaseMetrics};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Register all metrics from all phases, returning the documented set keyed by name.
pub fn register_all_metrics() -> HashMap<String, MetricDoc> {
    let mut all_metrics = HashMap::new();

    register_phase_metrics::<super::PipelineMetrics>(&mut all_metrics);
    register_phase_metrics::<super::ClassifierMetrics>(&mut all_metrics);
    register_phase_metrics::<super::WriterMetrics>(&mut all_metrics);

    info!(
        "Registered {} total metrics across all phases",
        all_metrics.len()
    );
    all_metrics
}

fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<String, MetricDoc>) {
    T::register_metrics();
    let phase_docs = T::metrics_documentation();
    let phase_name = T::phase_name();

    debug!(
        "Registering {} metrics for phase '{}'",
        phase_docs.len(),
        phase_name
    );

    for doc in phase_docs {
        if all_metrics.contains_key(doc.name) {
            warn!(
                "Metric name conflict detected: '{}' redefined by phase '{}'",
                doc.name, phase_name
            );
        } else {
            describe(&doc);
            all_metrics.insert(doc.name.to_string(), doc);
        }
    }
}

/// Attach the help text to the installed recorder.
fn describe(doc: &MetricDoc) {
    match doc.metric_type {
        MetricType::Counter => ::metrics::describe_counter!(doc.name, doc.help),
        MetricType::Histogram => ::metrics::describe_histogram!(doc.name, doc.help),
        MetricType::Gauge => ::metrics::describe_gauge!(doc.name, doc.help),
    }
}

/// Extract phase name from metric name (e.g., "pe_writer_rows_written_total" -> "writer")
pub fn extract_phase_from_metric_name(metric_name: &str) -> &str {
    if let Some(stripped) = metric_name.strip_prefix("pe_") {
        if let Some(next_underscore) = stripped.find('_') {
            return &stripped[..next_underscore];
        }
    }
    "unknown"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_phase_from_metric_name() {
        assert_eq!(
            extract_phase_from_metric_name("pe_writer_rows_written_total"),
            "writer"
        );
        assert_eq!(
            extract_phase_from_metric_name("pe_classifier_duration_seconds"),
            "classifier"
        );
        assert_eq!(
            extract_phase_from_metric_name("invalid_metric_name"),
            "unknown"
        );
    }

    #[test]
    fn test_registry_has_no_conflicts_and_consistent_prefixes() {
        let all = register_all_metrics();
        assert_eq!(all.len(), 14);
        for name in all.keys() {
            assert_ne!(extract_phase_from_metric_name(name), "unknown", "{name}");
        }
    }
}
