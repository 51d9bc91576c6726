//! Phase-organized metrics for the export pipeline
//!
//! Each phase (source loading, classification, writing, the driver itself)
//! owns its metric names in a dedicated submodule. Metrics go through the
//! `metrics` facade. [`init_metrics`] installs an in-process Prometheus
//! recorder; a batch run renders it to a file once the products are written.

pub mod classifier;
pub mod pipeline;
pub mod registry;
pub mod writer;

pub use classifier::ClassifierMetrics;
pub use pipeline::PipelineMetrics;
pub use writer::WriterMetrics;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

use crate::constants::RUN_METRICS_FILE;
use crate::error::Result;

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and register every phase's metrics.
///
/// Idempotent. No HTTP listener is started; use [`render_metrics`] or
/// [`write_metrics_snapshot`] to read the values.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Metrics handle was already stored");
            }
            let registered = registry::register_all_metrics();
            info!("Prometheus recorder installed with {} metrics", registered.len());
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    });
}

/// Current metric values in Prometheus text format, if a recorder is installed.
pub fn render_metrics() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Write [`render_metrics`] output to `run_metrics.prom` under `output_dir`.
///
/// Returns `None` without touching the filesystem when no recorder is installed.
pub fn write_metrics_snapshot(output_dir: &Path) -> Result<Option<PathBuf>> {
    let Some(rendered) = render_metrics() else {
        return Ok(None);
    };
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(RUN_METRICS_FILE);
    fs::write(&path, rendered)?;
    info!("Saved metrics snapshot to {}", path.display());
    Ok(Some(path))
}

/// Trait for phase-specific metrics collections
pub trait PhaseMetrics {
    /// Register all metrics for this phase
    fn register_metrics();

    /// Get the phase name for prefixing metrics
    fn phase_name() -> &'static str;

    /// Get documentation for all metrics in this phase
    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Builds metric names following `pe_{phase}_{name}[_total]`.
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("pe_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("pe_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("pe_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;
