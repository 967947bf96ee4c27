pub mod exporter;
pub mod pipeline_metrics;

pub use exporter::render;
pub use pipeline_metrics::PipelineMetrics;
