/// Trace invocation
///
/// The tracing algorithm itself lives behind the `Tracer` trait. This module
/// runs one trace per request on the blocking pool and hands back a
/// single-shot outcome tagged with the request's generation, so the session
/// can tell a current result from a stale one.

pub mod vectorizer;

use std::sync::Arc;
use std::time::Instant;
use tokio::task;

use crate::raster::RasterSource;
use crate::state::params::TracingParams;

pub use vectorizer::VtracerTracer;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TraceError {
    #[error("Invalid raster input: {0}")]
    Input(String),

    #[error("Unsupported tracing option: {0}")]
    Unsupported(String),

    #[error("Tracer failed: {0}")]
    Backend(String),

    #[error("Trace worker failed: {0}")]
    Worker(String),
}

/// A raster-to-vector conversion capability
pub trait Tracer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Convert a raster data URL into SVG markup
    fn trace(&self, data_url: &str, params: &TracingParams) -> Result<String, TraceError>;
}

/// One request to trace the current raster
#[derive(Debug, Clone)]
pub struct TraceRequest {
    pub generation: u64,
    pub source: Arc<RasterSource>,
    pub params: TracingParams,
}

/// The single completion of a `TraceRequest`
#[derive(Debug, Clone)]
pub struct TraceOutcome {
    pub generation: u64,
    pub result: Result<String, TraceError>,
}

/// Run `request` through `tracer` off the UI thread
pub async fn invoke(tracer: Arc<dyn Tracer>, request: TraceRequest) -> TraceOutcome {
    let generation = request.generation;

    log::info!(
        "✏️  Tracing {} with {} (generation {}, blur {:.1})",
        request.source.file_name,
        tracer.name(),
        generation,
        request.params.blur_radius
    );
    if let Ok(json) = request.params.to_json() {
        log::debug!("trace params: {}", json);
    }

    let started = Instant::now();
    let result = task::spawn_blocking(move || {
        tracer.trace(&request.source.data_url, &request.params)
    })
    .await
    .map_err(|e| TraceError::Worker(e.to_string()))
    .and_then(|result| result);

    match &result {
        Ok(svg) => log::info!(
            "✅ Trace {} finished in {:?} ({} KB of SVG)",
            generation,
            started.elapsed(),
            svg.len() / 1024
        ),
        Err(e) => log::error!("❌ Trace {} failed: {}", generation, e),
    }

    TraceOutcome { generation, result }
}
