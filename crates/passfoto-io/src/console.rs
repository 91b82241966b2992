//! Operation diagnostics reporting to the browser console.
//!
//! Serializes [`OpDiagnostics`] records as JSON and writes them via
//! `console.info`, so slow service calls and oversized payloads are
//! visible in the field without any backend. Silently no-ops if
//! serialization fails — diagnostics must never break the pipeline.

use passfoto_pipeline::diagnostics::OpDiagnostics;

/// Report one completed operation to the browser console.
pub fn report(diagnostics: &OpDiagnostics) {
    let Ok(json) = serde_json::to_string(diagnostics) else {
        return;
    };
    web_sys::console::info_1(&format!("passfoto {} {json}", diagnostics.operation.name()).into());
}

/// Report a failed operation to the browser console.
pub fn report_failure(operation: &str, error: &str) {
    web_sys::console::warn_1(&format!("passfoto {operation} failed: {error}").into());
}
