//! Clients for the two external collaborators: the natural-language
//! analysis service and the report generator.
//!
//! Both are single-shot HTTP clients: one in-flight request, no automatic
//! retry, no cancellation. Their responses are opaque to this crate — the
//! analysis result is relayed and cached verbatim, the report artifact is
//! offered for download as received. A failed request leaves session state
//! untouched, so re-invoking the action is the retry.

pub mod analysis;
pub mod report;

pub use analysis::AnalysisClient;
pub use report::{ReportArtifact, ReportClient};

/// Cap error bodies relayed into logs and error messages.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    }
}
