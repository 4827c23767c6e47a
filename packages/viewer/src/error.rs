/// Errors that can occur while loading geometry for one model entry.
///
/// A load error is isolated to its entry: it is logged once and the entry is
/// excluded from the rendered scene, with no effect on sibling entries.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The fetch itself failed (connection refused, DNS, I/O).
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The server answered with a non-success status.
    #[error("fetch of {url} returned status {status}")]
    Status { url: String, status: u16 },
    /// The bounded fetch deadline elapsed.
    #[error("fetch of {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },
    /// The payload is not a mesh this viewer understands.
    #[error("failed to parse geometry: {0}")]
    Parse(String),
    /// The mesh parsed but contains no triangles.
    #[error("geometry contains no triangles")]
    Empty,
}
