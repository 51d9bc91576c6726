// Export pipeline: product contracts, per-product transforms, and the writer

pub mod driver;
pub mod manifest;
pub mod products;
pub mod sanitize;
pub mod security;
pub mod writer;

// Re-export the entry points used by the binary and integration tests
pub use driver::{build_commit_details, build_security_summary, Pipeline};
pub use manifest::{ProductReport, RunReport, SecurityCounts};
pub use sanitize::sanitize_patch;
pub use security::SecurityMatcher;
pub use writer::{write_chunked, write_chunked_detailed, ChunkResult};
