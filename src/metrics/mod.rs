//! Snapshot producers: turn a directory into per-language line counts.

pub mod external;
pub mod scc;
pub mod tokei;

pub use external::{ExternalTool, ToolKind};

use crate::error::Result;
use crate::model::Snapshot;
use std::path::Path;

pub trait MetricsTool {
    /// Stable identifier, used as part of the cache key.
    fn name(&self) -> &str;

    fn measure(&self, dir: &Path) -> Result<Snapshot>;
}
