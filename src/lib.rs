pub mod cache;
pub mod cli;
pub mod collect;
pub mod error;
pub mod git;
pub mod metrics;
pub mod model;
pub mod series;
pub mod snapshot;
pub mod sources;
pub mod timeline;
pub mod util;
