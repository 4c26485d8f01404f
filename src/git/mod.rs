pub mod repo;

pub use repo::{is_remote, repository_label, GitRepo};
