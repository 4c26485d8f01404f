pub mod exec;
pub mod output;

pub use exec::{exec, SeriesArgs};
pub use output::{output_csv, output_json, output_ndjson, output_table};
