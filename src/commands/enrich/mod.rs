mod index;
mod merge;
mod run;

pub use run::{enrich_files, run, write_report};
