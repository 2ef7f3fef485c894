//! Environment and concurrency helpers shared by the other layers.

pub mod paths;
pub mod sync;

pub use paths::{expand_tilde, get_data_dir, resolve_trace_file};
