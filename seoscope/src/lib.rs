// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub use handlers::{
    extract_url_path, normalize_target_url, resolve_output_path, verbosity_filter, write_report,
};
