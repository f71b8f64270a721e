pub mod constants;
pub mod string_utils;
pub mod url_utils;

pub use constants::*;
pub use string_utils::{collapse_whitespace, redact, safe_truncate_chars};
pub use url_utils::{host_of, is_valid_url, normalize_url, same_resource};
