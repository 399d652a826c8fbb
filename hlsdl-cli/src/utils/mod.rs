mod files;
mod headers;
pub mod progress;
mod size;
mod time;

// Export utility functions
pub use self::files::{DEFAULT_OUTPUT, normalize_output_path};
pub use self::headers::parse_headers;
pub use self::size::format_bytes;
pub use self::time::format_duration;
