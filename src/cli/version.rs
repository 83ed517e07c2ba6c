//! Version and usage text for the chatflow binary.

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const USAGE: &str = "\
usage: chatflow <query> [--conversation <id>] [--user <name>] [--verbose]

Streams one answer to stdout. Workflow progress goes to stderr.

environment:
  CHATFLOW_API_URL       backend prefix (default http://localhost:5001/v1)
  CHATFLOW_API_KEY       bearer token
  CHATFLOW_TIMEOUT_SECS  request and inactivity timeout (default 180)
  CHATFLOW_USER          end-user id";

pub fn version_line() -> String {
    format!("chatflow {}", VERSION)
}
