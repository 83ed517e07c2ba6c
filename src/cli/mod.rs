//! CLI support for the chatflow binary.
//!
//! ```ignore
//! use chatflow_client::cli::{parse_args, CliCommand};
//!
//! match parse_args(std::env::args()) {
//!     CliCommand::Chat(args) => { /* stream one answer */ }
//!     CliCommand::Version => println!("{}", chatflow_client::cli::version_line()),
//!     CliCommand::Help => println!("{}", chatflow_client::cli::USAGE),
//!     CliCommand::Invalid(reason) => eprintln!("{}", reason),
//! }
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, ChatArgs, CliCommand};
pub use version::{version_line, USAGE, VERSION};
