//! Command-line argument parsing for the chatflow binary.

/// Options for one streamed chat turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatArgs {
    pub query: String,
    pub conversation: Option<String>,
    pub user: Option<String>,
    pub verbose: bool,
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Send one message and stream the answer
    Chat(ChatArgs),
    /// Arguments could not be parsed
    Invalid(String),
}

/// Parse command-line arguments and return the command to run.
///
/// # Examples
///
/// ```
/// use chatflow_client::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["chatflow".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut chat = ChatArgs::default();
    let mut words: Vec<String> = Vec::new();
    // Skip the program name
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Help,
            "--verbose" | "-v" => chat.verbose = true,
            "--conversation" | "-c" => match args.next() {
                Some(id) => chat.conversation = Some(id),
                None => return CliCommand::Invalid("--conversation needs an id".to_string()),
            },
            "--user" | "-u" => match args.next() {
                Some(user) => chat.user = Some(user),
                None => return CliCommand::Invalid("--user needs a name".to_string()),
            },
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return CliCommand::Invalid(format!("unknown option {}", flag))
            }
            _ => words.push(arg),
        }
    }

    if words.is_empty() {
        return CliCommand::Invalid("missing query".to_string());
    }
    chat.query = words.join(" ");
    CliCommand::Chat(chat)
}
