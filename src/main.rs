use std::io::Write;

use chatflow_client::cli::{parse_args, version_line, ChatArgs, CliCommand, USAGE};
use chatflow_client::logging;
use chatflow_client::{ChatRequest, ChatflowClient, ClientConfig, SessionOutcome, StreamHandlers};
use color_eyre::eyre::eyre;
use color_eyre::Result;

fn main() -> Result<()> {
    let args = match parse_args(std::env::args()) {
        CliCommand::Version => {
            println!("{}", version_line());
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        CliCommand::Invalid(reason) => {
            eprintln!("chatflow: {}\n\n{}", reason, USAGE);
            std::process::exit(2);
        }
        CliCommand::Chat(args) => args,
    };

    color_eyre::install()?;
    logging::init_logging(logging::level_for(args.verbose));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_chat(args))
}

/// Stream one answer to stdout. Ctrl-C cancels the session.
async fn run_chat(args: ChatArgs) -> Result<()> {
    let mut config = ClientConfig::from_env()?;
    if let Some(user) = args.user {
        config = config.with_user(user);
    }
    let client = ChatflowClient::new(config)?;

    let mut request = ChatRequest::new(args.query);
    if let Some(conversation) = args.conversation {
        request = request.with_conversation(conversation);
    }

    let handlers = StreamHandlers::new()
        .on_data(|text, _first, info| {
            // The timeout delivery carries no text, only the error.
            if info.error_message.is_none() {
                let mut stdout = std::io::stdout();
                let _ = write!(stdout, "{}", text);
                let _ = stdout.flush();
            }
        })
        .on_workflow_started(|started| {
            eprintln!(
                "[workflow] started {}",
                started.workflow_run_id.unwrap_or_default()
            );
        })
        .on_node_started(|node| {
            eprintln!(
                "[node] {} ({})",
                display_title(&node.data.title, &node.data.node_id),
                node.data.node_type
            );
        })
        .on_node_finished(|node| {
            eprintln!(
                "[node] {} {}",
                display_title(&node.data.title, &node.data.node_id),
                node.data.status.as_deref().unwrap_or("finished")
            );
        })
        .on_workflow_finished(|finished| {
            eprintln!(
                "[workflow] {} in {:.2}s",
                finished.data.status.as_deref().unwrap_or("finished"),
                finished.data.elapsed_time.unwrap_or_default()
            );
        })
        .on_message_end(|end| {
            if let Some(conversation) = end.conversation_id {
                eprintln!("\n[conversation] {}", conversation);
            }
        })
        .on_completed(|_| println!());

    let handle = client.send_chat_message(request, handlers)?;
    let cancel = handle.cancellation_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let outcome = handle.wait().await;
    ctrl_c.abort();

    match outcome {
        SessionOutcome::Completed => Ok(()),
        SessionOutcome::Cancelled => {
            eprintln!("\ncancelled");
            Ok(())
        }
        SessionOutcome::Failed(err) => Err(eyre!("{} ({})", err.user_message(), err.error_code())),
    }
}

fn display_title<'a>(title: &'a str, node_id: &'a str) -> &'a str {
    if title.is_empty() {
        node_id
    } else {
        title
    }
}
