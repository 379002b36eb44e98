//! Chat command - answer questions from stdin over one index

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

use super::ask::render;
use super::session::Session;

/// Re-read the documents, rebuilding the index if they changed
const RELOAD_COMMAND: &str = "/reload";
const EXIT_COMMAND: &str = "exit";

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Documents to answer from (.txt or .md)
    #[arg(long, required = true, num_args = 1..)]
    pub docs: Vec<PathBuf>,

    /// Session id to register the index under
    #[arg(long)]
    pub session: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Skip,
    Exit,
    Reload,
    Question(&'a str),
}

fn classify_input(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Skip,
        EXIT_COMMAND => Input::Exit,
        RELOAD_COMMAND => Input::Reload,
        question => Input::Question(question),
    }
}

fn prompt() {
    print!("> ");
    std::io::stdout().flush().ok();
}

pub async fn run(args: ChatArgs, verbose: bool) -> anyhow::Result<()> {
    let session = Session::start(args.session, verbose)?;
    let mut retriever = session.index(&args.docs).await?;

    println!(
        "Indexed {} document(s). Ask a question, '{}' to re-read them, '{}' to quit.",
        args.docs.len(),
        RELOAD_COMMAND,
        EXIT_COMMAND
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();

    while let Some(line) = lines.next_line().await? {
        match classify_input(&line) {
            Input::Skip => {}
            Input::Exit => break,
            Input::Reload => match session.index(&args.docs).await {
                Ok(rebuilt) => {
                    retriever = rebuilt;
                    println!("Documents reloaded.");
                }
                Err(e) => eprintln!("Reload failed: {:#}", e),
            },
            Input::Question(question) => {
                match session
                    .workflow
                    .run_pipeline(question, retriever.clone())
                    .await
                {
                    Ok(result) => println!("{}", render(&result)),
                    Err(e) => {
                        error!(error = %e, "Pipeline run failed");
                        eprintln!("Error: {}", e);
                    }
                }
            }
        }
        prompt();
    }

    Ok(())
}
