//! CLI module for docqa
//!
//! Provides subcommands:
//! - `ask`: answer one question over a set of documents
//! - `chat`: answer questions read from stdin over the same documents

pub mod ask;
pub mod chat;
mod session;

use clap::{Parser, Subcommand};

/// docqa - grounded answers over your documents, with a self-check pass
#[derive(Debug, Parser)]
#[command(name = "docqa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Answer a single question
    Ask(ask::AskArgs),

    /// Answer questions from stdin until EOF or `exit`
    Chat(chat::ChatArgs),
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Ask(args) => ask::run(args, cli.verbose).await,
        Command::Chat(args) => chat::run(args, cli.verbose).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from([
            "docqa",
            "ask",
            "--docs",
            "a.txt",
            "b.md",
            "--question",
            "What is the notice period?",
            "--json",
        ])
        .unwrap();

        let Command::Ask(args) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(args.docs, vec![PathBuf::from("a.txt"), PathBuf::from("b.md")]);
        assert_eq!(args.question, "What is the notice period?");
        assert!(args.json);
        assert!(!args.print_metrics);
        assert!(args.session.is_none());
    }

    #[test]
    fn test_ask_requires_docs_and_question() {
        assert!(Cli::try_parse_from(["docqa", "ask", "--question", "q"]).is_err());
        assert!(Cli::try_parse_from(["docqa", "ask", "--docs", "a.txt"]).is_err());
    }

    #[test]
    fn test_parse_chat_with_global_verbose() {
        let cli = Cli::try_parse_from(["docqa", "chat", "--docs", "a.txt", "-v"]).unwrap();

        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Chat(_)));
    }
}
