//! Ask command - answer one question

use std::path::PathBuf;

use clap::Args;

use super::session::Session;
use crate::domain::qa::PipelineResult;

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Documents to answer from (.txt or .md)
    #[arg(long, required = true, num_args = 1..)]
    pub docs: Vec<PathBuf>,

    /// The question
    #[arg(short, long)]
    pub question: String,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// Session id to register the index under
    #[arg(long)]
    pub session: Option<String>,

    /// Print Prometheus metrics after the answer
    #[arg(long)]
    pub print_metrics: bool,
}

pub async fn run(args: AskArgs, verbose: bool) -> anyhow::Result<()> {
    let session = Session::start(args.session, verbose)?;
    let retriever = session.index(&args.docs).await?;

    let result = session.workflow.run_pipeline(&args.question, retriever).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render(&result));
    }

    if args.print_metrics {
        match session.render_metrics() {
            Some(text) => println!("\n{}", text),
            None => eprintln!("Metrics are disabled (observability.metrics.enabled = false)"),
        }
    }

    Ok(())
}

/// Human-readable output: the answer, then the report when one exists
pub fn render(result: &PipelineResult) -> String {
    let mut out = format!("{}\n", result.draft_answer);

    if !result.verification_report.is_empty() {
        out.push_str("\nVerification report:\n");
        out.push_str(&result.verification_report);
        out.push('\n');
    }

    if result.verification_incomplete {
        out.push_str(&format!(
            "\nWarning: the answer could not be verified after {} attempts.\n",
            result.attempts
        ));
    }

    out
}
