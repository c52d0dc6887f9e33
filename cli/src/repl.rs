//! Interactive chat loop: read stdin, run one advisor turn, print the summary, repeat.
//!
//! The transcript lives across iterations so the model keeps context. With
//! `--history`, the transcript is loaded from and saved to a wire-format JSON file
//! after every turn, so a later invocation resumes the same conversation. Exits on
//! EOF (Ctrl+D) or `quit`/`exit`/`/quit`. A failed turn prints to stderr and
//! continues; the transcript still holds the user's message so the next attempt has
//! context.

use std::io::Write;
use std::path::Path;

use tokio::io::{AsyncBufReadExt, BufReader};

use saathi::message::wire::Content;
use saathi::{Advisor, ReportSummary, Transcript, TurnOutcome};

fn is_quit_command(line: &str) -> bool {
    matches!(line.trim(), "quit" | "exit" | "/quit")
}

/// Loads a transcript from a wire-format history file. A missing file starts a fresh
/// conversation; a malformed one is an error rather than silently losing history.
fn load_history(path: &Path) -> Result<Transcript, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Ok(Transcript::new());
    }
    let text = std::fs::read_to_string(path)?;
    let contents: Vec<Content> = serde_json::from_str(&text)?;
    Ok(Transcript::from_wire(&contents)?)
}

fn save_history(path: &Path, transcript: &Transcript) -> Result<(), Box<dyn std::error::Error>> {
    let text = serde_json::to_string_pretty(&transcript.to_wire())?;
    std::fs::write(path, text)?;
    Ok(())
}

fn print_summary(summary: &ReportSummary) {
    println!("{}", summary.response);
    if summary.carbon_emission > 0.0 {
        println!(
            "estimated emission: {} kg CO2e ({:.0}% of the 100 kg gauge)",
            summary.carbon_emission, summary.carbon_percentage
        );
    }
    if !summary.suggestions.is_empty() {
        println!("suggestions:");
        for suggestion in &summary.suggestions {
            println!("  - {suggestion}");
        }
    }
    for rec in &summary.fertilizer_recommendations {
        if let Some(fertilizer) = &rec.fertilizer_type {
            match (rec.amount, &rec.best_time_to_apply) {
                (Some(amount), Some(when)) => {
                    println!("fertilizer: {fertilizer}, {amount} ({when})")
                }
                _ => println!("fertilizer: {fertilizer}"),
            }
        }
    }
}

/// Runs the chat loop until EOF or a quit command.
pub async fn run_chat_loop(
    advisor: &Advisor,
    history: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = BufReader::new(tokio::io::stdin()).lines();
    let mut transcript = match history {
        Some(path) => load_history(path)?,
        None => Transcript::new(),
    };
    if !transcript.is_empty() {
        println!("(resuming conversation, {} turns)", transcript.len());
    }

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = match reader.next_line().await? {
            None => break,
            Some(s) if s.trim().is_empty() => continue,
            Some(s) if is_quit_command(&s) => break,
            Some(s) => s,
        };

        let (outcome, updated) = advisor.process_turn(line.trim(), transcript).await;
        transcript = updated;

        match outcome {
            TurnOutcome::Report(report) => print_summary(&ReportSummary::from_report(*report)),
            TurnOutcome::Degraded { raw } => println!("{raw}"),
            TurnOutcome::Failed { message } => eprintln!("error: {message}"),
        }

        if let Some(path) = history {
            if let Err(e) = save_history(path, &transcript) {
                eprintln!("warning: could not save history: {e}");
            }
        }
    }
    Ok(())
}
