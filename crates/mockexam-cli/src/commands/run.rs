//! The `mockexam run` command.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use mockexam_core::engine::{Command, ExamEngine, ExamEngineConfig, Outcome};
use mockexam_core::parser;
use mockexam_core::report::ExamReport;
use mockexam_report::html::write_html_report;
use mockexam_sources::config::load_config_from;

use crate::terminal::{spawn_stdin_reader, Board, ReplySlot, TerminalAnimator, TerminalPrompt, TerminalView};

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    plan_path: PathBuf,
    banks: Option<PathBuf>,
    base_url: Option<String>,
    seed: Option<u64>,
    reduced_motion: bool,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let formats = parse_formats(&format)?;

    // Load config
    let config = load_config_from(config_path.as_deref())?;
    let exam = parser::parse_plan(&plan_path)?;
    let source = super::resolve_source(&config, banks, base_url)?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let board = Arc::new(Board::default());
    let slot = Arc::new(Mutex::new(ReplySlot::default()));

    let mut engine = ExamEngine::new(
        source,
        Arc::new(TerminalView::new(Arc::clone(&board), exam.name.clone())),
        Arc::new(TerminalPrompt::new(Arc::clone(&slot))),
        Arc::new(TerminalAnimator::new(Duration::from_millis(
            config.exit_item_ms,
        ))),
        exam,
        ExamEngineConfig {
            reduced_motion: reduced_motion || config.reduced_motion,
            seed: seed.or(config.seed),
        },
    );

    // Load before reading input so answers never race the question set.
    match engine.dispatch(Command::Start).await {
        Outcome::Started { questions } => {
            for warning in engine.warnings() {
                eprintln!("Warning: {warning}");
            }
            let target = engine.exam().settings.size;
            if questions < target {
                eprintln!("Warning: exam has {questions} of {target} questions");
            }
        }
        Outcome::StartFailed { message } => anyhow::bail!(message),
        other => anyhow::bail!("exam did not start: {other:?}"),
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let _reader = spawn_stdin_reader(tx, Arc::clone(&board), slot);
    engine.run(rx).await;

    let reports = board.take_reports();
    if reports.is_empty() {
        println!("No exam was submitted.");
        return Ok(());
    }
    for report in &reports {
        write_reports(report, &output, &formats)?;
    }

    Ok(())
}

fn parse_formats(format: &str) -> Result<Vec<&str>> {
    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html"]
    } else {
        format.split(',').map(str::trim).collect()
    };
    for fmt in &formats {
        anyhow::ensure!(
            matches!(*fmt, "json" | "html"),
            "unknown output format: '{fmt}' (expected json, html or all)"
        );
    }
    Ok(formats)
}

fn write_reports(report: &ExamReport, output: &Path, formats: &[&str]) -> Result<()> {
    let id = report.id.simple().to_string();
    let stem = format!(
        "report-{}-{}",
        report.created_at.format("%Y%m%d-%H%M%S"),
        &id[..8]
    );

    for fmt in formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("{stem}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("{stem}.html"));
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {}
        }
    }
    Ok(())
}
