//! The `mockexam validate` command.

use std::path::PathBuf;

use anyhow::Result;

use mockexam_core::parser::{self, validate_plan};
use mockexam_core::source::load_chapter;
use mockexam_sources::config::load_config_from;

pub async fn execute(
    plan_path: PathBuf,
    banks: Option<PathBuf>,
    base_url: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let exam = parser::parse_plan(&plan_path)?;
    let source = super::resolve_source(&config, banks, base_url)?;

    println!(
        "Exam: {} ({} questions from {} chapters, pass mark {})",
        exam.name,
        exam.settings.size,
        exam.plan.entries.len(),
        exam.settings.pass_threshold
    );

    let mut pools = Vec::new();
    let mut failures = 0;
    for chapter in exam.plan.chapters() {
        match load_chapter(source.as_ref(), &chapter).await {
            Ok(pool) => {
                println!("  [{chapter}] {} questions", pool.len());
                pools.push(pool);
            }
            Err(e) => {
                println!("  [{chapter}] ERROR: {}", e.cause);
                failures += 1;
            }
        }
    }

    let warnings = validate_plan(&exam, &pools);
    for w in &warnings {
        let prefix = w
            .chapter
            .as_ref()
            .map(|c| format!("  [{c}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    anyhow::ensure!(failures == 0, "{failures} chapter(s) could not be loaded");

    if warnings.is_empty() {
        println!("Plan is valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
