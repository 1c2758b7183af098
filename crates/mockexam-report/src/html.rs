//! HTML report generator.
//!
//! Produces a self-contained review page with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use mockexam_core::model::StatementFormat;
use mockexam_core::report::{format_elapsed, ChapterScore, ExamReport, QuestionReview};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate the HTML review page of a submitted exam.
pub fn generate_html(report: &ExamReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>{} results</title>\n",
        html_escape(&report.exam_name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&report.exam_name)));
    html.push_str(&format!(
        "<p class=\"meta\">Submitted {} | {} questions | {}</p>\n",
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.total,
        if report.time_expired {
            "time expired"
        } else {
            "submitted by the candidate"
        }
    ));
    html.push_str("</header>\n");

    // Summary
    let verdict_class = if report.verdict.passed() { "pass" } else { "fail" };
    html.push_str("<section class=\"summary\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str(&format!(
        "<p class=\"badge {verdict_class}\">{}</p>\n",
        html_escape(report.verdict.message())
    ));
    html.push_str(&format!(
        "<p>{}</p>\n<p>{}</p>\n",
        html_escape(&report.score_line()),
        html_escape(&report.time_line())
    ));
    html.push_str(&format!(
        "<p class=\"meta\">Pass mark: {}/{} | Allotted time: {}</p>\n",
        report.pass_threshold,
        report.total,
        format_elapsed(report.duration_secs)
    ));
    html.push_str("</section>\n");

    // Chapter breakdown
    html.push_str("<section class=\"chapters\">\n");
    html.push_str("<h2>By chapter</h2>\n");
    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>Chapter</th><th>Correct</th><th>Questions</th><th>Rate</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for chapter in &report.chapters {
        html.push_str(&format!(
            "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{:.1}%</td></tr>\n",
            html_escape(&chapter.title),
            chapter.correct,
            chapter.total,
            chapter_rate(chapter) * 100.0
        ));
    }
    html.push_str("</tbody></table>\n");
    if !report.chapters.is_empty() {
        html.push_str(&generate_bar_chart(&report.chapters));
    }
    html.push_str("</section>\n");

    // Per-question review
    html.push_str("<section class=\"review\">\n");
    html.push_str("<h2>Review</h2>\n");
    html.push_str(
        "<label><input type=\"checkbox\" id=\"only-wrong\" onchange=\"filterReview(this.checked)\"> \
         Show only missed questions</label>\n",
    );
    html.push_str("<ol id=\"review\">\n");
    for question in &report.questions {
        html.push_str(&review_item(question));
    }
    html.push_str("</ol>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ExamReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn chapter_rate(chapter: &ChapterScore) -> f64 {
    if chapter.total == 0 {
        0.0
    } else {
        chapter.correct as f64 / chapter.total as f64
    }
}

fn review_item(question: &QuestionReview) -> String {
    let class = if question.correct { "correct" } else { "wrong" };
    let statement_class = match question.format {
        StatementFormat::Plain => "statement",
        StatementFormat::RichText => "statement rich",
    };

    let mut item = format!(
        "<li class=\"{class}\" value=\"{}\">\n<div class=\"{statement_class}\">{}</div>\n<ul class=\"choices\">\n",
        question.number,
        html_escape(&question.statement)
    );
    for (i, choice) in question.choices.iter().enumerate() {
        let mut marks = Vec::new();
        if i == question.correct_index {
            marks.push("answer");
        }
        if question.selected.index() == Some(i) {
            marks.push("selected");
        }
        item.push_str(&format!(
            "<li class=\"{}\">{}</li>\n",
            marks.join(" "),
            html_escape(choice)
        ));
    }
    item.push_str("</ul>\n");
    if !question.selected.is_answered() {
        item.push_str(&format!(
            "<p class=\"meta\">{}</p>\n",
            html_escape(question.selected_text())
        ));
    }
    item.push_str("</li>\n");
    item
}

fn generate_bar_chart(chapters: &[ChapterScore]) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 220;

    let total_height = chapters.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, chapter) in chapters.iter().enumerate() {
        let rate = chapter_rate(chapter);
        let y = i * (bar_height + padding) + padding;
        let width = (rate * max_width as f64) as usize;

        let color = if rate >= 0.8 {
            "#22c55e"
        } else if rate >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&chapter.title)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}/{}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            chapter.correct,
            chapter.total
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --paper: #fdfdfb; --ink: #22252a; --rule: #d9dce1; --ok: #d8f3dc; --miss: #fbe0e0; --muted: #717784; }
@media (prefers-color-scheme: dark) {
  :root { --paper: #16181d; --ink: #eceef2; --rule: #343842; --ok: #1d4d32; --miss: #5c1f24; --muted: #9aa0ab; }
}
body { font-family: system-ui, sans-serif; line-height: 1.45; margin: 0 auto; padding: 1.5rem 2rem; background: var(--paper); color: var(--ink); max-width: 56rem; }
h2 { margin-top: 2.25rem; border-bottom: 1px solid var(--rule); padding-bottom: 0.25rem; }
.meta { color: var(--muted); }
.badge { display: inline-block; padding: 0.35rem 0.9rem; border-radius: 999px; font-weight: 700; letter-spacing: 0.03em; }
.pass { background: var(--ok); }
.fail { background: var(--miss); }
table { border-collapse: collapse; min-width: 60%; }
th, td { border-bottom: 1px solid var(--rule); padding: 0.4rem 0.8rem; }
th { text-align: left; color: var(--muted); font-weight: 600; }
td.num { text-align: right; font-variant-numeric: tabular-nums; }
#review > li { margin: 1rem 0; padding: 0.75rem 1rem; border-left: 4px solid var(--rule); }
#review > li.correct { border-left-color: #2f9e5b; }
#review > li.wrong { border-left-color: #d0453c; }
.statement { white-space: pre-wrap; font-weight: 600; }
.statement.rich { font-weight: normal; }
.choices li.answer { background: var(--ok); }
.choices li.selected:not(.answer) { background: var(--miss); }
.choices li.selected::after { content: "  \2190 your answer"; color: var(--muted); }
.raw-data pre { max-height: 24rem; overflow: auto; padding: 0.75rem; border: 1px solid var(--rule); }
.raw-data code { font-family: ui-monospace, monospace; font-size: 0.8rem; }
.raw-data summary { cursor: pointer; color: var(--muted); }
"#;

const JS: &str = r#"
function filterReview(onlyWrong) {
  document.querySelectorAll('#review > li').forEach(li => {
    li.style.display = onlyWrong && li.classList.contains('correct') ? 'none' : '';
  });
}
"#;
