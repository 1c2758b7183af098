//! mockexam-report: Result report rendering.
//!
//! Turns a submitted `ExamReport` into a self-contained HTML review page.
//! JSON output lives on `ExamReport` itself.

pub mod html;

pub use html::{generate_html, write_html_report};
