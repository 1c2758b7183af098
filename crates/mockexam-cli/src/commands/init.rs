//! The `mockexam init` command.

use std::path::Path;

use anyhow::Result;

fn write_if_missing(path: &str, content: &str) -> Result<()> {
    if Path::new(path).exists() {
        println!("{path} already exists, skipping.");
    } else {
        std::fs::write(path, content)?;
        println!("Created {path}");
    }
    Ok(())
}

pub fn execute() -> Result<()> {
    write_if_missing("mockexam.toml", SAMPLE_CONFIG)?;
    write_if_missing("plan.toml", SAMPLE_PLAN)?;

    std::fs::create_dir_all("banks")?;
    write_if_missing("banks/chapt1.json", SAMPLE_CHAPTER_1)?;
    write_if_missing("banks/chapt2.json", SAMPLE_CHAPTER_2)?;

    println!("\nNext steps:");
    println!("  1. Add your own chapter banks under banks/ and list them in plan.toml");
    println!("  2. Run: mockexam validate --plan plan.toml");
    println!("  3. Run: mockexam run --plan plan.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# mockexam configuration

reduced_motion = false
exit_item_ms = 40
output_dir = "./mockexam-results"

[source]
type = "directory"
path = "./banks"

# Or serve the banks over HTTP:
# [source]
# type = "http"
# base_url = "${MOCKEXAM_BANK_URL}"
"#;

const SAMPLE_PLAN: &str = r#"[exam]
id = "sample"
name = "Sample mock exam"
size = 4
duration_secs = 600
pass_threshold = 3
urgent_threshold_secs = 120

[[chapters]]
source = "chapt1.json"
count = 2

[[chapters]]
source = "chapt2.json"
count = 2
"#;

const SAMPLE_CHAPTER_1: &str = r#"{
  "chapterId": "1",
  "title": "Fundamentals of testing",
  "questions": [
    {
      "questionId": "1-1",
      "statement": "Which activity belongs to testing rather than debugging?",
      "choices": ["Locating the cause of a failure", "Fixing the defect", "Showing that a failure occurs", "Removing the faulty code"],
      "correctIndex": 2
    },
    {
      "questionId": "1-2",
      "statement": "What does exhaustive testing mean?",
      "choices": ["Testing every combination of inputs and preconditions", "Testing until the team is exhausted", "Running all regression tests", "Testing every requirement once"],
      "correctIndex": 0
    },
    {
      "questionId": "1-3",
      "statement": "Which principle says defects tend to cluster in a few modules?",
      "choices": ["Pesticide paradox", "Defect clustering", "Absence-of-errors fallacy", "Early testing"],
      "correctIndex": 1
    }
  ]
}
"#;

const SAMPLE_CHAPTER_2: &str = r#"{
  "chapterId": "2",
  "title": "Testing throughout the life cycle",
  "statementFormat": "richtext",
  "questions": [
    {
      "questionId": "2-1",
      "statement": "Which test level focuses on **interactions** between components?",
      "choices": ["Component testing", "Integration testing", "System testing", "Acceptance testing"],
      "correctIndex": 1
    },
    {
      "questionId": "2-2",
      "statement": "Regression testing is performed to:",
      "choices": ["Find new defects only", "Check that changes did not break existing behaviour", "Measure performance", "Validate user needs"],
      "correctIndex": 1
    },
    {
      "questionId": "2-3",
      "statement": "Who usually performs *acceptance* testing?",
      "statementFormat": "plain",
      "choices": ["Developers", "Customers or users", "Compilers", "Auditors only"],
      "correctIndex": 1
    }
  ]
}
"#;
