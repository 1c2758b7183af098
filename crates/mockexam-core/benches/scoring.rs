use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mockexam_core::answers::{score, AnswerStore};
use mockexam_core::model::{ExamSettings, Question, QuestionId};
use mockexam_core::report::ExamReport;
use mockexam_core::timer::Clock;

fn make_questions(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| Question {
            id: QuestionId::Number(i as u64),
            statement: format!("Statement {i}"),
            format: Default::default(),
            choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: i % 4,
            chapter_id: Some(format!("{}", i % 6 + 1)),
            chapter_title: None,
        })
        .collect()
}

/// Answers `answered` questions, every other one correctly.
fn make_answers(questions: &[Question], answered: usize) -> AnswerStore {
    let mut store = AnswerStore::new();
    for (i, q) in questions.iter().take(answered).enumerate() {
        let choice = if i % 2 == 0 {
            q.correct_index
        } else {
            (q.correct_index + 1) % 4
        };
        store.record(q.id.clone(), choice);
    }
    store
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");
    let questions = make_questions(40);

    for answered in [0, 20, 40] {
        let answers = make_answers(&questions, answered).collect(&questions);
        group.bench_function(format!("40_questions/answered={answered}"), |b| {
            b.iter(|| score(black_box(&questions), black_box(&answers)))
        });
    }

    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("report");
    let questions = make_questions(40);
    let store = make_answers(&questions, 32);
    let settings = ExamSettings::default();
    let clock = Clock::new(settings.duration_secs, settings.urgent_threshold_secs);

    group.bench_function("collect", |b| b.iter(|| store.collect(black_box(&questions))));

    let answers = store.collect(&questions);
    group.bench_function("build", |b| {
        b.iter(|| {
            ExamReport::build(
                "bench",
                black_box(&settings),
                black_box(&questions),
                black_box(&answers),
                &clock,
                false,
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_score, bench_report);
criterion_main!(benches);
