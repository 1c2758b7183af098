use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use mockexam_core::model::{ChapterPool, ChapterRef, Question, QuestionId, SamplingPlan};
use mockexam_core::parser::parse_chapter_str;
use mockexam_core::sampler::{assemble_exam, sample};

fn make_pool(source: &str, chapter: usize, size: usize) -> ChapterPool {
    ChapterPool {
        source: ChapterRef::new(source),
        id: chapter.to_string(),
        title: format!("Chapter {chapter}"),
        default_format: None,
        questions: (0..size)
            .map(|i| Question {
                id: QuestionId::from(format!("{chapter}-{i}")),
                statement: format!("Statement {i}"),
                format: Default::default(),
                choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_index: i % 4,
                chapter_id: Some(chapter.to_string()),
                chapter_title: None,
            })
            .collect(),
    }
}

fn reference_pools(size: usize) -> Vec<ChapterPool> {
    (1..=6)
        .map(|c| make_pool(&format!("chapt{c}.json"), c, size))
        .collect()
}

fn bench_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample");
    let pool = make_pool("chapt4.json", 4, 200);

    group.bench_function("11_of_200", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| sample(black_box(&pool.questions), black_box(11), &mut rng))
    });

    group.bench_function("200_of_200", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| sample(black_box(&pool.questions), black_box(200), &mut rng))
    });

    group.finish();
}

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble_exam");
    let plan = SamplingPlan::reference();

    for size in [20, 100, 500] {
        let pools = reference_pools(size);
        group.bench_function(format!("reference_plan/pool={size}"), |b| {
            let mut rng = StdRng::seed_from_u64(7);
            b.iter(|| assemble_exam(black_box(&plan), black_box(&pools), &mut rng))
        });
    }

    group.finish();
}

fn bench_parse_chapter(c: &mut Criterion) {
    let mut body = String::from(r#"{"chapterId":"4","title":"Test management","questions":["#);
    for i in 0..150 {
        if i > 0 {
            body.push(',');
        }
        body.push_str(&format!(
            r#"{{"questionId":"4-{i}","statement":"Which statement about item {i} is true?","choices":["a","b","c","d"],"correctIndex":{}}}"#,
            i % 4
        ));
    }
    body.push_str("]}");
    let source = ChapterRef::new("chapt4.json");

    c.bench_function("parse_chapter/150_questions", |b| {
        b.iter(|| parse_chapter_str(black_box(&source), black_box(&body)))
    });
}

criterion_group!(benches, bench_sample, bench_assemble, bench_parse_chapter);
criterion_main!(benches);
