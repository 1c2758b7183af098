//! Chapter-weighted question sampling.
//!
//! Questions are drawn without replacement: a copy of each pool is shuffled
//! (Fisher–Yates, via `SliceRandom::shuffle`) and the first `count` entries
//! are kept. The random source is always passed in so a seeded generator gives
//! repeatable exams.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{ChapterPool, ChapterRef, Question, SamplingPlan};

/// A chapter that could not supply as many questions as the plan asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndersizedPool {
    pub chapter: ChapterRef,
    pub requested: usize,
    pub available: usize,
}

impl std::fmt::Display for UndersizedPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "chapter {} has {} questions, {} requested",
            self.chapter, self.available, self.requested
        )
    }
}

/// The question set drawn for one attempt.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    /// Drawn questions, in plan order.
    pub questions: Vec<Question>,
    /// Chapters that came up short.
    pub warnings: Vec<UndersizedPool>,
}

/// Draw `count` distinct questions from `pool`.
///
/// Returns the whole pool, shuffled, when it holds fewer than `count`
/// questions. The caller's slice is left untouched.
pub fn sample<R: Rng + ?Sized>(pool: &[Question], count: usize, rng: &mut R) -> Vec<Question> {
    let mut copy = pool.to_vec();
    copy.shuffle(rng);
    copy.truncate(count);
    copy
}

/// Apply the sampler to each chapter of `plan` and concatenate the draws.
///
/// Chapters named in the plan but missing from `pools` count as empty.
pub fn assemble_exam<R: Rng + ?Sized>(
    plan: &SamplingPlan,
    pools: &[ChapterPool],
    rng: &mut R,
) -> Assembly {
    let by_source: HashMap<&ChapterRef, &ChapterPool> =
        pools.iter().map(|p| (&p.source, p)).collect();

    let mut assembly = Assembly::default();
    for entry in &plan.entries {
        let available: &[Question] = by_source
            .get(&entry.source)
            .map(|p| p.questions.as_slice())
            .unwrap_or(&[]);

        if available.len() < entry.count {
            let warning = UndersizedPool {
                chapter: entry.source.clone(),
                requested: entry.count,
                available: available.len(),
            };
            tracing::warn!("{warning}");
            assembly.warnings.push(warning);
        }

        assembly
            .questions
            .extend(sample(available, entry.count, rng));
    }

    if assembly.questions.len() < plan.total() {
        tracing::warn!(
            "assembled {} questions, plan asks for {}",
            assembly.questions.len(),
            plan.total()
        );
    }

    assembly
}
