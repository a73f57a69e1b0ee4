//! Replay step analyzer (§4.9): project a recorded moment back into a [`Puzzle`] and run the
//! word-formation engine over it, the same way the practice engine scores a live submission.
use serde::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::engine::claims::{ClaimOption, ExistingWord};
use crate::engine::practice::{solve, Puzzle};
use crate::error::{Error, Result};

use super::{Replay, StepKind};

/// Which recorded moment a step's analysis was computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Basis {
    /// `flip-revealed` steps are analyzed against themselves.
    Step,
    /// `claim-succeeded` steps are analyzed against the moment just before the claim landed.
    BeforeClaim,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub requested_step_index: u64,
    pub step_kind: StepKind,
    pub basis: Basis,
    pub basis_step_index: u64,
    pub best_score: u32,
    pub all_options: Vec<ClaimOption>,
}

/// Analyze `replay`'s step at `step_index`. Only `FlipRevealed` and `ClaimSucceeded` steps can
/// be analyzed; anything else, or an out-of-range index, fails with a reason suitable for the
/// client-facing "Replay analysis failed: …" message.
pub fn analyze_step(replay: &Replay, step_index: usize, dictionary: &Dictionary) -> Result<AnalysisResult> {
    let step = replay
        .steps
        .get(step_index)
        .ok_or_else(|| Error::ReplayAnalysisFailed(format!("no step at index {step_index}")))?;

    let (basis, basis_index) = match step.kind {
        StepKind::FlipRevealed => (Basis::Step, step_index),
        StepKind::ClaimSucceeded => {
            let prev = step_index
                .checked_sub(1)
                .ok_or_else(|| Error::ReplayAnalysisFailed("claim-succeeded at step 0 has no prior step".into()))?;
            (Basis::BeforeClaim, prev)
        }
        other => {
            return Err(Error::ReplayAnalysisFailed(format!("step kind {other:?} is not analyzable")));
        }
    };

    let basis_step = &replay.steps[basis_index];
    let existing_words: Vec<ExistingWord> = basis_step
        .state
        .players
        .iter()
        .flat_map(|p| {
            p.words.iter().map(move |w| ExistingWord {
                word_id: w.id,
                owner_id: p.id,
                text: w.text.clone(),
                tile_ids: w.tile_ids.clone(),
            })
        })
        .collect();

    let puzzle = Puzzle {
        center_tiles: basis_step.state.center_tiles.clone(),
        existing_words,
    };
    let all_options = solve(&puzzle, dictionary);
    let best_score = all_options.first().map(|o| o.score).unwrap_or(0);

    Ok(AnalysisResult {
        requested_step_index: step_index as u64,
        step_kind: step.kind,
        basis,
        basis_step_index: basis_index as u64,
        best_score,
        all_options,
    })
}
