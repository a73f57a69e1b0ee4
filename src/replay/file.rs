//! The v1 JSON replay file format (§6): export a finished game's replay (and any analysis
//! already computed for it) to a portable document, and parse one back with the documented
//! rejection contract.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ids::RoomId;

use super::analyze::AnalysisResult;
use super::Replay;

const KIND: &str = "anagram-thief-replay";
const VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayFileMeta {
    pub source: String,
    #[serde(rename = "sourceRoomId", skip_serializing_if = "Option::is_none")]
    pub source_room_id: Option<RoomId>,
    #[serde(rename = "sourceStatus")]
    pub source_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayFile {
    pub kind: String,
    pub v: u32,
    #[serde(rename = "exportedAt")]
    pub exported_at: i64,
    pub replay: Replay,
    #[serde(rename = "analysisByStepIndex", skip_serializing_if = "Option::is_none")]
    pub analysis_by_step_index: Option<BTreeMap<String, AnalysisResult>>,
    pub meta: ReplayFileMeta,
}

impl ReplayFile {
    /// Build a v1 export for an ended room's replay.
    pub fn export(
        room_id: RoomId,
        replay: Replay,
        analysis_by_step_index: Option<BTreeMap<String, AnalysisResult>>,
        exported_at_ms: i64,
    ) -> Self {
        Self {
            kind: KIND.to_string(),
            v: VERSION,
            exported_at: exported_at_ms,
            replay,
            analysis_by_step_index,
            meta: ReplayFileMeta {
                source: "ended-room".to_string(),
                source_room_id: Some(room_id),
                source_status: "ended".to_string(),
                app: None,
            },
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("replay file always serializes")
    }

    /// Parse and validate a replay file per the §6 parser contract: `kind` must match, `v` must
    /// be exactly 1, step indices must run 0,1,2,… with no gaps, and any analysis keys must be
    /// step indices actually present in the replay.
    pub fn parse(json: &str) -> Result<Self> {
        let file: ReplayFile =
            serde_json::from_str(json).map_err(|e| Error::ReplayFileInvalid(format!("not valid JSON: {e}")))?;

        if file.kind != KIND {
            return Err(Error::ReplayFileInvalid(format!(
                "unrecognized kind {:?}, expected {KIND:?}",
                file.kind
            )));
        }
        if file.v != VERSION {
            return Err(Error::ReplayFileInvalid(format!("unsupported version {}, expected {VERSION}", file.v)));
        }
        for (expected, step) in file.replay.steps.iter().enumerate() {
            if step.index != expected as u64 {
                return Err(Error::ReplayFileInvalid(format!(
                    "non-sequential step indices: expected {expected}, found {}",
                    step.index
                )));
            }
        }
        let step_count = file.replay.steps.len();
        if let Some(analysis) = &file.analysis_by_step_index {
            for key in analysis.keys() {
                let index: usize = key
                    .parse()
                    .map_err(|_| Error::ReplayFileInvalid(format!("analysis key {key:?} is not a step index")))?;
                if index >= step_count {
                    return Err(Error::ReplayFileInvalid(format!(
                        "analysis key {index} is outside [0, {step_count})"
                    )));
                }
            }
        }
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::{ReplayStep, Snapshot, StepKind};
    use crate::room::types::{GameStatus, PrecedenceOrder};
    use chrono::DateTime;

    fn empty_snapshot() -> Snapshot {
        Snapshot {
            status: GameStatus::Ended,
            bag_count: 0,
            center_tiles: vec![],
            players: vec![],
            turn_player_id: None,
            claim_window: None,
            claim_cooldowns: Default::default(),
            pending_flip: None,
            pre_steal_enabled: false,
            precedence_order: PrecedenceOrder::new(vec![]),
            last_claim_event: None,
            end_timer_ends_at: None,
        }
    }

    fn replay_with_steps(n: usize) -> Replay {
        let steps = (0..n)
            .map(|i| ReplayStep {
                index: i as u64,
                at: DateTime::from_timestamp(i as i64, 0).unwrap(),
                kind: StepKind::GameStart,
                state: empty_snapshot(),
            })
            .collect();
        Replay { steps }
    }

    #[test]
    fn round_trips_a_well_formed_file() {
        let file = ReplayFile::export(RoomId::new(), replay_with_steps(3), None, 1_700_000_000_000);
        let json = file.to_json();
        let parsed = ReplayFile::parse(&json).expect("well-formed export should parse");
        assert_eq!(parsed.replay.steps.len(), 3);
        assert_eq!(parsed.v, 1);
    }

    #[test]
    fn rejects_wrong_kind() {
        let mut file = ReplayFile::export(RoomId::new(), replay_with_steps(1), None, 0);
        file.kind = "something-else".to_string();
        assert!(ReplayFile::parse(&file.to_json()).is_err());
    }

    #[test]
    fn rejects_wrong_version() {
        let mut file = ReplayFile::export(RoomId::new(), replay_with_steps(1), None, 0);
        file.v = 2;
        assert!(ReplayFile::parse(&file.to_json()).is_err());
    }

    #[test]
    fn rejects_non_sequential_step_indices() {
        let mut file = ReplayFile::export(RoomId::new(), replay_with_steps(2), None, 0);
        file.replay.steps[1].index = 5;
        assert!(ReplayFile::parse(&file.to_json()).is_err());
    }

    #[test]
    fn rejects_analysis_key_out_of_range() {
        let mut analysis = BTreeMap::new();
        analysis.insert(
            "9".to_string(),
            AnalysisResult {
                requested_step_index: 9,
                step_kind: StepKind::FlipRevealed,
                basis: crate::replay::analyze::Basis::Step,
                basis_step_index: 9,
                best_score: 0,
                all_options: vec![],
            },
        );
        let file = ReplayFile::export(RoomId::new(), replay_with_steps(2), Some(analysis), 0);
        assert!(ReplayFile::parse(&file.to_json()).is_err());
    }
}
