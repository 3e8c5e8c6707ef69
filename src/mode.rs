use crate::reaction::ReactionSamples;
use crate::recoil::RecoilPattern;
use crate::scheduler::Millis;
use serde::{Deserialize, Serialize};

/// Padding between the spawn rectangle edge and a target, in pixels.
pub const FIELD_PADDING: f64 = 20.0;
pub const TIGHT_PADDING: f64 = 5.0;
pub const GRID_CELL_PADDING: f64 = 4.0;

/// How long a fugitive target shows its "hit" state before it is removed.
pub const FUGITIVE_HIT_DELAY_MS: Millis = 300;
pub const REPEL_RADIUS_PX: f64 = 150.0;
pub const REPEL_DISTANCE_PX: f64 = 25.0;

/// A named game variant with its own spawn and scoring rules.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Mode {
    FreeAim,
    Intensive,
    Spray,
    Reaction,
    Grid,
    Letter,
    LetterFugitive,
}

impl Mode {
    /// Dashboard order.
    pub const ALL: [Mode; 7] = [
        Mode::FreeAim,
        Mode::Intensive,
        Mode::Spray,
        Mode::Reaction,
        Mode::Grid,
        Mode::Letter,
        Mode::LetterFugitive,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Mode::FreeAim => "Free Aim",
            Mode::Intensive => "Intensive",
            Mode::Spray => "Recoil Spray",
            Mode::Reaction => "Reaction Time",
            Mode::Grid => "Grid",
            Mode::Letter => "Letters",
            Mode::LetterFugitive => "Fugitive Letters",
        }
    }

    pub fn blurb(&self) -> &'static str {
        match self {
            Mode::FreeAim => "random targets with adjustable area, size and speed",
            Mode::Intensive => "5% area with tiny targets",
            Mode::Spray => "follow a 30-shot recoil pattern in order",
            Mode::Reaction => "one target, random delay, 500ms to click it",
            Mode::Grid => "targets snap to the cells of an n x n grid",
            Mode::Letter => "lettered targets, single or multiple",
            Mode::LetterFugitive => "lettered targets that flee from missed clicks",
        }
    }

    /// Dispatch table: the scheduler, spawner and hit-resolver rules for this mode.
    pub fn policy(&self) -> ModePolicy {
        match self {
            Mode::FreeAim => ModePolicy::field(FIELD_PADDING),
            Mode::Intensive => ModePolicy::field(TIGHT_PADDING),
            Mode::Grid => ModePolicy {
                placement: Placement::GridCell {
                    padding: GRID_CELL_PADDING,
                },
                ..ModePolicy::field(FIELD_PADDING)
            },
            Mode::Letter => ModePolicy {
                labeled: true,
                config_cap: true,
                ..ModePolicy::field(FIELD_PADDING)
            },
            Mode::LetterFugitive => ModePolicy {
                hit: HitPolicy::Deferred {
                    delay_ms: FUGITIVE_HIT_DELAY_MS,
                },
                miss: MissPolicy::Repel {
                    radius: REPEL_RADIUS_PX,
                    distance: REPEL_DISTANCE_PX,
                },
                labeled: true,
                config_cap: true,
                ..ModePolicy::field(FIELD_PADDING)
            },
            Mode::Spray => ModePolicy {
                spawn: SpawnPolicy::Pattern,
                placement: Placement::Pattern,
                hit: HitPolicy::PatternStep,
                miss: MissPolicy::PatternMiss,
                labeled: false,
                config_cap: false,
            },
            Mode::Reaction => ModePolicy {
                spawn: SpawnPolicy::Reaction,
                placement: Placement::Rect {
                    padding: TIGHT_PADDING,
                },
                hit: HitPolicy::Reaction,
                miss: MissPolicy::Count,
                labeled: false,
                config_cap: false,
            },
        }
    }

    /// Fresh mode-specific sub-state for a new session in this mode.
    pub fn initial_state(&self) -> ModeState {
        match self {
            Mode::FreeAim | Mode::Intensive | Mode::Letter => ModeState::Field,
            Mode::Grid => ModeState::Grid,
            Mode::LetterFugitive => ModeState::Fugitive,
            Mode::Spray => ModeState::Spray(RecoilState::default()),
            Mode::Reaction => ModeState::Reaction(ReactionState::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnPolicy {
    /// Spawn ticker plus escalating concurrency cap.
    Periodic,
    /// Whole recoil pattern materialized once on entry.
    Pattern,
    /// One target at a time behind random delays.
    Reaction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Rect { padding: f64 },
    GridCell { padding: f64 },
    Pattern,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitPolicy {
    /// Remove, score, then try to spawn a replacement.
    Backfill,
    /// Mark the target and resolve it after a delay.
    Deferred { delay_ms: Millis },
    PatternStep,
    Reaction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissPolicy {
    Count,
    Repel { radius: f64, distance: f64 },
    PatternMiss,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModePolicy {
    pub spawn: SpawnPolicy,
    pub placement: Placement,
    pub hit: HitPolicy,
    pub miss: MissPolicy,
    /// Targets carry a letter label.
    pub labeled: bool,
    /// The single/multiple option may pin the concurrency cap to one.
    pub config_cap: bool,
}

impl ModePolicy {
    fn field(padding: f64) -> Self {
        Self {
            spawn: SpawnPolicy::Periodic,
            placement: Placement::Rect { padding },
            hit: HitPolicy::Backfill,
            miss: MissPolicy::Count,
            labeled: false,
            config_cap: false,
        }
    }
}

/// Mode-specific portion of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeState {
    Field,
    Grid,
    Fugitive,
    Spray(RecoilState),
    Reaction(ReactionState),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecoilState {
    pub pattern: Option<RecoilPattern>,
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactionState {
    pub samples: ReactionSamples,
    /// When the live target appeared, if one is showing.
    pub spawned_at: Option<Millis>,
}
