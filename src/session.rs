//! Authoritative game state and the engine entry points that mutate it.
//!
//! A [`Session`] is driven entirely from the outside: the caller passes the current
//! session-clock time into every call, timers fire from [`Session::advance`], and
//! clicks are resolved by [`Session::click`] (see `hit.rs`). All mutation happens
//! synchronously inside one of those calls.

use crate::config::{ModeConfig, TargetCap};
use crate::geometry::{grid_cells, spawn_region, Point, Region, Viewport};
use crate::mode::{Mode, ModeState, RecoilState, SpawnPolicy};
use crate::reaction::ReactionSamples;
use crate::recoil::RecoilPattern;
use crate::scheduler::{
    Fired, Millis, Scheduler, TimerSlot, CLOCK_PERIOD_MS, DISAPPEAR_AFTER_MS,
    ESCALATION_PERIOD_MS, FIRST_REACTION_DELAY_MS, MAX_CONCURRENT_CEILING,
    NEXT_REACTION_DELAY_MS,
};
use crate::scoring::{Summary, Tally, HIT_POINTS};
use crate::spawner;
use crate::target::{Target, TargetId};
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// State of one running session. Dropped on return to the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub mode: Mode,
    pub targets: Vec<Target>,
    pub tally: Tally,
    pub elapsed_secs: u64,
    pub next_id: TargetId,
    pub max_concurrent: usize,
    pub mode_state: ModeState,
}

impl SessionState {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            targets: Vec::new(),
            tally: Tally::default(),
            elapsed_secs: 0,
            next_id: 0,
            max_concurrent: 1,
            mode_state: mode.initial_state(),
        }
    }

    pub fn allocate_id(&mut self) -> TargetId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// How many targets the spawn ticker may keep alive right now.
    pub fn spawn_cap(&self, config: &ModeConfig) -> usize {
        if self.mode.policy().config_cap && config.target_cap == TargetCap::Single {
            1
        } else {
            self.max_concurrent
        }
    }

    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn target_mut(&mut self, id: TargetId) -> Option<&mut Target> {
        self.targets.iter_mut().find(|t| t.id == id)
    }

    pub fn remove_target(&mut self, id: TargetId) -> Option<Target> {
        let idx = self.targets.iter().position(|t| t.id == id)?;
        Some(self.targets.remove(idx))
    }

    pub fn reaction_samples(&self) -> Option<&ReactionSamples> {
        match &self.mode_state {
            ModeState::Reaction(r) => Some(&r.samples),
            _ => None,
        }
    }

    pub fn recoil(&self) -> Option<&RecoilState> {
        match &self.mode_state {
            ModeState::Spray(r) => Some(r),
            _ => None,
        }
    }

    fn summary(&self) -> Summary {
        Summary {
            mode: self.mode,
            tally: self.tally,
            elapsed_secs: self.elapsed_secs,
            reaction_average_ms: self.reaction_samples().and_then(|s| s.average()),
        }
    }
}

/// The engine: configuration, measured viewport, the running session (if any), its
/// timers and its random source.
#[derive(Debug)]
pub struct Session {
    pub(crate) config: ModeConfig,
    pub(crate) viewport: Viewport,
    pub(crate) state: Option<SessionState>,
    pub(crate) scheduler: Scheduler,
    pub(crate) rng: StdRng,
    last_summary: Option<Summary>,
}

impl Session {
    pub fn new(config: ModeConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// A session whose every random choice is reproducible.
    pub fn with_seed(config: ModeConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ModeConfig, rng: StdRng) -> Self {
        Self {
            config: config.sanitized(),
            viewport: Viewport::default(),
            state: None,
            scheduler: Scheduler::new(),
            rng,
            last_summary: None,
        }
    }

    /// Start a fresh session in `mode`, tearing down whatever was running.
    pub fn start(&mut self, mode: Mode, now: Millis) {
        self.finish(now);

        info!("starting {} session", mode);
        self.state = Some(SessionState::new(mode));
        self.scheduler.arm_every(TimerSlot::Clock, CLOCK_PERIOD_MS);

        match mode.policy().spawn {
            SpawnPolicy::Periodic => {
                self.scheduler
                    .arm_every(TimerSlot::Spawn, self.config.spawn_speed.interval_ms());
                self.scheduler
                    .arm_every(TimerSlot::Escalation, ESCALATION_PERIOD_MS);
                self.bootstrap();
            }
            SpawnPolicy::Pattern => self.materialize_pattern(),
            SpawnPolicy::Reaction => {
                let delay = random_delay(&mut self.rng, FIRST_REACTION_DELAY_MS);
                self.scheduler.arm_once(TimerSlot::Spawn, delay, None);
            }
        }
    }

    /// Return to the dashboard. Returns the summary of the session that was running.
    pub fn stop(&mut self, now: Millis) -> Option<Summary> {
        self.finish(now)
    }

    fn finish(&mut self, now: Millis) -> Option<Summary> {
        self.advance(now);
        self.scheduler.teardown();
        let state = self.state.take()?;
        let summary = state.summary();
        info!(
            "{} session ended: score {} hits {} misses {} after {}s",
            summary.mode,
            summary.tally.score,
            summary.tally.hits,
            summary.tally.misses,
            summary.elapsed_secs
        );
        self.last_summary = Some(summary.clone());
        Some(summary)
    }

    /// Fire every timer due at or before `now`, in order.
    pub fn advance(&mut self, now: Millis) {
        while let Some(fired) = self.scheduler.pop_due(now) {
            self.on_timer(fired);
        }
        self.scheduler.catch_up(now);
    }

    pub fn set_viewport(&mut self, viewport: Viewport, now: Millis) {
        self.advance(now);
        let resized = self.viewport != viewport;
        if resized {
            debug!("viewport {}x{}", viewport.width, viewport.height);
        }
        self.viewport = viewport;
        if resized && self.mode() == Some(Mode::Grid) {
            self.reseat_grid();
        }

        let Some(mode) = self.mode() else {
            return;
        };
        match mode.policy().spawn {
            SpawnPolicy::Periodic => self.bootstrap(),
            SpawnPolicy::Pattern => self.materialize_pattern(),
            SpawnPolicy::Reaction => {}
        }
    }

    pub fn set_config(&mut self, config: ModeConfig, now: Millis) {
        self.advance(now);
        let previous = self.config;
        self.config = config.sanitized();

        let periodic = self
            .mode()
            .is_some_and(|m| m.policy().spawn == SpawnPolicy::Periodic);
        if periodic && previous.spawn_speed != self.config.spawn_speed {
            self.scheduler
                .arm_every(TimerSlot::Spawn, self.config.spawn_speed.interval_ms());
        }
        if self.mode() == Some(Mode::Grid) && previous.grid_size != self.config.grid_size {
            self.reseat_grid();
        }
    }

    /// Old targets no longer line up with the cells once the grid changes shape, so they
    /// are dropped and the same number respawned into distinct free cells.
    fn reseat_grid(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let count = state.targets.len();
        state.targets.clear();
        for _ in 0..count {
            if self.fill_to_cap().is_none() {
                break;
            }
        }
        debug!("reseated {count} grid targets");
    }

    fn on_timer(&mut self, fired: Fired) {
        if fired.epoch != self.scheduler.epoch() {
            return;
        }
        let Some(mode) = self.mode() else {
            return;
        };
        trace!("{:?} fired at {}ms", fired.slot, fired.due);

        match fired.slot {
            TimerSlot::Clock => {
                if let Some(state) = self.state.as_mut() {
                    state.elapsed_secs += 1;
                }
            }
            TimerSlot::Escalation => {
                if let Some(state) = self.state.as_mut() {
                    state.max_concurrent = (state.max_concurrent + 1).min(MAX_CONCURRENT_CEILING);
                }
            }
            TimerSlot::Spawn => match mode.policy().spawn {
                SpawnPolicy::Periodic => {
                    self.fill_to_cap();
                }
                SpawnPolicy::Reaction => self.spawn_reaction_target(),
                SpawnPolicy::Pattern => {}
            },
            TimerSlot::Disappear => {
                if let Some(id) = fired.target {
                    self.expire_reaction_target(id);
                }
            }
            TimerSlot::HitRemoval(id) => self.resolve_deferred_hit(id),
        }
    }

    /// Spawn one target if the session is under its cap.
    pub(crate) fn fill_to_cap(&mut self) -> Option<TargetId> {
        let state = self.state.as_mut()?;
        if state.targets.len() >= state.spawn_cap(&self.config) {
            return None;
        }
        let spawned = spawner::spawn(state, self.viewport, &self.config, &mut self.rng);
        if spawned.is_none() {
            debug!("no room to spawn in {}", state.mode);
        }
        spawned
    }

    fn bootstrap(&mut self) {
        if self.state.as_ref().is_some_and(|s| s.targets.is_empty()) {
            self.fill_to_cap();
        }
    }

    fn materialize_pattern(&mut self) {
        if self.viewport.is_unmeasured() {
            return;
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let ModeState::Spray(recoil) = &mut state.mode_state else {
            return;
        };
        if recoil.pattern.is_some() {
            return;
        }

        let pattern = RecoilPattern::generate(self.viewport);
        state.targets = spawner::materialize_pattern(&pattern);
        state.next_id = state.targets.len() as TargetId;
        recoil.pattern = Some(pattern);
        recoil.index = 0;
        debug!("materialized {} spray targets", state.targets.len());
    }

    fn spawn_reaction_target(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if !state.targets.is_empty() {
            return;
        }

        match spawner::spawn(state, self.viewport, &self.config, &mut self.rng) {
            Some(id) => {
                if let ModeState::Reaction(reaction) = &mut state.mode_state {
                    reaction.spawned_at = Some(self.scheduler.now());
                }
                self.scheduler
                    .arm_once(TimerSlot::Disappear, DISAPPEAR_AFTER_MS, Some(id));
            }
            None => {
                debug!("reaction spawn deferred");
                let delay = random_delay(&mut self.rng, NEXT_REACTION_DELAY_MS);
                self.scheduler.arm_once(TimerSlot::Spawn, delay, None);
            }
        }
    }

    fn expire_reaction_target(&mut self, id: TargetId) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.remove_target(id).is_none() {
            return;
        }

        debug!("reaction target {} expired", id);
        state.tally.miss();
        if let ModeState::Reaction(reaction) = &mut state.mode_state {
            reaction.spawned_at = None;
        }
        let delay = random_delay(&mut self.rng, NEXT_REACTION_DELAY_MS);
        self.scheduler.arm_once(TimerSlot::Spawn, delay, None);
    }

    fn resolve_deferred_hit(&mut self, id: TargetId) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if !state.target(id).is_some_and(|t| t.hit) {
            return;
        }
        state.remove_target(id);
        state.tally.hit(HIT_POINTS);
        self.fill_to_cap();
    }

    pub fn mode(&self) -> Option<Mode> {
        self.state.as_ref().map(|s| s.mode)
    }

    pub fn is_running(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    pub fn targets(&self) -> &[Target] {
        self.state.as_ref().map_or(&[], |s| s.targets.as_slice())
    }

    pub fn tally(&self) -> Tally {
        self.state.as_ref().map(|s| s.tally).unwrap_or_default()
    }

    pub fn score(&self) -> u64 {
        self.tally().score
    }

    pub fn hits(&self) -> u32 {
        self.tally().hits
    }

    pub fn misses(&self) -> u32 {
        self.tally().misses
    }

    pub fn accuracy(&self) -> f64 {
        self.tally().accuracy()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.state.as_ref().map_or(0, |s| s.elapsed_secs)
    }

    pub fn max_concurrent(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.max_concurrent)
    }

    pub fn config(&self) -> &ModeConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Spawn rectangle of the running mode; zero-area on the dashboard.
    pub fn spawn_region(&self) -> Region {
        match self.mode() {
            Some(mode) => spawn_region(self.viewport, mode, self.config.area_percent),
            None => Region::default(),
        }
    }

    pub fn grid_cells(&self) -> Vec<Region> {
        match self.mode() {
            Some(Mode::Grid) => grid_cells(self.viewport, self.config.grid_size),
            _ => Vec::new(),
        }
    }

    pub fn spray_index(&self) -> Option<usize> {
        self.state.as_ref()?.recoil().map(|r| r.index)
    }

    pub fn recoil_pattern(&self) -> Option<&RecoilPattern> {
        self.state.as_ref()?.recoil()?.pattern.as_ref()
    }

    pub fn reaction_samples(&self) -> Option<&ReactionSamples> {
        self.state.as_ref()?.reaction_samples()
    }

    pub fn last_summary(&self) -> Option<&Summary> {
        self.last_summary.as_ref()
    }

    /// Number of armed timers.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    pub fn is_timer_armed(&self, slot: TimerSlot) -> bool {
        self.scheduler.is_armed(slot)
    }

    pub fn timer_due(&self, slot: TimerSlot) -> Option<Millis> {
        self.scheduler.due_at(slot)
    }

    /// Targets a pointer can currently land on. In spray mode only the active shot.
    fn clickable(&self) -> impl Iterator<Item = &Target> + '_ {
        let active = self.spray_index().map(|i| i as TargetId);
        self.targets()
            .iter()
            .rev()
            .filter(move |t| active.map_or(true, |id| t.id == id))
    }

    /// Topmost clickable target whose circle contains `point`.
    pub fn target_at(&self, point: Point) -> Option<TargetId> {
        self.clickable().find(|t| t.contains(point)).map(|t| t.id)
    }

    /// Topmost clickable target whose box overlaps `area`, for coarse pointers.
    pub fn target_within(&self, area: Region) -> Option<TargetId> {
        self.clickable()
            .find(|t| t.bounds().intersects(&area))
            .map(|t| t.id)
    }
}

fn random_delay(rng: &mut StdRng, (lo, hi): (Millis, Millis)) -> Millis {
    rng.gen_range(lo..=hi)
}
