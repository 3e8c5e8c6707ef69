use crate::geometry::{Point, Region};
use crate::mode::{HitPolicy, MissPolicy, ModeState};
use crate::scheduler::{Millis, TimerSlot, NEXT_REACTION_DELAY_MS};
use crate::scoring::{HIT_POINTS, SPRAY_COMPLETION_POINTS};
use crate::session::Session;
use crate::target::{Target, TargetId};
use log::debug;
use rand::Rng;
use std::f64::consts::TAU;

/// What a click did to the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// Scored immediately.
    Hit { id: TargetId, points: u64 },
    /// Marked as hit; scored when its removal timer fires.
    Pending { id: TargetId },
    Miss,
    /// Nothing changed: no session, no targets, or a stale target.
    Ignored,
}

impl ClickOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, ClickOutcome::Hit { .. } | ClickOutcome::Pending { .. })
    }
}

impl Session {
    /// Resolve a click at `point`. `target` is the target the pointer landed on, if
    /// any; pass `None` for empty space.
    pub fn click(&mut self, now: Millis, point: Point, target: Option<TargetId>) -> ClickOutcome {
        self.advance(now);
        let Some(mode) = self.mode() else {
            return ClickOutcome::Ignored;
        };
        let policy = mode.policy();

        let outcome = match (policy.hit, target) {
            (HitPolicy::PatternStep, target) => self.spray_click(target),
            (hit, Some(id)) => self.hit(hit, id, now),
            (_, None) => self.miss(policy.miss, point),
        };
        debug!("click at ({:.0}, {:.0}) in {}: {:?}", point.x, point.y, mode, outcome);
        outcome
    }

    fn hit(&mut self, policy: HitPolicy, id: TargetId, now: Millis) -> ClickOutcome {
        let Some(state) = self.state.as_mut() else {
            return ClickOutcome::Ignored;
        };

        match policy {
            HitPolicy::Backfill => {
                if state.remove_target(id).is_none() {
                    return ClickOutcome::Ignored;
                }
                state.tally.hit(HIT_POINTS);
                self.fill_to_cap();
                ClickOutcome::Hit {
                    id,
                    points: HIT_POINTS,
                }
            }
            HitPolicy::Deferred { delay_ms } => {
                let Some(target) = state.target_mut(id) else {
                    return ClickOutcome::Ignored;
                };
                if target.hit {
                    return ClickOutcome::Ignored;
                }
                target.hit = true;
                self.scheduler
                    .arm_once(TimerSlot::HitRemoval(id), delay_ms, Some(id));
                ClickOutcome::Pending { id }
            }
            HitPolicy::Reaction => {
                if state.remove_target(id).is_none() {
                    return ClickOutcome::Ignored;
                }
                if let ModeState::Reaction(reaction) = &mut state.mode_state {
                    let shown_at = reaction.spawned_at.take().unwrap_or(now);
                    reaction.samples.record(now.saturating_sub(shown_at));
                }
                state.tally.hit(HIT_POINTS);

                self.scheduler.cancel(TimerSlot::Disappear);
                let (lo, hi) = NEXT_REACTION_DELAY_MS;
                let delay = self.rng.gen_range(lo..=hi);
                self.scheduler.arm_once(TimerSlot::Spawn, delay, None);
                ClickOutcome::Hit {
                    id,
                    points: HIT_POINTS,
                }
            }
            HitPolicy::PatternStep => ClickOutcome::Ignored,
        }
    }

    /// Spray mode: only the target at the current shot index counts.
    fn spray_click(&mut self, target: Option<TargetId>) -> ClickOutcome {
        let Some(state) = self.state.as_mut() else {
            return ClickOutcome::Ignored;
        };
        let ModeState::Spray(recoil) = &mut state.mode_state else {
            return ClickOutcome::Ignored;
        };
        let Some(len) = recoil.pattern.as_ref().map(|p| p.len()) else {
            return ClickOutcome::Ignored;
        };

        match target {
            Some(id) if id == recoil.index as TargetId => {
                let next = recoil.index + 1;
                let points = if next >= len {
                    recoil.index = 0;
                    SPRAY_COMPLETION_POINTS
                } else {
                    recoil.index = next;
                    HIT_POINTS
                };
                state.tally.hit(points);
                ClickOutcome::Hit { id, points }
            }
            _ => {
                state.tally.miss();
                ClickOutcome::Miss
            }
        }
    }

    fn miss(&mut self, policy: MissPolicy, point: Point) -> ClickOutcome {
        let region = self.spawn_region();
        let Some(state) = self.state.as_mut() else {
            return ClickOutcome::Ignored;
        };
        if state.targets.is_empty() {
            return ClickOutcome::Ignored;
        }
        state.tally.miss();

        if let MissPolicy::Repel { radius, distance } = policy {
            let rng = &mut self.rng;
            for target in state.targets.iter_mut().filter(|t| !t.hit) {
                repel(target, point, radius, distance, region, || rng.gen::<f64>() * TAU);
            }
        }
        ClickOutcome::Miss
    }
}

/// Push `target` `distance` px directly away from `click` if its center is within
/// `radius`, keeping it inside `region`. A click dead on the center picks a direction
/// with `angle`.
pub fn repel(
    target: &mut Target,
    click: Point,
    radius: f64,
    distance: f64,
    region: Region,
    angle: impl FnOnce() -> f64,
) -> bool {
    let center = target.center();
    let dist = center.distance(click);
    if dist > radius {
        return false;
    }

    let (dx, dy) = if dist > 0.0 {
        ((center.x - click.x) / dist, (center.y - click.y) / dist)
    } else {
        let a = angle();
        (a.cos(), a.sin())
    };

    target.x = clamp_into(target.x + dx * distance, region.x, region.right() - target.size);
    target.y = clamp_into(target.y + dy * distance, region.y, region.bottom() - target.size);
    true
}

fn clamp_into(v: f64, lo: f64, hi: f64) -> f64 {
    if hi < lo {
        lo
    } else {
        v.clamp(lo, hi)
    }
}
