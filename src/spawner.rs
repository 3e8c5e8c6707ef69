use crate::config::ModeConfig;
use crate::geometry::{grid_cells, spawn_region, Region, Viewport};
use crate::mode::Placement;
use crate::recoil::RecoilPattern;
use crate::session::SessionState;
use crate::sizing::{sample_size, SPRAY_TARGET_SIZE};
use crate::target::{Target, TargetId};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

/// Try to place one new target for the session's mode.
///
/// Returns `None` without touching the session when the viewport is unmeasured, the
/// target cannot fit in the spawn area, the grid is full, or the mode does not spawn
/// one target at a time (spray).
pub fn spawn<R: Rng + ?Sized>(
    state: &mut SessionState,
    viewport: Viewport,
    config: &ModeConfig,
    rng: &mut R,
) -> Option<TargetId> {
    let mode = state.mode;
    let policy = mode.policy();

    let (x, y, size) = match policy.placement {
        Placement::Rect { padding } => {
            let region = spawn_region(viewport, mode, config.area_percent);
            if region.is_degenerate() {
                return None;
            }
            let size = sample_size(mode, config.target_size, rng);
            let (x, y) = place_in_rect(region, padding, size, rng)?;
            (x, y, size)
        }
        Placement::GridCell { padding } => {
            let cells = grid_cells(viewport, config.grid_size);
            let free = free_cells(&cells, &state.targets);
            let cell = **free.choose(rng)?;
            let size = sample_size(mode, config.target_size, rng).min(cell.width - 2.0 * padding);
            if size <= 0.0 {
                return None;
            }
            let c = cell.center();
            (c.x - size / 2.0, c.y - size / 2.0, size)
        }
        Placement::Pattern => return None,
    };

    let id = state.allocate_id();
    let mut target = Target::new(id, x, y, size);
    if policy.labeled {
        target.label = Some(random_letter(rng));
    }
    debug!(
        "spawned target {} at ({:.1}, {:.1}) size {:.1} in {}",
        id, x, y, size, mode
    );
    state.targets.push(target);
    Some(id)
}

/// Uniform top-left position for a `size` target inside `region` inset by `padding`.
///
/// `None` when the target plus padding does not fit.
pub fn place_in_rect<R: Rng + ?Sized>(
    region: Region,
    padding: f64,
    size: f64,
    rng: &mut R,
) -> Option<(f64, f64)> {
    let max_x = region.width - size - padding * 2.0;
    let max_y = region.height - size - padding * 2.0;
    if max_x <= 0.0 || max_y <= 0.0 {
        return None;
    }

    let x = region.x + padding + rng.gen::<f64>() * max_x;
    let y = region.y + padding + rng.gen::<f64>() * max_y;
    Some((x, y))
}

/// Cells that contain no live target's center.
pub fn free_cells<'a>(cells: &'a [Region], targets: &[Target]) -> Vec<&'a Region> {
    cells
        .iter()
        .filter(|cell| !targets.iter().any(|t| cell.contains(t.center())))
        .collect()
}

/// All targets of a recoil pattern at once; target `id` equals its shot index.
pub fn materialize_pattern(pattern: &RecoilPattern) -> Vec<Target> {
    let radius = SPRAY_TARGET_SIZE / 2.0;
    pattern
        .points()
        .enumerate()
        .map(|(i, p)| Target::new(i as TargetId, p.x - radius, p.y - radius, SPRAY_TARGET_SIZE))
        .collect()
}

fn random_letter<R: Rng + ?Sized>(rng: &mut R) -> char {
    char::from(b'A' + rng.gen_range(0..26u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetCap;
    use crate::mode::{Mode, FIELD_PADDING, GRID_CELL_PADDING, TIGHT_PADDING};
    use crate::sizing::TargetSize;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn running(mode: Mode) -> SessionState {
        SessionState::new(mode)
    }

    #[test]
    fn test_no_spawn_on_unmeasured_viewport() {
        let mut state = running(Mode::FreeAim);
        let mut rng = StdRng::seed_from_u64(1);
        let spawned = spawn(&mut state, Viewport::default(), &ModeConfig::default(), &mut rng);
        assert_eq!(spawned, None);
        assert!(state.targets.is_empty());
        assert_eq!(state.next_id, 0);
    }

    #[test]
    fn test_rect_spawns_respect_padding() {
        let vp = Viewport::new(1000.0, 800.0);
        let mut rng = StdRng::seed_from_u64(3);
        for (mode, padding) in [
            (Mode::FreeAim, FIELD_PADDING),
            (Mode::Intensive, TIGHT_PADDING),
            (Mode::Letter, FIELD_PADDING),
        ] {
            let config = ModeConfig {
                area_percent: 60,
                ..ModeConfig::default()
            };
            let region = spawn_region(vp, mode, config.area_percent);
            let mut state = running(mode);
            for _ in 0..200 {
                spawn(&mut state, vp, &config, &mut rng);
            }
            assert_eq!(state.targets.len(), 200, "{mode}");
            for t in &state.targets {
                assert!(t.x >= region.x + padding);
                assert!(t.y >= region.y + padding);
                assert!(t.x + t.size <= region.right() - padding);
                assert!(t.y + t.size <= region.bottom() - padding);
            }
        }
    }

    #[test]
    fn test_too_small_area_is_silent_noop() {
        let vp = Viewport::new(200.0, 200.0);
        let config = ModeConfig {
            area_percent: 20,
            target_size: TargetSize::Large,
            ..ModeConfig::default()
        };
        let mut state = running(Mode::FreeAim);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(spawn(&mut state, vp, &config, &mut rng), None);
        assert!(state.targets.is_empty());
    }

    #[test]
    fn test_ids_strictly_increase() {
        let vp = Viewport::new(1000.0, 800.0);
        let mut state = running(Mode::FreeAim);
        let mut rng = StdRng::seed_from_u64(9);
        let ids: Vec<TargetId> = (0..10)
            .filter_map(|_| spawn(&mut state, vp, &ModeConfig::default(), &mut rng))
            .collect();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_grid_fills_every_cell_once() {
        let vp = Viewport::new(1000.0, 800.0);
        let config = ModeConfig {
            grid_size: 4,
            ..ModeConfig::default()
        };
        let cells = grid_cells(vp, 4);
        let mut state = running(Mode::Grid);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..16 {
            assert!(spawn(&mut state, vp, &config, &mut rng).is_some());
        }
        assert_eq!(spawn(&mut state, vp, &config, &mut rng), None);
        assert!(free_cells(&cells, &state.targets).is_empty());

        for cell in &cells {
            let inside: Vec<&Target> = state
                .targets
                .iter()
                .filter(|t| cell.contains(t.center()))
                .collect();
            assert_eq!(inside.len(), 1);
            let t = inside[0];
            assert!(t.x >= cell.x + GRID_CELL_PADDING - 1e-9);
            assert!(t.x + t.size <= cell.right() - GRID_CELL_PADDING + 1e-9);
        }
    }

    #[test]
    fn test_grid_size_clamped_to_cell() {
        let vp = Viewport::new(1000.0, 800.0);
        let config = ModeConfig {
            grid_size: 8,
            target_size: TargetSize::Large,
            ..ModeConfig::default()
        };
        let mut state = running(Mode::Grid);
        let mut rng = StdRng::seed_from_u64(2);
        spawn(&mut state, vp, &config, &mut rng).unwrap();
        assert!(state.targets[0].size <= 50.0 - 2.0 * GRID_CELL_PADDING);
    }

    #[test]
    fn test_letter_targets_are_labeled() {
        let vp = Viewport::new(1000.0, 800.0);
        let config = ModeConfig {
            target_cap: TargetCap::Single,
            ..ModeConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(4);

        let mut letters = running(Mode::LetterFugitive);
        spawn(&mut letters, vp, &config, &mut rng).unwrap();
        let label = letters.targets[0].label.unwrap();
        assert!(label.is_ascii_uppercase());

        let mut plain = running(Mode::FreeAim);
        spawn(&mut plain, vp, &config, &mut rng).unwrap();
        assert_eq!(plain.targets[0].label, None);
    }

    #[test]
    fn test_spray_never_spawns_singly() {
        let mut state = running(Mode::Spray);
        let mut rng = StdRng::seed_from_u64(1);
        let vp = Viewport::new(1200.0, 900.0);
        assert_eq!(spawn(&mut state, vp, &ModeConfig::default(), &mut rng), None);
    }

    #[test]
    fn test_materialize_pattern() {
        let pattern = RecoilPattern::generate(Viewport::new(1200.0, 900.0));
        let targets = materialize_pattern(&pattern);
        assert_eq!(targets.len(), 30);
        assert_eq!(targets[0].id, 0);
        assert_eq!((targets[0].x, targets[0].y), (596.0, 446.0));
        assert!(targets.iter().enumerate().all(|(i, t)| t.id == i as u64));
    }
}
