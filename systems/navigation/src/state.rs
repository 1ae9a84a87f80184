//! Per-agent navigation memory.

use burrow_core::{GridSize, Position, RotationSense};

/// Tracing context stamped onto every cell the agent stands on while it
/// follows an obstacle.
///
/// Two visits to the same cell under an equal signature mean the agent went
/// around a closed loop without the context changing. The epoch advances on
/// every full reset, so signatures written before a reset can never match
/// ones written after it and the table never needs clearing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    epoch: u32,
    obstacle: Option<Position>,
    sense: Option<RotationSense>,
}

impl Signature {
    /// Reset epoch the signature was taken in.
    #[must_use]
    pub const fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Obstacle cell being traced when the signature was taken.
    #[must_use]
    pub const fn obstacle(&self) -> Option<Position> {
        self.obstacle
    }

    /// Rotation sense in use when the signature was taken.
    #[must_use]
    pub const fn sense(&self) -> Option<RotationSense> {
        self.sense
    }
}

/// Dense per-cell signature table sized to the grid.
#[derive(Clone, Debug, Default)]
pub(crate) struct VisitTable {
    size: Option<GridSize>,
    cells: Vec<Option<Signature>>,
}

impl VisitTable {
    pub(crate) fn prepare(&mut self, size: GridSize) {
        if self.size != Some(size) {
            self.size = Some(size);
            self.cells = vec![None; size.cell_count()];
        }
    }

    /// Stores the signature for the cell and reports whether the cell
    /// already carried the very same one.
    pub(crate) fn revisit(&mut self, cell: Position, signature: Signature) -> bool {
        let Some(slot) = self
            .size
            .and_then(|size| size.index(cell))
            .and_then(|index| self.cells.get_mut(index))
        else {
            return false;
        };

        if *slot == Some(signature) {
            return true;
        }
        *slot = Some(signature);
        false
    }

    /// Stores the signature for the cell without comparing it.
    pub(crate) fn stamp(&mut self, cell: Position, signature: Signature) {
        let slot = self
            .size
            .and_then(|size| size.index(cell))
            .and_then(|index| self.cells.get_mut(index));
        if let Some(slot) = slot {
            *slot = Some(signature);
        }
    }

    pub(crate) fn get(&self, cell: Position) -> Option<Signature> {
        self.size
            .and_then(|size| size.index(cell))
            .and_then(|index| self.cells.get(index).copied().flatten())
    }
}

/// Cell cleared by the navigator that it has not stepped into yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ClearedCell {
    pub(crate) cell: Position,
    pub(crate) ticks_left: u32,
}

/// Navigation memory owned by exactly one agent.
///
/// `obstacle` is `Some` exactly while the agent follows an obstacle
/// boundary; `None` means greedy mode. `last_visited` is the cell whose
/// signature was compared most recently; ticks spent standing on it are not
/// revisits.
#[derive(Clone, Debug, Default)]
pub struct NavigationState {
    pub(crate) previous_target: Option<Position>,
    pub(crate) obstacle: Option<Position>,
    pub(crate) sense: Option<RotationSense>,
    pub(crate) best_distance: Option<u32>,
    pub(crate) best_location: Option<Position>,
    pub(crate) ticks_pressing: u32,
    pub(crate) pressed: Option<Position>,
    pub(crate) epoch: u32,
    pub(crate) sense_hint: Option<RotationSense>,
    pub(crate) cleared: Option<ClearedCell>,
    pub(crate) visits: VisitTable,
    pub(crate) last_visited: Option<Position>,
}

impl NavigationState {
    /// Location of the most recently accepted target.
    #[must_use]
    pub fn previous_target(&self) -> Option<Position> {
        self.previous_target
    }

    /// Obstacle cell currently traced, `None` in greedy mode.
    #[must_use]
    pub fn obstacle(&self) -> Option<Position> {
        self.obstacle
    }

    /// Wall-following sense, `None` until the first obstacle after a reset.
    #[must_use]
    pub fn rotation_sense(&self) -> Option<RotationSense> {
        self.sense
    }

    /// Smallest squared distance to the target seen since the last reset.
    #[must_use]
    pub fn best_distance(&self) -> Option<u32> {
        self.best_distance
    }

    /// Cell where [`Self::best_distance`] was achieved.
    #[must_use]
    pub fn best_location(&self) -> Option<Position> {
        self.best_location
    }

    /// Consecutive follow ticks spent against the same obstacle cell.
    #[must_use]
    pub fn ticks_pressing(&self) -> u32 {
        self.ticks_pressing
    }

    /// Number of full resets performed so far.
    #[must_use]
    pub fn reset_epoch(&self) -> u32 {
        self.epoch
    }

    /// Whether the agent is tracing an obstacle boundary.
    #[must_use]
    pub fn is_following(&self) -> bool {
        self.obstacle.is_some()
    }

    /// Signature of the current tracing context.
    #[must_use]
    pub fn signature(&self) -> Signature {
        Signature {
            epoch: self.epoch,
            obstacle: self.obstacle,
            sense: self.sense,
        }
    }

    /// Signature last stored for the cell, if any.
    #[must_use]
    pub fn visit_signature(&self, cell: Position) -> Option<Signature> {
        self.visits.get(cell)
    }

    pub(crate) fn full_reset(&mut self) {
        self.obstacle = None;
        self.sense = None;
        self.best_distance = None;
        self.best_location = None;
        self.ticks_pressing = 0;
        self.pressed = None;
        self.sense_hint = None;
        self.cleared = None;
        self.last_visited = None;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Compares the current signature against the one stored for the cell,
    /// once per arrival. Returns whether the agent came back to the cell
    /// under an unchanged tracing context.
    pub(crate) fn visit(&mut self, cell: Position) -> bool {
        if self.last_visited == Some(cell) {
            return false;
        }
        self.last_visited = Some(cell);
        let signature = self.signature();
        self.visits.revisit(cell, signature)
    }

    /// Overwrites the cell's signature with the current one.
    pub(crate) fn stamp(&mut self, cell: Position) {
        self.last_visited = Some(cell);
        let signature = self.signature();
        self.visits.stamp(cell, signature);
    }

    /// Rebases progress onto a nearby target, measuring from the best cell
    /// reached so far rather than from wherever the agent stands now.
    pub(crate) fn soft_reset(&mut self, target: Position) -> Option<u32> {
        let location = self.best_location?;
        let distance = location.distance_squared(target);
        self.best_distance = Some(distance);
        Some(distance)
    }

    pub(crate) fn record_progress(&mut self, position: Position, target: Position) {
        let distance = position.distance_squared(target);
        if self.best_distance.map_or(true, |best| distance < best) {
            self.best_distance = Some(distance);
            self.best_location = Some(position);
        }
    }

    pub(crate) fn begin_follow(&mut self, obstacle: Position, sense: RotationSense) {
        self.obstacle = Some(obstacle);
        self.sense = Some(sense);
        self.ticks_pressing = 0;
        self.pressed = None;
    }

    pub(crate) fn end_follow(&mut self) {
        self.obstacle = None;
        self.ticks_pressing = 0;
        self.pressed = None;
    }

    pub(crate) fn note_obstacle(&mut self, obstacle: Position, sense: RotationSense) {
        if self.pressed == Some(obstacle) {
            self.ticks_pressing = self.ticks_pressing.saturating_add(1);
        } else {
            self.ticks_pressing = 0;
            self.pressed = Some(obstacle);
        }
        self.obstacle = Some(obstacle);
        self.sense = Some(sense);
    }
}
