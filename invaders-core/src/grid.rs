//! Occupancy grid.
//!
//! Each cell tracks a per-kind count of the entities standing on it, so
//! stacked entities (two hazards in one cell, a projectile passing through
//! an enemy) stay distinguishable. The legacy additive encoding, where a
//! cell's value is the sum of entity tags, is derived on demand for export;
//! it is ambiguous (enemy + shooter + hazard = 7 = projectile) and is never
//! used to make rule decisions.

use crate::constants::{TAG_ENEMY, TAG_HAZARD, TAG_PROJECTILE, TAG_SHOOTER};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Enemy,
    Shooter,
    Hazard,
    Projectile,
}

impl EntityKind {
    pub fn legacy_tag(self) -> i32 {
        match self {
            Self::Enemy => TAG_ENEMY,
            Self::Shooter => TAG_SHOOTER,
            Self::Hazard => TAG_HAZARD,
            Self::Projectile => TAG_PROJECTILE,
        }
    }
}

/// Position and kind of one entity, the unit of collision checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    pub row: i32,
    pub col: i32,
    pub kind: EntityKind,
}

/// Same-cell contact between different kinds. Entities of one kind pass
/// through each other.
#[inline]
pub fn collide(a: Contact, b: Contact) -> bool {
    a.kind != b.kind && a.row == b.row && a.col == b.col
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    enemies: u8,
    shooters: u8,
    hazards: u8,
    projectiles: u8,
}

impl Cell {
    pub fn count(&self, kind: EntityKind) -> u8 {
        match kind {
            EntityKind::Enemy => self.enemies,
            EntityKind::Shooter => self.shooters,
            EntityKind::Hazard => self.hazards,
            EntityKind::Projectile => self.projectiles,
        }
    }

    pub fn contains(&self, kind: EntityKind) -> bool {
        self.count(kind) > 0
    }

    pub fn is_empty(&self) -> bool {
        self.enemies == 0 && self.shooters == 0 && self.hazards == 0 && self.projectiles == 0
    }

    pub fn legacy_value(&self) -> i32 {
        i32::from(self.enemies) * TAG_ENEMY
            + i32::from(self.shooters) * TAG_SHOOTER
            + i32::from(self.hazards) * TAG_HAZARD
            + i32::from(self.projectiles) * TAG_PROJECTILE
    }

    fn slot(&mut self, kind: EntityKind) -> &mut u8 {
        match kind {
            EntityKind::Enemy => &mut self.enemies,
            EntityKind::Shooter => &mut self.shooters,
            EntityKind::Hazard => &mut self.hazards,
            EntityKind::Projectile => &mut self.projectiles,
        }
    }

    fn add(&mut self, kind: EntityKind) {
        let slot = self.slot(kind);
        *slot = slot.checked_add(1).unwrap_or(u8::MAX);
    }

    fn remove(&mut self, kind: EntityKind) {
        let slot = self.slot(kind);
        debug_assert!(*slot > 0, "removing {kind:?} from an empty cell");
        *slot = slot.saturating_sub(1);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    height: i32,
    width: i32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(height: i32, width: i32) -> Self {
        debug_assert!(height > 0 && width > 0);
        Self {
            height,
            width,
            cells: vec![Cell::default(); (height * width) as usize],
        }
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        row >= 0 && row < self.height && col >= 0 && col < self.width
    }

    fn index(&self, row: i32, col: i32) -> usize {
        debug_assert!(self.in_bounds(row, col), "cell ({row}, {col}) out of bounds");
        (row * self.width + col) as usize
    }

    pub fn cell(&self, row: i32, col: i32) -> Cell {
        self.cells[self.index(row, col)]
    }

    pub fn add(&mut self, row: i32, col: i32, kind: EntityKind) {
        let idx = self.index(row, col);
        self.cells[idx].add(kind);
    }

    pub fn remove(&mut self, row: i32, col: i32, kind: EntityKind) {
        let idx = self.index(row, col);
        self.cells[idx].remove(kind);
    }

    /// Row-major legacy matrix, one additive tag sum per cell.
    pub fn legacy_cells(&self) -> Vec<i32> {
        self.cells.iter().map(Cell::legacy_value).collect()
    }
}
