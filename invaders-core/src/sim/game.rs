use super::*;

#[derive(Clone)]
pub(super) struct Game {
    config: GameConfig,
    status: GameStatus,
    tick_index: u32,
    grid: Grid,
    shooter: Shooter,
    enemies: Vec<Enemy>,
    hazards: Vec<Hazard>,
    projectiles: Vec<Projectile>,
    prune_mask: u8,
    rng: SeededRng,
}

const PRUNE_ENEMIES: u8 = 1 << 0;
const PRUNE_HAZARDS: u8 = 1 << 1;
const PRUNE_PROJECTILES: u8 = 1 << 2;

impl Game {
    pub(super) fn new(config: GameConfig, seed: u32) -> Self {
        debug_assert!(config.validate().is_ok());

        let mut rng = SeededRng::new(seed);
        let mut grid = Grid::new(config.height, config.width);

        let shooter = Shooter {
            row: config.height - 1,
            col: config.width / 2,
            can_fire: true,
        };
        grid.add(shooter.row, shooter.col, EntityKind::Shooter);

        let slot_count = usize::from(config.enemy_slot_count());
        let picks = sample_distinct(
            &mut rng,
            slot_count,
            usize::from(config.enemy_count).min(slot_count),
        );
        let mut enemies = Vec::with_capacity(picks.len());
        for slot in picks {
            let (row, col) = enemy_slot_position(slot as i32);
            grid.add(row, col, EntityKind::Enemy);
            enemies.push(Enemy {
                row,
                col,
                alive: true,
            });
        }

        Self {
            config,
            status: GameStatus::Active,
            tick_index: 0,
            grid,
            shooter,
            enemies,
            hazards: Vec::new(),
            projectiles: Vec::new(),
            prune_mask: 0,
            rng,
        }
    }

    /// Rebuild a playable state from a snapshot, including the generator
    /// position. Stepping the rebuilt game and the original game produces
    /// identical snapshots.
    pub(super) fn from_snapshot(snapshot: &WorldSnapshot) -> Self {
        let config = snapshot.config();
        let mut grid = Grid::new(config.height, config.width);

        let shooter = Shooter {
            row: snapshot.shooter.row,
            col: snapshot.shooter.col,
            can_fire: snapshot.shooter.can_fire,
        };
        grid.add(shooter.row, shooter.col, EntityKind::Shooter);

        let enemies: Vec<Enemy> = snapshot
            .enemies
            .iter()
            .map(|entry| Enemy {
                row: entry.row,
                col: entry.col,
                alive: true,
            })
            .collect();
        for enemy in &enemies {
            grid.add(enemy.row, enemy.col, EntityKind::Enemy);
        }

        let hazards: Vec<Hazard> = snapshot
            .hazards
            .iter()
            .map(|entry| Hazard {
                row: entry.row,
                col: entry.col,
                alive: true,
            })
            .collect();
        for hazard in &hazards {
            grid.add(hazard.row, hazard.col, EntityKind::Hazard);
        }

        let projectiles: Vec<Projectile> = snapshot
            .projectiles
            .iter()
            .map(|entry| Projectile {
                row: entry.row,
                col: entry.col,
                alive: true,
            })
            .collect();
        for projectile in &projectiles {
            grid.add(projectile.row, projectile.col, EntityKind::Projectile);
        }

        Self {
            config,
            status: snapshot.status,
            tick_index: snapshot.tick_index,
            grid,
            shooter,
            enemies,
            hazards,
            projectiles,
            prune_mask: 0,
            rng: SeededRng::from_state(snapshot.rng_state),
        }
    }

    pub(super) fn status(&self) -> GameStatus {
        self.status
    }

    pub(super) fn tick_index(&self) -> u32 {
        self.tick_index
    }

    #[inline]
    pub(super) fn result(&self) -> ReplayResult {
        ReplayResult {
            status: self.status,
            tick_count: self.tick_index,
            final_rng_state: self.rng.state(),
        }
    }

    pub(super) fn shooter_col(&self) -> i32 {
        self.shooter.col
    }

    pub(super) fn shooter_can_fire(&self) -> bool {
        self.shooter.can_fire
    }

    pub(super) fn board_width(&self) -> i32 {
        self.config.width
    }

    pub(super) fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|entry| entry.alive).count()
    }

    pub(super) fn live_hazard_count(&self) -> usize {
        self.hazards.iter().filter(|entry| entry.alive).count()
    }

    pub(super) fn shooter_on_hazard(&self) -> bool {
        self.grid
            .cell(self.shooter.row, self.shooter.col)
            .contains(EntityKind::Hazard)
    }

    pub(super) fn enemies_in_column(&self, col: i32) -> usize {
        self.enemies
            .iter()
            .filter(|entry| entry.alive && entry.col == col)
            .count()
    }

    pub(super) fn projectiles_in_column(&self, col: i32) -> usize {
        self.projectiles
            .iter()
            .filter(|entry| entry.alive && entry.col == col)
            .count()
    }

    /// Advance one tick. Phase order is fixed: projectiles move and resolve
    /// hits, the shooter acts, hazards fall, loss is checked, enemies lay a
    /// volley on laying ticks, and the win condition is checked last. A
    /// terminal game ignores further actions.
    pub(super) fn step(&mut self, action: Action) {
        if self.status != GameStatus::Active {
            return;
        }

        self.advance_projectiles();
        self.apply_shooter_action(action);
        self.advance_hazards();

        if self.shooter_on_hazard() {
            self.status = GameStatus::Lost;
        } else {
            if self.tick_index % LAY_INTERVAL_TICKS == 0 {
                self.run_enemy_volley();
            }
            if self.live_enemy_count() == 0 {
                self.status = GameStatus::Won;
            }
        }

        self.prune_destroyed_entities();
        self.tick_index += 1;
    }

    /// Move every projectile up, then resolve same-cell hits. A projectile
    /// with an enemy directly above it climbs one row instead of two, so it
    /// lands on the enemy rather than passing through.
    pub(super) fn advance_projectiles(&mut self) {
        for i in 0..self.projectiles.len() {
            let projectile = self.projectiles[i];
            if !projectile.alive {
                continue;
            }

            let slowed = projectile.row >= 1
                && self
                    .grid
                    .cell(projectile.row - 1, projectile.col)
                    .contains(EntityKind::Enemy);
            let speed = if slowed {
                PROJECTILE_SLOWED_SPEED
            } else {
                PROJECTILE_SPEED
            };

            self.grid
                .remove(projectile.row, projectile.col, EntityKind::Projectile);
            let new_row = projectile.row - speed;
            if new_row < 0 {
                self.projectiles[i].alive = false;
                self.prune_mask |= PRUNE_PROJECTILES;
            } else {
                self.projectiles[i].row = new_row;
                self.grid.add(new_row, projectile.col, EntityKind::Projectile);
            }
        }

        for i in 0..self.projectiles.len() {
            if !self.projectiles[i].alive {
                continue;
            }
            let shot = Contact {
                row: self.projectiles[i].row,
                col: self.projectiles[i].col,
                kind: EntityKind::Projectile,
            };
            for j in 0..self.enemies.len() {
                let enemy = self.enemies[j];
                if !enemy.alive {
                    continue;
                }
                let target = Contact {
                    row: enemy.row,
                    col: enemy.col,
                    kind: EntityKind::Enemy,
                };
                if collide(shot, target) {
                    self.destroy_enemy(j);
                    self.destroy_projectile(i);
                    break;
                }
            }
        }
    }

    /// A move into a wall is a no-op but still re-arms the shooter. Shooting
    /// flips the charge flag whether or not a projectile came out.
    pub(super) fn apply_shooter_action(&mut self, action: Action) {
        match action {
            Action::Shoot => {
                if self.shooter.can_fire {
                    self.spawn_projectile(self.shooter.row - 1, self.shooter.col);
                }
                self.shooter.can_fire = !self.shooter.can_fire;
            }
            Action::MoveLeft => {
                if self.shooter.col > 0 {
                    self.move_shooter(-1);
                }
                self.shooter.can_fire = true;
            }
            Action::MoveRight => {
                if self.shooter.col < self.config.width - 1 {
                    self.move_shooter(1);
                }
                self.shooter.can_fire = true;
            }
            Action::Hold => {
                self.shooter.can_fire = true;
            }
        }
    }

    /// Hazards fall one row per tick. A hazard asked to advance while already
    /// on the bottom row breaks instead, before the loss check runs.
    pub(super) fn advance_hazards(&mut self) {
        for i in 0..self.hazards.len() {
            let hazard = self.hazards[i];
            if !hazard.alive {
                continue;
            }

            if hazard.row >= self.config.height - 1 {
                self.break_hazard(i);
            } else {
                self.grid.remove(hazard.row, hazard.col, EntityKind::Hazard);
                self.hazards[i].row += 1;
                self.grid.add(hazard.row + 1, hazard.col, EntityKind::Hazard);
            }
        }
    }

    /// On laying ticks, between one and three eligible enemies each drop a
    /// hazard into the cell directly below. An enemy with another enemy
    /// directly below it is covered and never lays. Skipped entirely, with
    /// no generator draws, when nothing is eligible.
    fn run_enemy_volley(&mut self) {
        let eligible: Vec<usize> = (0..self.enemies.len())
            .filter(|&i| {
                let enemy = self.enemies[i];
                enemy.alive
                    && !self
                        .grid
                        .cell(enemy.row + 1, enemy.col)
                        .contains(EntityKind::Enemy)
            })
            .collect();
        if eligible.is_empty() {
            return;
        }

        let cap = (eligible.len() as u32).min(MAX_HAZARDS_PER_VOLLEY) as i32;
        let count = self.rng.next_range(1, cap + 1) as usize;
        for pick in sample_distinct(&mut self.rng, eligible.len(), count) {
            let enemy = self.enemies[eligible[pick]];
            self.spawn_hazard(enemy.row + 1, enemy.col);
        }
    }

    pub(super) fn validate_invariants(&self) -> Result<(), RuleCode> {
        let height = self.config.height;
        let width = self.config.width;

        if self.shooter.row != height - 1 {
            return Err(RuleCode::ShooterRow);
        }
        if self.shooter.col < 0 || self.shooter.col >= width {
            return Err(RuleCode::ShooterBounds);
        }

        for enemy in self.enemies.iter().filter(|entry| entry.alive) {
            let in_band = enemy.row >= 0 && enemy.row < ENEMY_ROWS;
            if !in_band || enemy.col < 0 || enemy.col >= width {
                return Err(RuleCode::EnemyState);
            }
        }

        for hazard in self.hazards.iter().filter(|entry| entry.alive) {
            if hazard.row < 0 || hazard.row >= height || hazard.col < 0 || hazard.col >= width {
                return Err(RuleCode::HazardState);
            }
        }

        // Projectiles spawn one row above the shooter and only travel up.
        for projectile in self.projectiles.iter().filter(|entry| entry.alive) {
            let row_ok = projectile.row >= 0 && projectile.row < height - 1;
            if !row_ok || projectile.col < 0 || projectile.col >= width {
                return Err(RuleCode::ProjectileState);
            }
        }

        let mut expected = Grid::new(height, width);
        expected.add(self.shooter.row, self.shooter.col, EntityKind::Shooter);
        for enemy in self.enemies.iter().filter(|entry| entry.alive) {
            expected.add(enemy.row, enemy.col, EntityKind::Enemy);
        }
        for hazard in self.hazards.iter().filter(|entry| entry.alive) {
            expected.add(hazard.row, hazard.col, EntityKind::Hazard);
        }
        for projectile in self.projectiles.iter().filter(|entry| entry.alive) {
            expected.add(projectile.row, projectile.col, EntityKind::Projectile);
        }

        for row in 0..ENEMY_ROWS {
            for col in 0..width {
                if expected.cell(row, col).count(EntityKind::Enemy) > 1 {
                    return Err(RuleCode::EnemyState);
                }
            }
        }

        if expected != self.grid {
            return Err(RuleCode::GridOccupancyDesync);
        }

        let live_enemies = self.live_enemy_count();
        let status_consistent = match self.status {
            GameStatus::Won => live_enemies == 0,
            GameStatus::Active => live_enemies > 0,
            GameStatus::Lost => true,
        };
        if !status_consistent {
            return Err(RuleCode::StatusConsistency);
        }

        Ok(())
    }

    pub(super) fn world_snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick_index: self.tick_index,
            height: self.config.height,
            width: self.config.width,
            enemy_count: self.config.enemy_count,
            status: self.status,
            rng_state: self.rng.state(),
            shooter: ShooterSnapshot {
                row: self.shooter.row,
                col: self.shooter.col,
                can_fire: self.shooter.can_fire,
            },
            enemies: self
                .enemies
                .iter()
                .filter(|entry| entry.alive)
                .map(|entry| Self::enemy_snapshot(*entry))
                .collect(),
            hazards: self
                .hazards
                .iter()
                .filter(|entry| entry.alive)
                .map(|entry| Self::hazard_snapshot(*entry))
                .collect(),
            projectiles: self
                .projectiles
                .iter()
                .filter(|entry| entry.alive)
                .map(|entry| Self::projectile_snapshot(*entry))
                .collect(),
        }
    }

    #[inline]
    fn enemy_snapshot(enemy: Enemy) -> EnemySnapshot {
        EnemySnapshot {
            row: enemy.row,
            col: enemy.col,
        }
    }

    #[inline]
    fn hazard_snapshot(hazard: Hazard) -> HazardSnapshot {
        HazardSnapshot {
            row: hazard.row,
            col: hazard.col,
        }
    }

    #[inline]
    fn projectile_snapshot(projectile: Projectile) -> ProjectileSnapshot {
        ProjectileSnapshot {
            row: projectile.row,
            col: projectile.col,
        }
    }

    fn move_shooter(&mut self, delta: i32) {
        self.grid
            .remove(self.shooter.row, self.shooter.col, EntityKind::Shooter);
        self.shooter.col += delta;
        self.grid
            .add(self.shooter.row, self.shooter.col, EntityKind::Shooter);
    }

    fn spawn_projectile(&mut self, row: i32, col: i32) {
        self.grid.add(row, col, EntityKind::Projectile);
        self.projectiles.push(Projectile {
            row,
            col,
            alive: true,
        });
    }

    fn spawn_hazard(&mut self, row: i32, col: i32) {
        self.grid.add(row, col, EntityKind::Hazard);
        self.hazards.push(Hazard {
            row,
            col,
            alive: true,
        });
    }

    fn destroy_enemy(&mut self, index: usize) {
        let enemy = self.enemies[index];
        debug_assert!(enemy.alive);
        self.grid.remove(enemy.row, enemy.col, EntityKind::Enemy);
        self.enemies[index].alive = false;
        self.prune_mask |= PRUNE_ENEMIES;
    }

    fn destroy_projectile(&mut self, index: usize) {
        let projectile = self.projectiles[index];
        debug_assert!(projectile.alive);
        self.grid
            .remove(projectile.row, projectile.col, EntityKind::Projectile);
        self.projectiles[index].alive = false;
        self.prune_mask |= PRUNE_PROJECTILES;
    }

    fn break_hazard(&mut self, index: usize) {
        let hazard = self.hazards[index];
        debug_assert!(hazard.alive);
        self.grid.remove(hazard.row, hazard.col, EntityKind::Hazard);
        self.hazards[index].alive = false;
        self.prune_mask |= PRUNE_HAZARDS;
    }

    pub(super) fn prune_destroyed_entities(&mut self) {
        if self.prune_mask == 0 {
            return;
        }

        if (self.prune_mask & PRUNE_ENEMIES) != 0 {
            self.enemies.retain(|entry| entry.alive);
        }
        if (self.prune_mask & PRUNE_HAZARDS) != 0 {
            self.hazards.retain(|entry| entry.alive);
        }
        if (self.prune_mask & PRUNE_PROJECTILES) != 0 {
            self.projectiles.retain(|entry| entry.alive);
        }

        self.prune_mask = 0;
    }
}
