use rand::Rng;

use crate::{
    InvalidScenarioError,
    core::{Board, GRID_HEIGHT, GRID_WIDTH, MINE_COUNT, MineLayout, Position},
};

/// Chebyshev radius of the mine-free zone around the start cell.
pub const SAFE_ZONE_RADIUS: usize = 1;

/// One fixed, reproducible Minesweeper instance.
///
/// A scenario never changes once created: every individual evaluated on it sees
/// exactly the same mines and the same start cell.
///
/// # Invariants
///
/// - The start cell is on the board
/// - The layout holds exactly [`MINE_COUNT`] mines
/// - No mine lies within [`SAFE_ZONE_RADIUS`] of the start cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    start: Position,
    mines: MineLayout,
}

impl Scenario {
    /// Creates a scenario after checking its invariants.
    pub fn new(start: Position, mines: MineLayout) -> Result<Self, InvalidScenarioError> {
        if !start.is_in_bounds() {
            return Err(InvalidScenarioError::StartOutOfBounds {
                x: i64::try_from(start.x).unwrap_or(i64::MAX),
                y: i64::try_from(start.y).unwrap_or(i64::MAX),
            });
        }
        let actual = mines.mine_count();
        if actual != MINE_COUNT {
            return Err(InvalidScenarioError::MineCount {
                expected: MINE_COUNT,
                actual,
            });
        }
        if let Some(pos) = mines
            .mine_positions()
            .find(|pos| pos.chebyshev_distance(start) <= SAFE_ZONE_RADIUS)
        {
            return Err(InvalidScenarioError::MineInSafeZone { x: pos.x, y: pos.y });
        }
        Ok(Self { start, mines })
    }

    /// Generates a random scenario.
    ///
    /// The start cell is uniform over the board. Mines are then placed uniformly
    /// at random outside the safe zone, rejecting occupied or safe-zone cells,
    /// until [`MINE_COUNT`] mines are placed.
    pub fn generate<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let start = Position::new(
            rng.random_range(0..GRID_WIDTH),
            rng.random_range(0..GRID_HEIGHT),
        );
        let mut mines = MineLayout::EMPTY;
        let mut placed = 0;
        while placed < MINE_COUNT {
            let pos = Position::new(
                rng.random_range(0..GRID_WIDTH),
                rng.random_range(0..GRID_HEIGHT),
            );
            if mines.is_mine(pos) || pos.chebyshev_distance(start) <= SAFE_ZONE_RADIUS {
                continue;
            }
            mines.set_mine(pos);
            placed += 1;
        }
        Self { start, mines }
    }

    #[must_use]
    pub const fn start(&self) -> Position {
        self.start
    }

    #[must_use]
    pub const fn mines(&self) -> &MineLayout {
        &self.mines
    }

    /// Creates a fresh board for this scenario, with every cell hidden.
    ///
    /// The start cell is not revealed; players do that as their first move.
    #[must_use]
    pub fn new_board(&self) -> Board {
        Board::new(&self.mines)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_generated_scenarios_keep_invariants() {
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..500 {
            let scenario = Scenario::generate(&mut rng);
            assert_eq!(scenario.mines().mine_count(), MINE_COUNT);
            for pos in scenario.start().square(SAFE_ZONE_RADIUS) {
                assert!(!scenario.mines().is_mine(pos), "mine in safe zone at {pos:?}");
            }
            // generated scenarios pass validation
            assert_eq!(
                Scenario::new(scenario.start(), scenario.mines().clone()),
                Ok(scenario)
            );
        }
    }

    #[test]
    fn test_generation_is_deterministic_per_seed() {
        let a = Scenario::generate(&mut Pcg32::seed_from_u64(7));
        let b = Scenario::generate(&mut Pcg32::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_start_cell_reveal_is_safe() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..100 {
            let scenario = Scenario::generate(&mut rng);
            let mut board = scenario.new_board();
            assert!(board.reveal(scenario.start()));
            assert!(!board.is_game_over());
        }
    }

    #[test]
    fn test_new_rejects_mine_in_safe_zone() {
        let mut mines = Scenario::generate(&mut Pcg32::seed_from_u64(1))
            .mines()
            .clone();
        let start = mines.mine_positions().next().unwrap();
        mines.set_mine(start);
        assert!(matches!(
            Scenario::new(start, mines),
            Err(InvalidScenarioError::MineInSafeZone { .. })
        ));
    }

    #[test]
    fn test_new_rejects_wrong_mine_count() {
        let mines = MineLayout::from_positions([Position::new(9, 9)]);
        assert_eq!(
            Scenario::new(Position::new(0, 0), mines),
            Err(InvalidScenarioError::MineCount {
                expected: MINE_COUNT,
                actual: 1,
            })
        );
    }

    #[test]
    fn test_new_rejects_start_out_of_bounds() {
        let scenario = Scenario::generate(&mut Pcg32::seed_from_u64(5));
        assert!(matches!(
            Scenario::new(Position::new(GRID_WIDTH, 0), scenario.mines().clone()),
            Err(InvalidScenarioError::StartOutOfBounds { .. })
        ));
    }
}
