//! The circular lane.

use crate::{Cell, CoreError, CoreResult, RunConfig, SimRng};

/// A fixed-length circular sequence of cells.
///
/// Index `len - 1` is followed by index `0`.  The length never changes after
/// construction, and no rule ever creates or destroys a car.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
pub struct Road {
    cells: Vec<Cell>,
}

impl Road {
    /// A road of `len` empty cells.
    pub fn empty(len: usize) -> Self {
        Self { cells: vec![Cell::EMPTY; len] }
    }

    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Build a road from `None` (empty) / `Some(velocity)` entries.
    pub fn from_velocities(velocities: &[Option<u8>]) -> Self {
        Self { cells: velocities.iter().map(|&v| Cell::from(v)).collect() }
    }

    /// Initial road for `config`: `config.num_cars()` cars at distinct,
    /// uniformly chosen positions, each with a velocity uniform in
    /// `[0, v_max]`.
    pub fn random(config: &RunConfig, rng: &mut SimRng) -> Self {
        let mut road = Self::empty(config.road_length);
        let num_cars = config.num_cars().min(config.road_length);
        let positions = rand::seq::index::sample(rng.inner(), config.road_length, num_cars);
        for pos in positions.iter() {
            let v = rng.gen_range(0..=config.v_max);
            road.cells[pos] = Cell::car(v);
        }
        road
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cell at `index`.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    #[inline(always)]
    pub fn get(&self, index: usize) -> Cell {
        self.cells[index]
    }

    #[inline(always)]
    pub fn set(&mut self, index: usize, cell: Cell) {
        self.cells[index] = cell;
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate `(index, velocity)` for every occupied cell in index order.
    pub fn cars(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.velocity().map(|v| (i, v)))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    /// Mean velocity over all cars, or `None` on an empty road.
    pub fn mean_velocity(&self) -> Option<f64> {
        let (n, sum) = self
            .cars()
            .fold((0usize, 0u64), |(n, sum), (_, v)| (n + 1, sum + v as u64));
        (n > 0).then(|| sum as f64 / n as f64)
    }

    /// Check a road received from elsewhere against the run's parameters.
    pub fn check(&self, road_length: usize, v_max: u8) -> CoreResult<()> {
        if self.len() != road_length {
            return Err(CoreError::RoadLengthMismatch { expected: road_length, got: self.len() });
        }
        if let Some((index, velocity)) = self.cars().find(|&(_, v)| v > v_max) {
            return Err(CoreError::VelocityOutOfRange { index, velocity, v_max });
        }
        Ok(())
    }
}
