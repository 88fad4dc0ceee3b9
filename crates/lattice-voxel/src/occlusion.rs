//! Section occlusion: which pairs of cube faces can see each other through
//! the non-opaque cells of a section.
//!
//! The table is computed lazily. A block change that flips a cell between
//! fully opaque and not only marks the table dirty; the flood fill runs on the
//! next query. Sections that are never queried never pay for it.
//!
//! # Algorithm
//!
//! 1. Label every cell: fully opaque cells are `INVALID`, the rest `EMPTY`.
//! 2. Sweep cells in index order. Each `EMPTY` cell starts a new region that is
//!    grown over its 6 neighbours with an explicit stack.
//! 3. For each face collect the set of region labels touching it.
//! 4. Two faces are occluded from each other iff their sets share no label.

use std::sync::{Mutex, MutexGuard, PoisonError};

use lattice_coords::{
    BLOCKS_PER_SECTION, DIRECTION_PAIRS, Direction, InSectionPosition, SECTION_MAX_X,
    SECTION_MAX_Y, SECTION_MAX_Z, direction_pair_index,
};
use rustc_hash::FxHashSet;

use crate::registry::BlockRegistry;
use crate::storage::BlockStorage;

const EMPTY: i16 = -1;
const INVALID: i16 = -2;

struct OcclusionState {
    table: [bool; DIRECTION_PAIRS],
    /// Set when the table no longer reflects the blocks.
    calculate: bool,
    fills: u64,
}

/// Lazily computed face-to-face visibility of one section.
pub struct SectionOcclusion {
    state: Mutex<OcclusionState>,
}

impl SectionOcclusion {
    /// A table that will be computed on first query.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(OcclusionState {
                table: [false; DIRECTION_PAIRS],
                calculate: true,
                fills: 0,
            }),
        }
    }

    /// Records a block change. Only a change of the fully-opaque
    /// classification invalidates the table. Returns whether it did.
    pub fn on_block_change(&self, previous_opaque: bool, next_opaque: bool) -> bool {
        if previous_opaque == next_opaque {
            return false;
        }
        self.lock().calculate = true;
        true
    }

    /// Forces a recalculation on the next query (bulk block replacement).
    pub fn invalidate(&self) {
        self.lock().calculate = true;
    }

    pub fn needs_calculation(&self) -> bool {
        self.lock().calculate
    }

    /// Number of flood fills run so far.
    pub fn fill_count(&self) -> u64 {
        self.lock().fills
    }

    /// Recomputes the table if it is stale. Returns `true` if any entry changed.
    pub fn refresh(&self, storage: &BlockStorage, registry: &BlockRegistry) -> bool {
        let mut state = self.lock();
        if !state.calculate {
            return false;
        }
        state.calculate = false;

        let table = if storage.is_empty() {
            // Every face reaches every other face through air.
            [false; DIRECTION_PAIRS]
        } else {
            state.fills += 1;
            compute_table(storage, registry)
        };
        let changed = table != state.table;
        state.table = table;
        if changed {
            tracing::trace!(fills = state.fills, "section occlusion changed");
        }
        changed
    }

    /// Whether nothing can pass from face `from` to face `to`.
    ///
    /// A face is never occluded from itself.
    pub fn is_occluded(
        &self,
        from: Direction,
        to: Direction,
        storage: &BlockStorage,
        registry: &BlockRegistry,
    ) -> bool {
        if from == to {
            return false;
        }
        self.refresh(storage, registry);
        self.lock().table[direction_pair_index(from, to)]
    }

    fn lock(&self) -> MutexGuard<'_, OcclusionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SectionOcclusion {
    fn default() -> Self {
        Self::new()
    }
}

fn compute_table(storage: &BlockStorage, registry: &BlockRegistry) -> [bool; DIRECTION_PAIRS] {
    let labels = label_regions(storage, registry);

    let mut faces: [FxHashSet<i16>; 6] = Default::default();
    for position in InSectionPosition::all() {
        let label = labels[position.index()];
        if label < 0 {
            continue;
        }
        for direction in touched_faces(position) {
            faces[direction.index()].insert(label);
        }
    }

    let mut table = [false; DIRECTION_PAIRS];
    for (i, &a) in Direction::VALUES.iter().enumerate() {
        for &b in &Direction::VALUES[i + 1..] {
            table[direction_pair_index(a, b)] =
                disjoint(&faces[a.index()], &faces[b.index()]);
        }
    }
    table
}

fn label_regions(storage: &BlockStorage, registry: &BlockRegistry) -> Vec<i16> {
    let mut labels: Vec<i16> = InSectionPosition::all()
        .map(|position| {
            if registry.is_fully_opaque(storage.get(position)) {
                INVALID
            } else {
                EMPTY
            }
        })
        .collect();

    let mut next_region: i16 = 0;
    let mut stack = Vec::with_capacity(BLOCKS_PER_SECTION);
    for start in 0..BLOCKS_PER_SECTION {
        if labels[start] != EMPTY {
            continue;
        }
        let region = next_region;
        next_region += 1;
        labels[start] = region;
        stack.push(InSectionPosition::from_index(start));

        while let Some(position) = stack.pop() {
            for neighbour in neighbours(position).into_iter().flatten() {
                let label = &mut labels[neighbour.index()];
                if *label == EMPTY {
                    *label = region;
                    stack.push(neighbour);
                }
            }
        }
    }
    labels
}

/// Neighbours inside the section; `None` where a step would leave it.
fn neighbours(position: InSectionPosition) -> [Option<InSectionPosition>; 6] {
    let (x, y, z) = (position.x(), position.y(), position.z());
    [
        (x > 0).then(|| position.minus_x()),
        (x < SECTION_MAX_X).then(|| position.plus_x()),
        (y > 0).then(|| position.minus_y()),
        (y < SECTION_MAX_Y).then(|| position.plus_y()),
        (z > 0).then(|| position.minus_z()),
        (z < SECTION_MAX_Z).then(|| position.plus_z()),
    ]
}

fn touched_faces(position: InSectionPosition) -> impl Iterator<Item = Direction> {
    let (x, y, z) = (position.x(), position.y(), position.z());
    [
        (y == 0, Direction::Down),
        (y == SECTION_MAX_Y, Direction::Up),
        (z == 0, Direction::North),
        (z == SECTION_MAX_Z, Direction::South),
        (x == 0, Direction::West),
        (x == SECTION_MAX_X, Direction::East),
    ]
    .into_iter()
    .filter_map(|(touches, direction)| touches.then_some(direction))
}

/// Iterates the smaller set. An empty set shares nothing.
fn disjoint(a: &FxHashSet<i16>, b: &FxHashSet<i16>) -> bool {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    !small.iter().any(|label| large.contains(label))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
