//! Light exchange between horizontally adjacent chunk columns.
//!
//! A column's outermost cell layer on one side is snapshotted into a
//! [`FaceBorder`]. The neighbour on that side then seeds its own edge cells
//! from the snapshot and spreads inward. Snapshotting first means the two
//! columns never have to be borrowed at the same time.

use lattice_coords::{Direction, InChunkPosition, SECTION_MAX_X, SECTION_MAX_Z};

use crate::level::{Channel, LightLevel};
use crate::propagation::{LightEngine, LightVolume};

const FACE_WIDTH: usize = 16;

/// Effective light of one vertical side of a column, 16 cells per y.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceBorder {
    face: Direction,
    min_y: i32,
    levels: Vec<LightLevel>,
}

impl FaceBorder {
    /// Snapshots the side `face` of `volume`.
    ///
    /// # Panics
    ///
    /// Panics if `face` is vertical.
    pub fn extract<V: LightVolume + ?Sized>(engine: &LightEngine<'_>, volume: &V, face: Direction) -> Self {
        let (min_y, max_y) = (volume.min_y(), volume.max_y());
        let mut levels = Vec::with_capacity((max_y - min_y + 1) as usize * FACE_WIDTH);
        for y in min_y..=max_y {
            for along in 0..FACE_WIDTH as i32 {
                levels.push(engine.effective(volume, face_cell(face, along, y)));
            }
        }
        Self { face, min_y, levels }
    }

    /// Side of the source column this border was taken from.
    pub fn face(&self) -> Direction {
        self.face
    }

    /// Light at `along` (x for north/south faces, z for east/west) and `y`.
    pub fn get(&self, along: i32, y: i32) -> Option<LightLevel> {
        if !(0..FACE_WIDTH as i32).contains(&along) || y < self.min_y {
            return None;
        }
        let index = (y - self.min_y) as usize * FACE_WIDTH + along as usize;
        self.levels.get(index).copied()
    }

    fn max_y(&self) -> i32 {
        self.min_y + (self.levels.len() / FACE_WIDTH) as i32 - 1
    }
}

/// Returns `true` if two snapshots of the same side differ anywhere.
pub fn border_changed(old: &FaceBorder, new: &FaceBorder) -> bool {
    old.face != new.face || old.min_y != new.min_y || old.levels != new.levels
}

/// Cell of a column on side `face` at `along`/`y`.
fn face_cell(face: Direction, along: i32, y: i32) -> InChunkPosition {
    match face {
        Direction::East => InChunkPosition::new(SECTION_MAX_X, y, along),
        Direction::West => InChunkPosition::new(0, y, along),
        Direction::South => InChunkPosition::new(along, y, SECTION_MAX_Z),
        Direction::North => InChunkPosition::new(along, y, 0),
        Direction::Up | Direction::Down => panic!("columns only exchange light horizontally"),
    }
}

impl LightEngine<'_> {
    /// Seeds `volume` from a neighbour's border and spreads inward.
    ///
    /// The border must come from the neighbour's side facing `volume`, so light
    /// enters through the opposite side of `volume`. Only brightens; returns the
    /// number of edge cells that got brighter.
    pub fn propagate_border<V: LightVolume + ?Sized>(&self, volume: &mut V, border: &FaceBorder) -> usize {
        let entry = border.face().opposite();
        let low = volume.min_y().max(border.min_y);
        let high = volume.max_y().min(border.max_y());

        let mut queue = std::collections::VecDeque::new();
        let mut brightened = 0;
        for y in low..=high {
            for along in 0..FACE_WIDTH as i32 {
                let Some(source) = border.get(along, y) else {
                    continue;
                };
                let target = face_cell(entry, along, y);
                let mut lit = false;
                if self.has_skylight() {
                    lit |= self.offer(volume, target, Channel::Sky, source.sky(), &mut queue);
                }
                lit |= self.offer(volume, target, Channel::Block, source.block(), &mut queue);
                if lit {
                    brightened += 1;
                }
            }
        }

        if brightened > 0 {
            tracing::trace!(?entry, brightened, "seeded light from neighbouring column");
        }
        self.spread(volume, queue);
        brightened
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::test_support::*;

    #[test]
    fn test_torch_light_crosses_into_neighbour() {
        let blocks = blocks();
        let engine = LightEngine::new(&blocks.registry, false);

        // Torch 2 blocks from the east edge of the western column.
        let mut west = TestColumn::new(0, 15);
        west.put(13, 8, 8, blocks.torch);
        engine.recalculate(&mut west);
        assert_eq!(west.light(InChunkPosition::new(15, 8, 8)).block(), 12);

        let mut east = TestColumn::new(0, 15);
        engine.recalculate(&mut east);
        let border = FaceBorder::extract(&engine, &west, Direction::East);
        let brightened = engine.propagate_border(&mut east, &border);

        assert!(brightened > 0);
        assert_eq!(east.light(InChunkPosition::new(0, 8, 8)).block(), 11);
        assert_eq!(east.light(InChunkPosition::new(4, 8, 8)).block(), 7);
    }

    #[test]
    fn test_sky_enters_covered_column_from_the_side() {
        let blocks = blocks();
        let engine = LightEngine::new(&blocks.registry, true);

        let open = TestColumn::new(0, 15);
        let mut covered = TestColumn::new(0, 15);
        for x in 0..16 {
            for z in 0..16 {
                covered.put(x, 15, z, blocks.stone);
            }
        }
        covered.rebuild_heightmap(&blocks.registry);
        engine.recalculate(&mut covered);
        assert_eq!(engine.effective(&covered, InChunkPosition::new(8, 5, 0)).sky(), 0);

        // The open column lies north of the covered one.
        let border = FaceBorder::extract(&engine, &open, Direction::South);
        engine.propagate_border(&mut covered, &border);
        assert_eq!(engine.effective(&covered, InChunkPosition::new(8, 5, 0)).sky(), 14);
        assert_eq!(engine.effective(&covered, InChunkPosition::new(8, 5, 3)).sky(), 11);
    }

    #[test]
    fn test_opaque_edge_blocks_incoming_light() {
        let blocks = blocks();
        let engine = LightEngine::new(&blocks.registry, false);
        let mut source = TestColumn::new(0, 15);
        source.put(0, 4, 4, blocks.torch);
        engine.recalculate(&mut source);

        let mut walled = TestColumn::new(0, 15);
        for y in 0..16 {
            for z in 0..16 {
                walled.put(15, y, z, blocks.stone);
            }
        }
        engine.recalculate(&mut walled);
        let border = FaceBorder::extract(&engine, &source, Direction::West);
        assert_eq!(engine.propagate_border(&mut walled, &border), 0);
        assert_eq!(walled.light(InChunkPosition::new(14, 4, 4)).block(), 0);
    }

    #[test]
    fn test_border_changed_detects_difference() {
        let blocks = blocks();
        let engine = LightEngine::new(&blocks.registry, false);
        let mut column = TestColumn::new(0, 15);
        engine.recalculate(&mut column);
        let before = FaceBorder::extract(&engine, &column, Direction::North);
        assert!(!border_changed(&before, &before.clone()));

        column.put(3, 3, 0, blocks.torch);
        engine.recalculate(&mut column);
        let after = FaceBorder::extract(&engine, &column, Direction::North);
        assert!(border_changed(&before, &after));
        assert_eq!(after.get(3, 3).map(LightLevel::block), Some(14));
        assert_eq!(after.get(16, 3), None);
    }
}
