/// Per-tile "already specialised" flags.
///
/// Water is marked as soon as land classification finishes; land is marked
/// the moment a stage gives it a concrete terrain. Nothing clears a flag
/// during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementMap {
    width: usize,
    height: usize,
    placed: Vec<bool>,
}

impl PlacementMap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            placed: vec![false; width * height],
        }
    }

    /// Out-of-range coordinates are ignored.
    pub fn set_placed(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.placed[y * self.width + x] = true;
        }
    }

    /// False for out-of-range coordinates, so they are never picked up as
    /// candidates.
    pub fn not_placed(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && !self.placed[y * self.width + x]
    }

    pub fn is_placed(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.placed[y * self.width + x]
    }

    /// Clears every flag; called once at the start of a run.
    pub fn reset(&mut self) {
        self.placed.iter_mut().for_each(|flag| *flag = false);
    }

    pub fn placed_count(&self) -> usize {
        self.placed.iter().filter(|flag| **flag).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_and_resets() {
        let mut map = PlacementMap::new(3, 2);
        assert!(map.not_placed(1, 1));
        map.set_placed(1, 1);
        map.set_placed(1, 1);
        assert!(!map.not_placed(1, 1));
        assert!(map.is_placed(1, 1));
        assert_eq!(map.placed_count(), 1);
        map.reset();
        assert_eq!(map.placed_count(), 0);
    }

    #[test]
    fn out_of_range_is_neither_placed_nor_open() {
        let mut map = PlacementMap::new(2, 2);
        map.set_placed(5, 0);
        assert_eq!(map.placed_count(), 0);
        assert!(!map.not_placed(2, 0));
        assert!(!map.is_placed(0, 2));
    }
}
