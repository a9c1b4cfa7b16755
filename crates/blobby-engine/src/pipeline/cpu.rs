use super::layout::{ListEntry, ListLayout};

/// Outcome of one append.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Append {
    Stored(u32),
    Dropped,
}

/// Host-side model of the list-build pass.
///
/// `append` does what each list-build fragment does: fetch-and-increment the
/// pixel's cursor, then write the entry only if the fetched slot is below
/// capacity. The cursor keeps counting past capacity; readers clamp it.
#[derive(Debug, Clone)]
pub struct PixelLists {
    layout: ListLayout,
    cursors: Vec<u32>,
    entries: Vec<ListEntry>,
}

impl PixelLists {
    pub fn new(layout: ListLayout) -> Self {
        Self {
            layout,
            cursors: vec![0; layout.pixel_count() as usize],
            entries: vec![ListEntry { depth: 0.0, primitive: 0 }; layout.list_len() as usize],
        }
    }

    pub fn layout(&self) -> ListLayout {
        self.layout
    }

    /// Resets every cursor. Entry memory is left as is.
    pub fn clear(&mut self) {
        self.cursors.fill(0);
    }

    /// Pixels outside the layout are dropped.
    pub fn append(&mut self, x: u32, y: u32, entry: ListEntry) -> Append {
        let Some(pixel) = self.layout.pixel_index(x, y) else {
            return Append::Dropped;
        };
        let cursor = &mut self.cursors[pixel as usize];
        let slot = *cursor;
        *cursor = cursor.saturating_add(1);

        if slot >= self.layout.capacity {
            return Append::Dropped;
        }
        self.entries[self.layout.slot_index(pixel, slot) as usize] = entry;
        Append::Stored(slot)
    }

    /// Raw cursor value, including appends that overflowed.
    pub fn candidates(&self, x: u32, y: u32) -> u32 {
        self.layout
            .pixel_index(x, y)
            .map_or(0, |p| self.cursors[p as usize])
    }

    /// Number of stored entries.
    pub fn count(&self, x: u32, y: u32) -> u32 {
        self.candidates(x, y).min(self.layout.capacity)
    }

    pub fn bucket(&self, x: u32, y: u32) -> &[ListEntry] {
        let Some(pixel) = self.layout.pixel_index(x, y) else {
            return &[];
        };
        let start = self.layout.slot_index(pixel, 0) as usize;
        &self.entries[start..start + self.count(x, y) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(primitive: u32) -> ListEntry {
        ListEntry {
            depth: primitive as f32,
            primitive,
        }
    }

    fn primitives(lists: &PixelLists, x: u32, y: u32) -> Vec<u32> {
        lists.bucket(x, y).iter().map(|e| e.primitive).collect()
    }

    // ── clear ─────────────────────────────────────────────────────────────

    #[test]
    fn cleared_lists_are_empty_for_any_size() {
        for (w, h, c) in [(1, 1, 1), (7, 3, 4), (64, 48, 8)] {
            let mut lists = PixelLists::new(ListLayout::new(w, h, c));
            lists.append(0, 0, entry(1));
            lists.clear();
            for y in 0..h {
                for x in 0..w {
                    assert_eq!(lists.count(x, y), 0);
                    assert!(lists.bucket(x, y).is_empty());
                }
            }
        }
    }

    // ── append ────────────────────────────────────────────────────────────

    #[test]
    fn under_capacity_keeps_everything() {
        let mut lists = PixelLists::new(ListLayout::new(4, 4, 4));
        for p in 0..3 {
            assert_eq!(lists.append(2, 1, entry(p)), Append::Stored(p));
        }
        assert_eq!(lists.count(2, 1), 3);
        assert_eq!(primitives(&lists, 2, 1), vec![0, 1, 2]);
        assert_eq!(lists.count(1, 2), 0);
    }

    #[test]
    fn overflow_keeps_first_capacity_in_submission_order() {
        let capacity = 3;
        let mut lists = PixelLists::new(ListLayout::new(2, 2, capacity));
        let submitted = [9, 4, 7, 1, 8];
        let outcomes: Vec<_> = submitted.iter().map(|&p| lists.append(1, 1, entry(p))).collect();

        assert_eq!(
            outcomes,
            vec![Append::Stored(0), Append::Stored(1), Append::Stored(2), Append::Dropped, Append::Dropped]
        );
        assert_eq!(lists.count(1, 1), capacity);
        assert_eq!(lists.candidates(1, 1), 5);
        assert_eq!(primitives(&lists, 1, 1), vec![9, 4, 7]);
    }

    #[test]
    fn truncation_drops_exactly_k_minus_c() {
        for k in 0..12u32 {
            let mut lists = PixelLists::new(ListLayout::new(1, 1, 5));
            let dropped = (0..k)
                .filter(|&p| lists.append(0, 0, entry(p)) == Append::Dropped)
                .count() as u32;
            assert_eq!(dropped, k.saturating_sub(5));
            assert_eq!(lists.count(0, 0), k.min(5));
        }
    }

    #[test]
    fn pixels_are_independent() {
        let mut lists = PixelLists::new(ListLayout::new(3, 1, 2));
        lists.append(0, 0, entry(1));
        lists.append(2, 0, entry(2));
        lists.append(2, 0, entry(3));
        assert_eq!(primitives(&lists, 0, 0), vec![1]);
        assert_eq!(primitives(&lists, 1, 0), Vec::<u32>::new());
        assert_eq!(primitives(&lists, 2, 0), vec![2, 3]);
    }

    #[test]
    fn out_of_screen_is_dropped() {
        let mut lists = PixelLists::new(ListLayout::new(2, 2, 2));
        assert_eq!(lists.append(5, 0, entry(1)), Append::Dropped);
        assert_eq!(lists.candidates(5, 0), 0);
    }
}
