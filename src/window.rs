// PunchWatch — Sequence Window
//
// Fixed-capacity history of the last `L` conditioned samples. Stored as a
// ring of rows with a pointer to the oldest one; reads always come back in
// chronological order.

#[derive(Debug, Clone)]
pub struct SequenceWindow {
    /// `capacity` rows of `width` values, row-major.
    data: Vec<f32>,
    capacity: usize,
    width: usize,
    /// Row that will be overwritten next; once full it is also the oldest row.
    oldest: usize,
    len: usize,
}

impl SequenceWindow {
    pub fn new(capacity: usize, width: usize) -> Self {
        Self {
            data: vec![0.0; capacity * width],
            capacity,
            width,
            oldest: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Insert `sample` as the newest row, evicting the oldest once full.
    ///
    /// Returns a view of the window when it holds `capacity` rows.
    /// Panics if `sample.len() != width`.
    pub fn append(&mut self, sample: &[f32]) -> Option<WindowSnapshot<'_>> {
        assert_eq!(sample.len(), self.width, "sample width mismatch");

        let start = self.oldest * self.width;
        self.data[start..start + self.width].copy_from_slice(sample);
        self.oldest = (self.oldest + 1) % self.capacity;
        if self.len < self.capacity {
            self.len += 1;
        }

        self.snapshot()
    }

    /// View of the full window, or `None` during warm-up.
    pub fn snapshot(&self) -> Option<WindowSnapshot<'_>> {
        self.is_full().then_some(WindowSnapshot { window: self })
    }

    fn row(&self, physical: usize) -> &[f32] {
        let start = physical * self.width;
        &self.data[start..start + self.width]
    }
}

/// Read-only view over a full [`SequenceWindow`].
#[derive(Debug, Clone, Copy)]
pub struct WindowSnapshot<'a> {
    window: &'a SequenceWindow,
}

impl<'a> WindowSnapshot<'a> {
    /// Rows from oldest to newest.
    pub fn rows(&self) -> impl Iterator<Item = &'a [f32]> + 'a {
        let window = self.window;
        (0..window.capacity).map(move |i| window.row((window.oldest + i) % window.capacity))
    }

    pub fn newest(&self) -> &'a [f32] {
        let window = self.window;
        window.row((window.oldest + window.capacity - 1) % window.capacity)
    }

    /// Number of values produced by [`flatten_into`](Self::flatten_into).
    pub fn flat_len(&self) -> usize {
        self.window.capacity * self.window.width
    }

    /// Copy rows into `out` row-major (sample 0 channels, sample 1 channels, ...).
    ///
    /// Panics if `out.len() != flat_len()`.
    pub fn flatten_into(&self, out: &mut [f32]) {
        assert_eq!(out.len(), self.flat_len(), "flat buffer size mismatch");
        for (dst, row) in out.chunks_exact_mut(self.window.width).zip(self.rows()) {
            dst.copy_from_slice(row);
        }
    }

    pub fn to_flat(&self) -> Vec<f32> {
        let mut out = vec![0.0; self.flat_len()];
        self.flatten_into(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourth_append_evicts_first() {
        let mut window = SequenceWindow::new(3, 1);
        assert!(window.append(&[10.0]).is_none());
        assert!(window.append(&[20.0]).is_none());
        assert_eq!(window.append(&[30.0]).map(|s| s.to_flat()), Some(vec![10.0, 20.0, 30.0]));
        assert_eq!(window.append(&[40.0]).map(|s| s.to_flat()), Some(vec![20.0, 30.0, 40.0]));
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let mut window = SequenceWindow::new(4, 2);
        for i in 0..11 {
            window.append(&[i as f32, -(i as f32)]);
            assert!(window.len() <= window.capacity());
        }
        assert!(window.is_full());
    }

    #[test]
    fn rows_are_chronological_after_many_wraps() {
        let mut window = SequenceWindow::new(5, 1);
        for i in 0..23 {
            window.append(&[i as f32]);
        }
        let snapshot = window.snapshot().expect("window is full");
        let flat = snapshot.to_flat();
        assert_eq!(flat, vec![18.0, 19.0, 20.0, 21.0, 22.0]);
        assert_eq!(snapshot.newest(), &[22.0]);
    }

    #[test]
    fn flatten_is_row_major() {
        let mut window = SequenceWindow::new(2, 3);
        window.append(&[1.0, 2.0, 3.0]);
        window.append(&[4.0, 5.0, 6.0]);
        window.append(&[7.0, 8.0, 9.0]);
        let flat = window.snapshot().map(|s| s.to_flat());
        assert_eq!(flat, Some(vec![4.0, 5.0, 6.0, 7.0, 8.0, 9.0]));
    }

    #[test]
    fn no_snapshot_during_warm_up() {
        let mut window = SequenceWindow::new(12, 6);
        for _ in 0..11 {
            window.append(&[0.0; 6]);
        }
        assert!(window.snapshot().is_none());
        assert_eq!(window.len(), 11);
    }
}
