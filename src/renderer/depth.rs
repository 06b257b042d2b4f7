//! Per-row depth record
//!
//! Holds the distance of the terrain drawn on each screen row during the
//! current frame. Sprites are only drawn where they are not behind the road.

/// Nearest terrain distance per screen row
#[derive(Debug, Clone)]
pub struct DepthBuffer {
    rows: Vec<f64>,
}

impl DepthBuffer {
    /// Value of a row with no terrain drawn on it
    pub const SENTINEL: f64 = f64::INFINITY;

    pub fn new(height: usize) -> Self {
        Self {
            rows: vec![Self::SENTINEL; height],
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Mark every row as infinitely far
    pub fn reset(&mut self) {
        self.rows.fill(Self::SENTINEL);
    }

    /// Record `distance` for `row`. Rows outside the screen are ignored.
    #[inline]
    pub fn write(&mut self, row: i32, distance: f64) {
        if let Some(slot) = usize::try_from(row).ok().and_then(|r| self.rows.get_mut(r)) {
            *slot = distance;
        }
    }

    /// Recorded distance for `row`, if on screen
    #[inline]
    pub fn get(&self, row: i32) -> Option<f64> {
        usize::try_from(row).ok().and_then(|r| self.rows.get(r)).copied()
    }

    /// True if something at `distance` is at least as near as the terrain on
    /// `row`, allowing `tolerance` of slack. Rows outside the screen fail.
    #[inline]
    pub fn test(&self, row: i32, distance: f64, tolerance: f64) -> bool {
        self.get(row)
            .is_some_and(|recorded| recorded > distance - tolerance)
    }

    pub fn rows(&self) -> &[f64] {
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_reset_use_sentinel() {
        let mut depth = DepthBuffer::new(4);
        assert!(depth.rows().iter().all(|&d| d == DepthBuffer::SENTINEL));
        depth.write(2, 5.0);
        assert_eq!(depth.get(2), Some(5.0));
        depth.reset();
        assert!(depth.rows().iter().all(|&d| d == DepthBuffer::SENTINEL));
    }

    #[test]
    fn test_occlusion_with_tolerance() {
        let mut depth = DepthBuffer::new(180);
        depth.write(99, 50.0);
        assert!(depth.test(99, 35.0, 10.0));
        assert!(!depth.test(99, 65.0, 10.0));
        // Within the slack past the crest
        assert!(depth.test(99, 55.0, 10.0));
        assert!(!depth.test(99, 60.0, 10.0));
    }

    #[test]
    fn test_sentinel_row_always_passes() {
        let depth = DepthBuffer::new(180);
        assert!(depth.test(10, 1.0e9, 10.0));
    }

    #[test]
    fn test_out_of_range_rows() {
        let mut depth = DepthBuffer::new(8);
        depth.write(-1, 1.0);
        depth.write(8, 1.0);
        assert!(depth.rows().iter().all(|&d| d == DepthBuffer::SENTINEL));
        assert!(!depth.test(-1, 0.0, 10.0));
        assert!(!depth.test(8, 0.0, 10.0));
        assert_eq!(depth.get(8), None);
    }
}
