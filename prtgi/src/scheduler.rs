/// Spreads relight cost across frames: each frame a contiguous, cyclically
/// advancing slice of the probe set gets updated.
///
/// The slice length is the largest divisor of the probe count that doesn't
/// exceed the configured per-frame cap, so the cursor returns to zero after
/// an integer number of frames and every probe is refreshed at the same
/// frequency.
#[derive(Clone, Debug, Default)]
pub struct UpdateScheduler {
    cursor: usize,
}

impl UpdateScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Probe indices to relight this frame; `partial` is false while the
    /// volume still needs full relights (multi-frame updates disabled, or the
    /// history ring not warmed up yet).
    pub fn next(
        &mut self,
        probe_count: usize,
        probes_per_frame: usize,
        partial: bool,
    ) -> Vec<usize> {
        if probe_count == 0 {
            return Vec::new();
        }

        if !partial {
            return (0..probe_count).collect();
        }

        let len = Self::slice_len(probe_count, probes_per_frame);
        let cursor = self.cursor;

        self.cursor = (self.cursor + len) % probe_count;

        (cursor..cursor + len)
            .map(|index| index % probe_count)
            .collect()
    }

    /// Largest divisor of `probe_count` not exceeding `probes_per_frame`.
    pub fn slice_len(probe_count: usize, probes_per_frame: usize) -> usize {
        let max = probes_per_frame.clamp(1, probe_count);

        (1..=max)
            .rev()
            .find(|len| probe_count % len == 0)
            .unwrap_or(1)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_len_is_the_largest_fitting_divisor() {
        assert_eq!(2, UpdateScheduler::slice_len(8, 3));
        assert_eq!(8, UpdateScheduler::slice_len(8, 100));
        assert_eq!(1, UpdateScheduler::slice_len(7, 3));
        assert_eq!(5, UpdateScheduler::slice_len(10, 6));
        assert_eq!(1, UpdateScheduler::slice_len(9, 0));
    }

    #[test]
    fn full_relight_returns_every_probe_and_keeps_the_cursor() {
        let mut scheduler = UpdateScheduler::new();

        let all = scheduler.next(4, 2, false);

        assert_eq!(vec![0, 1, 2, 3], all);
        assert_eq!(vec![0, 1], scheduler.next(4, 2, true));
    }

    #[test]
    fn partial_updates_cycle_uniformly() {
        let mut scheduler = UpdateScheduler::new();

        assert_eq!(vec![0, 1], scheduler.next(8, 3, true));
        assert_eq!(vec![2, 3], scheduler.next(8, 3, true));
        assert_eq!(vec![4, 5], scheduler.next(8, 3, true));
        assert_eq!(vec![6, 7], scheduler.next(8, 3, true));

        // ... and back to the start
        assert_eq!(vec![0, 1], scheduler.next(8, 3, true));
    }

    #[test]
    fn every_probe_is_selected_exactly_once_per_cycle() {
        for (probe_count, probes_per_frame) in [(8, 3), (12, 5), (9, 2)] {
            let mut scheduler = UpdateScheduler::new();
            let len = UpdateScheduler::slice_len(probe_count, probes_per_frame);
            let mut seen = vec![0; probe_count];

            for _ in 0..probe_count / len {
                for index in scheduler.next(probe_count, probes_per_frame, true)
                {
                    seen[index] += 1;
                }
            }

            assert!(seen.iter().all(|count| *count == 1));
        }
    }
}
