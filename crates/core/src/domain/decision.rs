// Scaling decision (threshold arithmetic only, no I/O)

/// What a scaling cycle should do with the fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDecision {
    /// Start this many workers
    ScaleUp(usize),
    /// Stop this many workers
    ScaleDown(usize),
    /// Fleet is within bounds
    NoChange,
}

impl ScaleDecision {
    /// Decide from the number of dedicated workers and the configured bounds
    ///
    /// The floor is never below one worker. A `max_workers` of zero (or less)
    /// means no ceiling.
    pub fn for_fleet(running: usize, min_workers: i64, max_workers: i64) -> Self {
        let floor = effective_minimum(min_workers);

        if running < floor {
            return ScaleDecision::ScaleUp(floor - running);
        }

        if max_workers > 0 {
            let ceiling = usize::try_from(max_workers).unwrap_or(usize::MAX);
            if running > ceiling {
                return ScaleDecision::ScaleDown(running - ceiling);
            }
        }

        ScaleDecision::NoChange
    }
}

/// Floor enforced at decision time: `max(min_workers, 1)`
pub fn effective_minimum(min_workers: i64) -> usize {
    usize::try_from(min_workers.max(1)).unwrap_or(usize::MAX)
}
