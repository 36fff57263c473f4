use chrono::NaiveDateTime;

/// A closed span `[start, end]` known to be fully indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Swaps the bounds if they are given out of order.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }

    pub fn contains_window(&self, other: &TimeWindow) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// An always growing set of indexed time windows.
///
/// Windows are kept sorted by start and pairwise disjoint; every `add` merges
/// the new window with any window it overlaps or touches at an endpoint.
#[derive(Clone, Debug, Default)]
pub struct CoverageSet {
    windows: Vec<TimeWindow>,
}

impl CoverageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, start: NaiveDateTime, end: NaiveDateTime) {
        let new = TimeWindow::new(start, end);

        if self.windows.is_empty() {
            self.windows.push(new);
            return;
        }

        if self.covers(new.start, new.end) {
            return;
        }

        self.windows.push(new);
        self.windows.sort_by_key(|w| w.start);

        let mut merged: Vec<TimeWindow> = Vec::with_capacity(self.windows.len());
        for w in self.windows.drain(..) {
            match merged.last_mut() {
                Some(last) if w.start <= last.end => {
                    if w.end > last.end {
                        last.end = w.end;
                    }
                }
                _ => merged.push(w),
            }
        }

        self.windows = merged;
    }

    /// True if a single stored window contains all of `[start, end]`.
    ///
    /// A span straddling two separate windows is not covered.
    pub fn covers(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        let query = TimeWindow::new(start, end);
        self.windows.iter().any(|w| w.contains_window(&query))
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.windows.iter().any(|w| w.contains(instant))
    }

    pub fn windows(&self) -> &[TimeWindow] {
        &self.windows
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
