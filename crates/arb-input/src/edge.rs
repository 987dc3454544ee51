//! Edge detection over a trigger's boolean stream.

/// Events derived from one new sample.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Edge {
    /// false → true on this sample.
    pub rising:  bool,
    /// true → false on this sample.
    pub falling: bool,
    /// The sample itself.
    pub level:   bool,
}

/// Remembers the previous sample and nothing else.
///
/// The previous sample starts out `false`: a trigger that is already true on
/// the first cycle fires its rising edge on that cycle, and a trigger that
/// starts false produces no falling edge until it has been true once.
#[derive(Copy, Clone, Debug, Default)]
pub struct EdgeDetector {
    previous: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample.  Call exactly once per cycle.
    #[inline]
    pub fn update(&mut self, sample: bool) -> Edge {
        let edge = Edge {
            rising:  sample && !self.previous,
            falling: !sample && self.previous,
            level:   sample,
        };
        self.previous = sample;
        edge
    }

    pub fn previous(&self) -> bool {
        self.previous
    }
}
