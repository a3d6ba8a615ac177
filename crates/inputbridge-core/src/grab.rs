//! Cursor grab state machine.
//!
//! The UI layer only knows absolute pointer coordinates. While grabbing, the consumer wants an
//! unbounded virtual cursor driven by deltas, so the bridge accumulates `x - last_x` into
//! `grab_x` (and the same for y). Every entry into grab mode, and every explicit resync request,
//! swallows the next position to capture a fresh baseline instead of reporting a jump.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabMode {
    Free,
    Grabbing,
    /// Grabbing, next position only establishes the baseline.
    Resyncing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GrabState {
    grabbing: bool,
    grab_x: i32,
    grab_y: i32,
    last_x: i32,
    last_y: i32,
    needs_resync: bool,
}

impl GrabState {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enabling seeds the virtual cursor and arms a resync. Disabling keeps the virtual position
    /// around but stops using it.
    pub fn set_grabbing(&mut self, grabbing: bool, seed_x: i32, seed_y: i32) {
        self.grabbing = grabbing;
        if grabbing {
            self.grab_x = seed_x;
            self.grab_y = seed_y;
            self.needs_resync = true;
        }
        log::debug!(
            target: "inputbridge::grab",
            "grab.set grabbing={} seed=({},{})",
            grabbing,
            seed_x,
            seed_y
        );
    }

    /// Arms a resync; consumed by the next position seen while grabbing.
    #[inline]
    pub fn request_resync(&mut self) {
        self.needs_resync = true;
    }

    #[inline]
    pub fn is_grabbing(&self) -> bool {
        self.grabbing
    }

    #[inline]
    pub fn needs_resync(&self) -> bool {
        self.needs_resync
    }

    #[inline]
    pub fn grab_pos(&self) -> (i32, i32) {
        (self.grab_x, self.grab_y)
    }

    #[inline]
    pub fn last_pos(&self) -> (i32, i32) {
        (self.last_x, self.last_y)
    }

    pub fn mode(&self) -> GrabMode {
        match (self.grabbing, self.needs_resync) {
            (false, _) => GrabMode::Free,
            (true, true) => GrabMode::Resyncing,
            (true, false) => GrabMode::Grabbing,
        }
    }

    /// Feeds one absolute position. Returns the position to report, or `None` when the event only
    /// served as a resync baseline.
    pub fn track(&mut self, x: i32, y: i32) -> Option<(i32, i32)> {
        if !self.grabbing {
            self.last_x = x;
            self.last_y = y;
            return Some((x, y));
        }

        if self.needs_resync {
            self.last_x = x;
            self.last_y = y;
            self.needs_resync = false;
            log::trace!(target: "inputbridge::grab", "grab.resync baseline=({},{})", x, y);
            return None;
        }

        // Unbounded on purpose; wrapping only keeps i32 overflow from panicking in debug builds.
        self.grab_x = self.grab_x.wrapping_add(x.wrapping_sub(self.last_x));
        self.grab_y = self.grab_y.wrapping_add(y.wrapping_sub(self.last_y));
        self.last_x = x;
        self.last_y = y;

        Some((self.grab_x, self.grab_y))
    }
}
