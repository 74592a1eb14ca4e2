//! Collaborator seams of the timer engine.

/// Longest break the settings layer will hand to the engine.
pub const MAX_BREAK_MINUTES: u32 = 60;

/// Source of the configured break length.
///
/// Read at `start` and on every `reload_settings`; implementations must be
/// cheap and side-effect free.
pub trait SettingsProvider {
    /// Short break length in minutes. `0` means no break phase.
    fn break_length_minutes(&self) -> u32;
}

/// A constant break length, clamped to `0..=60`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBreak(pub u32);

impl SettingsProvider for FixedBreak {
    fn break_length_minutes(&self) -> u32 {
        self.0.min(MAX_BREAK_MINUTES)
    }
}

impl<T: SettingsProvider + ?Sized> SettingsProvider for &T {
    fn break_length_minutes(&self) -> u32 {
        (**self).break_length_minutes()
    }
}

impl<T: SettingsProvider + ?Sized> SettingsProvider for std::rc::Rc<T> {
    fn break_length_minutes(&self) -> u32 {
        (**self).break_length_minutes()
    }
}

impl<T: SettingsProvider> SettingsProvider for std::cell::RefCell<T> {
    fn break_length_minutes(&self) -> u32 {
        self.borrow().break_length_minutes()
    }
}

/// Called when a work phase expires, before the engine moves on.
///
/// The engine does not inspect the outcome; rewards surface through the
/// collection's own notifications.
pub trait WorkCompletionHook {
    fn work_completed(&mut self, work_minutes: u32);
}

impl<F: FnMut(u32)> WorkCompletionHook for F {
    fn work_completed(&mut self, work_minutes: u32) {
        self(work_minutes)
    }
}

/// A hook that ignores completions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRewards;

impl WorkCompletionHook for NoRewards {
    fn work_completed(&mut self, _work_minutes: u32) {}
}
