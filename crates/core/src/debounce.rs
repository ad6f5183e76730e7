//! Coalesces bursts of buffer modifications into a single re-search.
//!
//! The host owns the actual one-shot timer: [`ModifyDebouncer`] only tells it
//! when to start one and what to do when it elapses.

use std::time::Duration;

/// Idle time after the last modification before the search runs again.
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

/// Modification notification flags reported by the host editor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ModificationMask(u32);

impl ModificationMask {
    pub const INSERT_TEXT: ModificationMask = ModificationMask(0x01);
    pub const DELETE_TEXT: ModificationMask = ModificationMask(0x02);
    pub const CHANGE_STYLE: ModificationMask = ModificationMask(0x04);
    pub const CHANGE_FOLD: ModificationMask = ModificationMask(0x08);
    pub const USER: ModificationMask = ModificationMask(0x10);
    pub const UNDO: ModificationMask = ModificationMask(0x20);
    pub const REDO: ModificationMask = ModificationMask(0x40);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: ModificationMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// Only inserted or deleted text can change search hits.
    pub const fn is_text_change(self) -> bool {
        self.0 & (Self::INSERT_TEXT.0 | Self::DELETE_TEXT.0) != 0
    }
}

impl std::ops::BitOr for ModificationMask {
    type Output = ModificationMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        ModificationMask(self.0 | rhs.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    /// Timer running, no modification seen since it started.
    Armed,
    /// Timer running and more modifications arrived; wait another period.
    PendingRepeat,
}

/// What the host should do after [`ModifyDebouncer::notify_modified`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebounceAction {
    StartTimer(Duration),
    Wait,
    Ignore,
}

/// What the host should do after [`ModifyDebouncer::on_timer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerAction {
    /// The callback ran; kill the timer.
    Fired,
    /// Keep the timer for another period.
    Rearm,
    /// Nothing pending; kill the timer.
    Stop,
}

/// Three-state debounce guard with an injected fire callback.
pub struct ModifyDebouncer<F: FnMut()> {
    state: DebounceState,
    delay: Duration,
    on_fire: F,
}

impl<F: FnMut()> ModifyDebouncer<F> {
    pub fn new(on_fire: F) -> Self {
        Self::with_delay(DEFAULT_DEBOUNCE_DELAY, on_fire)
    }

    pub fn with_delay(delay: Duration, on_fire: F) -> Self {
        Self {
            state: DebounceState::Idle,
            delay,
            on_fire,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Records a buffer modification. Nothing is scheduled while there are
    /// no patterns to search.
    pub fn notify_modified(&mut self, has_patterns: bool) -> DebounceAction {
        if !has_patterns {
            log::debug!("modification ignored: no search data");
            return DebounceAction::Ignore;
        }
        match self.state {
            DebounceState::Idle => {
                self.state = DebounceState::Armed;
                log::debug!("debounce armed for {:?}", self.delay);
                DebounceAction::StartTimer(self.delay)
            }
            DebounceState::Armed => {
                self.state = DebounceState::PendingRepeat;
                DebounceAction::Wait
            }
            DebounceState::PendingRepeat => DebounceAction::Wait,
        }
    }

    /// Convenience wrapper filtering host notifications by mask.
    pub fn notify_mask(&mut self, mask: ModificationMask, has_patterns: bool) -> DebounceAction {
        if mask.is_text_change() {
            self.notify_modified(has_patterns)
        } else {
            DebounceAction::Ignore
        }
    }

    /// Handles an elapsed timer period.
    pub fn on_timer(&mut self) -> TimerAction {
        match self.state {
            DebounceState::Armed => {
                self.state = DebounceState::Idle;
                log::debug!("debounce elapsed, firing");
                (self.on_fire)();
                TimerAction::Fired
            }
            DebounceState::PendingRepeat => {
                self.state = DebounceState::Armed;
                TimerAction::Rearm
            }
            DebounceState::Idle => TimerAction::Stop,
        }
    }

    /// Drops any pending fire, e.g. when the dialog closes.
    pub fn cancel(&mut self) {
        if self.state != DebounceState::Idle {
            log::debug!("debounce cancelled in {:?}", self.state);
        }
        self.state = DebounceState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn single_modification_fires_once() {
        let fired = Cell::new(0);
        let mut debouncer = ModifyDebouncer::new(|| fired.set(fired.get() + 1));

        assert_eq!(
            debouncer.notify_modified(true),
            DebounceAction::StartTimer(DEFAULT_DEBOUNCE_DELAY)
        );
        assert_eq!(debouncer.on_timer(), TimerAction::Fired);
        assert_eq!(debouncer.on_timer(), TimerAction::Stop);
        assert_eq!(fired.get(), 1);
        assert_eq!(debouncer.state(), DebounceState::Idle);
    }

    #[test]
    fn burst_is_coalesced_until_a_quiet_period() {
        let fired = Cell::new(0);
        let mut debouncer = ModifyDebouncer::new(|| fired.set(fired.get() + 1));

        assert!(matches!(debouncer.notify_modified(true), DebounceAction::StartTimer(_)));
        assert_eq!(debouncer.notify_modified(true), DebounceAction::Wait);
        assert_eq!(debouncer.notify_modified(true), DebounceAction::Wait);
        assert_eq!(debouncer.state(), DebounceState::PendingRepeat);

        assert_eq!(debouncer.on_timer(), TimerAction::Rearm);
        assert_eq!(fired.get(), 0);
        assert_eq!(debouncer.on_timer(), TimerAction::Fired);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn modifications_without_patterns_are_ignored() {
        let mut debouncer = ModifyDebouncer::new(|| panic!("must not fire"));
        assert_eq!(debouncer.notify_modified(false), DebounceAction::Ignore);
        assert_eq!(debouncer.state(), DebounceState::Idle);
        assert_eq!(debouncer.on_timer(), TimerAction::Stop);
    }

    #[test]
    fn cancel_drops_pending_fire() {
        let mut debouncer = ModifyDebouncer::new(|| panic!("must not fire"));
        debouncer.notify_modified(true);
        debouncer.notify_modified(true);
        debouncer.cancel();
        assert_eq!(debouncer.on_timer(), TimerAction::Stop);
    }

    #[test]
    fn only_text_changes_reach_the_debouncer() {
        let mut debouncer = ModifyDebouncer::with_delay(Duration::from_millis(10), || {});
        let style = ModificationMask::CHANGE_STYLE | ModificationMask::USER;
        assert_eq!(debouncer.notify_mask(style, true), DebounceAction::Ignore);

        let typed = ModificationMask::INSERT_TEXT | ModificationMask::USER;
        assert!(typed.contains(ModificationMask::USER));
        assert_eq!(
            debouncer.notify_mask(typed, true),
            DebounceAction::StartTimer(Duration::from_millis(10))
        );
        assert!(ModificationMask::from_bits(0x02).is_text_change());
    }
}
