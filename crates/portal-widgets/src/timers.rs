//! Virtual-time one-shot timers.
//!
//! Behaviors never sleep. They schedule a [`TimerAction`] on the page's
//! [`Scheduler`], and the page performs the action once enough virtual time
//! has been advanced past its due time.

use std::time::Duration;

use portal_dom::NodeId;
use serde::Serialize;

/// Identifies a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimerId(u64);

/// What the page does when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Submit the form natively, bypassing submit handlers.
    SubmitForm(NodeId),
    /// Reload the whole page.
    ReloadPage,
}

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    due_at: Duration,
    action: TimerAction,
}

/// A queue of one-shot timers over a virtual clock that starts at zero.
///
/// ```
/// use std::time::Duration;
/// use portal_widgets::timers::{Scheduler, TimerAction};
///
/// let mut scheduler = Scheduler::new();
/// scheduler.schedule_once(Duration::from_secs(30), TimerAction::ReloadPage);
///
/// assert!(scheduler.advance(Duration::from_secs(29)).is_empty());
/// assert_eq!(scheduler.advance(Duration::from_secs(1)), vec![TimerAction::ReloadPage]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    elapsed: Duration,
    next_id: u64,
    timers: Vec<Timer>,
}

impl Scheduler {
    /// Creates an empty scheduler at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` to fire once `delay` has elapsed.
    pub fn schedule_once(&mut self, delay: Duration, action: TimerAction) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due_at: self.elapsed + delay,
            action,
        });
        tracing::debug!(timer = id.0, delay_ms = delay.as_millis(), ?action, "timer scheduled");
        id
    }

    /// Cancels a pending timer. Returns `false` if it already fired or never existed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() < before
    }

    /// Moves virtual time forward and returns the actions that fell due,
    /// earliest first. Timers due at the same instant fire in scheduling order.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerAction> {
        self.elapsed += by;
        let now = self.elapsed;
        let (mut due, waiting): (Vec<Timer>, Vec<Timer>) =
            self.timers.drain(..).partition(|t| t.due_at <= now);
        self.timers = waiting;
        due.sort_by_key(|t| (t.due_at, t.id));
        due.into_iter().map(|t| t.action).collect()
    }

    /// Returns the number of timers that have not fired yet.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Returns `true` if the timer is still waiting to fire.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Returns the virtual time advanced so far.
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns how long until the next timer fires.
    pub fn next_due_in(&self) -> Option<Duration> {
        self.timers
            .iter()
            .map(|t| t.due_at.saturating_sub(self.elapsed))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_dom::Document;

    #[test]
    fn test_fires_in_due_order() {
        let doc = Document::new();
        let form = doc.root();
        let mut scheduler = Scheduler::new();
        scheduler.schedule_once(Duration::from_secs(30), TimerAction::ReloadPage);
        scheduler.schedule_once(Duration::from_millis(500), TimerAction::SubmitForm(form));

        let fired = scheduler.advance(Duration::from_secs(60));
        assert_eq!(
            fired,
            vec![TimerAction::SubmitForm(form), TimerAction::ReloadPage]
        );
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_ties_fire_in_scheduling_order() {
        let doc = Document::new();
        let form = doc.root();
        let mut scheduler = Scheduler::new();
        scheduler.schedule_once(Duration::from_secs(1), TimerAction::ReloadPage);
        scheduler.schedule_once(Duration::from_secs(1), TimerAction::SubmitForm(form));
        assert_eq!(
            scheduler.advance(Duration::from_secs(1)),
            vec![TimerAction::ReloadPage, TimerAction::SubmitForm(form)]
        );
    }

    #[test]
    fn test_not_due_yet() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule_once(Duration::from_millis(500), TimerAction::ReloadPage);
        assert!(scheduler.advance(Duration::from_millis(499)).is_empty());
        assert!(scheduler.is_pending(id));
        assert_eq!(scheduler.next_due_in(), Some(Duration::from_millis(1)));
        assert_eq!(scheduler.elapsed(), Duration::from_millis(499));
    }

    #[test]
    fn test_delay_is_relative_to_current_time() {
        let mut scheduler = Scheduler::new();
        scheduler.advance(Duration::from_secs(10));
        scheduler.schedule_once(Duration::from_secs(5), TimerAction::ReloadPage);
        assert!(scheduler.advance(Duration::from_secs(4)).is_empty());
        assert_eq!(scheduler.advance(Duration::from_secs(1)).len(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule_once(Duration::from_secs(30), TimerAction::ReloadPage);
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(scheduler.advance(Duration::from_secs(60)).is_empty());
        assert_eq!(scheduler.next_due_in(), None);
    }

    #[test]
    fn test_fired_timers_do_not_fire_again() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_once(Duration::ZERO, TimerAction::ReloadPage);
        assert_eq!(scheduler.advance(Duration::ZERO).len(), 1);
        assert!(scheduler.advance(Duration::from_secs(100)).is_empty());
    }
}
