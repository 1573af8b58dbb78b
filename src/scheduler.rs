//! Global Scatter/Pursuit timetable with the frightened override.

use tracing::debug;

use crate::constants::FRIGHTENED_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Scatter,
    Pursuit,
}

/// Length of one timetable entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Millis(u64),
    Forever,
}

pub const CLASSIC_TABLE: [(Phase, Span); 8] = [
    (Phase::Scatter, Span::Millis(7_000)),
    (Phase::Pursuit, Span::Millis(20_000)),
    (Phase::Scatter, Span::Millis(7_000)),
    (Phase::Pursuit, Span::Millis(20_000)),
    (Phase::Scatter, Span::Millis(5_000)),
    (Phase::Pursuit, Span::Millis(20_000)),
    (Phase::Scatter, Span::Millis(5_000)),
    (Phase::Pursuit, Span::Forever),
];

/// What a scheduler tick asks the orchestrator to broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChange {
    /// The timetable moved on to a new entry.
    Phase(Phase),
    /// The frightened window closed; the paused phase is back.
    FrightenedOver(Phase),
}

#[derive(Debug, Clone)]
pub struct ModeScheduler {
    table: Vec<(Phase, Span)>,
    index: usize,
    remaining: Span,
    /// Remaining time of the paused phase while frightened.
    saved: Option<Span>,
    frightened_left: u64,
    frightened_ms: u64,
}

impl Default for ModeScheduler {
    fn default() -> Self {
        Self::new(CLASSIC_TABLE.to_vec(), FRIGHTENED_MS)
    }
}

impl ModeScheduler {
    /// An empty table behaves as a single endless Pursuit entry. The last
    /// entry always lasts forever, whatever the table says.
    pub fn new(mut table: Vec<(Phase, Span)>, frightened_ms: u64) -> Self {
        match table.last_mut() {
            Some(last) => last.1 = Span::Forever,
            None => table.push((Phase::Pursuit, Span::Forever)),
        }
        let remaining = table[0].1;
        Self {
            table,
            index: 0,
            remaining,
            saved: None,
            frightened_left: 0,
            frightened_ms,
        }
    }

    pub fn phase(&self) -> Phase {
        self.table[self.index].0
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Time left in the current phase. While frightened this is the paused
    /// value, untouched by the override.
    pub fn remaining(&self) -> Span {
        self.saved.unwrap_or(self.remaining)
    }

    pub fn is_frightened(&self) -> bool {
        self.saved.is_some()
    }

    pub fn frightened_left(&self) -> u64 {
        self.frightened_left
    }

    /// Pauses the timetable and starts (or restarts) the frightened window.
    pub fn frighten(&mut self) {
        if self.saved.is_none() {
            self.saved = Some(self.remaining);
        }
        self.frightened_left = self.frightened_ms;
        debug!(phase = ?self.phase(), "frightened window started");
    }

    /// Drops the override without waiting for it to run out, restoring the
    /// paused phase time.
    pub fn cancel_frightened(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.remaining = saved;
            self.frightened_left = 0;
        }
    }

    pub fn tick(&mut self, dt_ms: u64) -> Option<ModeChange> {
        if self.saved.is_some() {
            self.frightened_left = self.frightened_left.saturating_sub(dt_ms);
            if self.frightened_left == 0 {
                self.cancel_frightened();
                debug!(phase = ?self.phase(), "frightened window over");
                return Some(ModeChange::FrightenedOver(self.phase()));
            }
            return None;
        }

        let Span::Millis(left) = self.remaining else {
            return None;
        };
        // clamp at zero: an overshoot expires the phase, it does not carry
        let left = left.saturating_sub(dt_ms);
        if left > 0 {
            self.remaining = Span::Millis(left);
            return None;
        }

        self.index = (self.index + 1).min(self.table.len() - 1);
        self.remaining = self.table[self.index].1;
        debug!(index = self.index, phase = ?self.phase(), "phase advanced");
        Some(ModeChange::Phase(self.phase()))
    }

    /// Back to the first entry with no override, as at level start.
    pub fn reset(&mut self) {
        self.index = 0;
        self.remaining = self.table[0].1;
        self.saved = None;
        self.frightened_left = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Phase the classic table prescribes after `elapsed` ms.
    fn lookup(elapsed: u64) -> (usize, Phase) {
        let mut start = 0;
        for (idx, (phase, span)) in CLASSIC_TABLE.iter().enumerate() {
            match span {
                Span::Millis(ms) if elapsed >= start + ms => start += ms,
                _ => return (idx, *phase),
            }
        }
        unreachable!("last entry is endless")
    }

    #[test]
    fn starts_in_scatter() {
        let scheduler = ModeScheduler::default();
        assert_eq!(scheduler.phase(), Phase::Scatter);
        assert_eq!(scheduler.remaining(), Span::Millis(7_000));
    }

    #[test]
    fn advances_and_reports_each_phase() {
        let mut scheduler = ModeScheduler::default();
        let mut changes = Vec::new();
        for _ in 0..(7_000 + 20_000 + 7_000) / 100 {
            if let Some(change) = scheduler.tick(100) {
                changes.push(change);
            }
        }
        assert_eq!(
            changes,
            vec![
                ModeChange::Phase(Phase::Pursuit),
                ModeChange::Phase(Phase::Scatter),
                ModeChange::Phase(Phase::Pursuit),
            ]
        );
    }

    #[test]
    fn final_entry_never_advances() {
        let mut scheduler = ModeScheduler::default();
        for _ in 0..10_000 {
            scheduler.tick(1_000);
        }
        assert_eq!(scheduler.index(), CLASSIC_TABLE.len() - 1);
        assert_eq!(scheduler.phase(), Phase::Pursuit);
        assert_eq!(scheduler.tick(u64::MAX), None);
        assert_eq!(scheduler.index(), CLASSIC_TABLE.len() - 1);
    }

    #[test]
    fn overshoot_clamps_to_immediate_expiry() {
        let mut scheduler = ModeScheduler::default();
        assert_eq!(scheduler.tick(9_999), Some(ModeChange::Phase(Phase::Pursuit)));
        assert_eq!(scheduler.remaining(), Span::Millis(20_000));
    }

    #[test]
    fn frightened_pauses_and_resumes_exactly() {
        let mut scheduler = ModeScheduler::new(CLASSIC_TABLE.to_vec(), 6_000);
        for _ in 0..30 {
            scheduler.tick(100);
        }
        assert_eq!(scheduler.remaining(), Span::Millis(4_000));

        scheduler.frighten();
        assert!(scheduler.is_frightened());
        let mut change = None;
        for _ in 0..60 {
            assert_eq!(change, None);
            change = scheduler.tick(100);
        }
        assert_eq!(change, Some(ModeChange::FrightenedOver(Phase::Scatter)));
        assert!(!scheduler.is_frightened());
        assert_eq!(scheduler.remaining(), Span::Millis(4_000));
        assert_eq!(scheduler.phase(), Phase::Scatter);
    }

    #[test]
    fn second_power_pellet_restarts_window_keeps_saved_time() {
        let mut scheduler = ModeScheduler::new(CLASSIC_TABLE.to_vec(), 6_000);
        scheduler.tick(1_000);
        scheduler.frighten();
        scheduler.tick(5_000);
        scheduler.frighten();
        assert_eq!(scheduler.frightened_left(), 6_000);
        assert_eq!(scheduler.tick(5_900), None);
        assert_eq!(
            scheduler.tick(100),
            Some(ModeChange::FrightenedOver(Phase::Scatter))
        );
        assert_eq!(scheduler.remaining(), Span::Millis(6_000));
    }

    #[test]
    fn reset_clears_override() {
        let mut scheduler = ModeScheduler::default();
        scheduler.tick(8_000);
        scheduler.frighten();
        scheduler.reset();
        assert!(!scheduler.is_frightened());
        assert_eq!(scheduler.index(), 0);
        assert_eq!(scheduler.remaining(), Span::Millis(7_000));
    }

    proptest! {
        #[test]
        fn phase_matches_cumulative_table(ticks in 0u64..2_000) {
            // 100 ms ticks divide every entry, so no clamping drift
            let mut scheduler = ModeScheduler::default();
            for _ in 0..ticks {
                scheduler.tick(100);
            }
            let (idx, phase) = lookup(ticks * 100);
            prop_assert_eq!(scheduler.index(), idx);
            prop_assert_eq!(scheduler.phase(), phase);
        }

        #[test]
        fn frightened_window_preserves_remaining(
            before in 1u64..60,
            window in 1u64..200,
        ) {
            let mut scheduler = ModeScheduler::new(CLASSIC_TABLE.to_vec(), window * 100);
            for _ in 0..before {
                scheduler.tick(100);
            }
            let remaining = scheduler.remaining();
            let phase = scheduler.phase();
            scheduler.frighten();
            for _ in 0..window {
                scheduler.tick(100);
            }
            prop_assert!(!scheduler.is_frightened());
            prop_assert_eq!(scheduler.remaining(), remaining);
            prop_assert_eq!(scheduler.phase(), phase);
        }
    }
}
