//! Playback State Machine
//!
//! 재생 제어: play / pause / resume / reset and the timer-driven advance.
//! Every transition that changes the playing flags or the index outside the
//! fire path goes through `TimerSlot`, so at most one advance is ever pending.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::timer::{Millis, TimerKind, TimerSlot};
use crate::config::ResumePolicy;

/// Observable playback flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct PlaybackState {
    pub is_playing: bool,
    /// Only meaningful while `is_playing`
    pub is_paused: bool,
    /// Sticky until `full_reset`
    pub has_played_once: bool,
    pub current_index: usize,
}

impl PlaybackState {
    pub fn phase(&self) -> PlaybackPhase {
        match (self.is_playing, self.is_paused, self.has_played_once) {
            (true, true, _) => PlaybackPhase::Paused,
            (true, false, _) => PlaybackPhase::Playing,
            (false, _, false) => PlaybackPhase::Idle,
            (false, _, true) => PlaybackPhase::Stopped,
        }
    }

    /// Playing and not paused
    pub fn is_running(&self) -> bool {
        self.is_playing && !self.is_paused
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// Never played; the first-run overlay is shown
    Idle,
    Playing,
    Paused,
    /// Played at least once, not playing now
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    Started,
    Paused { index: usize },
    Resumed { index: usize },
    Advanced { from: usize, to: usize },
    Stepped { from: usize, to: usize },
    Finished { index: usize },
    Reset,
    Rewound,
    TornDown,
}

/// 재생 상태 머신
#[derive(Debug, Clone)]
pub struct PlaybackMachine {
    item_count: usize,
    advance_interval: Millis,
    resume_policy: ResumePolicy,
    state: PlaybackState,
    timer: TimerSlot,
    /// Interval left on the timer when paused, for `ResumePolicy::CarryRemaining`
    paused_remaining: Option<Millis>,
    /// Set when the hold on the last item elapsed
    finished: bool,
    last_now: Millis,
    torn_down: bool,
}

impl PlaybackMachine {
    pub fn new(item_count: usize, advance_interval: Millis, resume_policy: ResumePolicy) -> Self {
        Self {
            item_count,
            advance_interval,
            resume_policy,
            state: PlaybackState::default(),
            timer: TimerSlot::new(),
            paused_remaining: None,
            finished: false,
            last_now: 0,
            torn_down: false,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.state.phase()
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn advance_interval(&self) -> Millis {
        self.advance_interval
    }

    pub fn timer(&self) -> &TimerSlot {
        &self.timer
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Fraction of the roster reached. 0.0 when empty or when no run is in
    /// progress or finished.
    pub fn progress(&self) -> f32 {
        if self.item_count == 0 || !(self.state.is_playing || self.finished) {
            return 0.0;
        }
        (self.state.current_index + 1) as f32 / self.item_count as f32
    }

    /// 재생 시작. From `Paused` this resumes; otherwise it starts a fresh run
    /// at index 0.
    pub fn play(&mut self, now: Millis) -> Option<PlaybackEvent> {
        let now = self.observe_time(now);
        if self.torn_down {
            return None;
        }
        if self.item_count == 0 {
            log::debug!("play ignored: roster has no slots");
            return None;
        }
        if self.state.phase() == PlaybackPhase::Paused {
            return self.resume(now);
        }

        self.state = PlaybackState {
            is_playing: true,
            is_paused: false,
            has_played_once: true,
            current_index: 0,
        };
        self.paused_remaining = None;
        self.finished = false;
        self.arm_next(now, self.advance_interval);
        log::info!("Playback started ({} items, {}ms interval)", self.item_count, self.advance_interval);
        Some(PlaybackEvent::Started)
    }

    /// 일시정지
    pub fn pause(&mut self, now: Millis) -> Option<PlaybackEvent> {
        let now = self.observe_time(now);
        if self.torn_down || self.state.phase() != PlaybackPhase::Playing {
            return None;
        }

        self.paused_remaining = self.timer.remaining(now);
        self.timer.cancel();
        self.state.is_paused = true;
        log::debug!("Paused at index {}", self.state.current_index);
        Some(PlaybackEvent::Paused { index: self.state.current_index })
    }

    pub fn resume(&mut self, now: Millis) -> Option<PlaybackEvent> {
        let now = self.observe_time(now);
        if self.torn_down || self.state.phase() != PlaybackPhase::Paused {
            return None;
        }

        let delay = match (self.resume_policy, self.paused_remaining.take()) {
            (ResumePolicy::CarryRemaining, Some(remaining)) => remaining,
            _ => self.advance_interval,
        };
        self.state.is_paused = false;
        self.arm_next(now, delay);
        log::debug!("Resumed at index {} ({}ms to next fire)", self.state.current_index, delay);
        Some(PlaybackEvent::Resumed { index: self.state.current_index })
    }

    /// 정지 (처음으로). Keeps `has_played_once`.
    pub fn reset(&mut self) -> Option<PlaybackEvent> {
        if self.torn_down {
            return None;
        }
        self.timer.cancel();
        self.paused_remaining = None;
        self.finished = false;
        self.state.is_playing = false;
        self.state.is_paused = false;
        self.state.current_index = 0;
        log::debug!("Playback reset");
        Some(PlaybackEvent::Reset)
    }

    /// Back to the never-played state, as if the view had just been mounted
    pub fn full_reset(&mut self) -> Option<PlaybackEvent> {
        if self.torn_down {
            return None;
        }
        self.timer.cancel();
        self.paused_remaining = None;
        self.finished = false;
        self.state = PlaybackState::default();
        log::debug!("Playback rewound to idle");
        Some(PlaybackEvent::Rewound)
    }

    /// Cancel the timer for good; every later command and tick is ignored
    pub fn teardown(&mut self) -> Option<PlaybackEvent> {
        if self.torn_down {
            return None;
        }
        self.timer.cancel();
        self.paused_remaining = None;
        self.torn_down = true;
        Some(PlaybackEvent::TornDown)
    }

    /// Fire the pending timer if it is due at `now`. At most one fire per
    /// call; callers loop to catch up after a long gap.
    pub fn fire_due(&mut self, now: Millis) -> Option<PlaybackEvent> {
        let now = self.observe_time(now);
        if self.torn_down || !self.state.is_running() {
            return None;
        }
        let timer = self.timer.take_due(now)?;

        match timer.kind {
            TimerKind::Advance => {
                let from = self.state.current_index;
                let to = (from + 1).min(self.item_count.saturating_sub(1));
                self.state.current_index = to;
                // Re-arm from the due time so late ticks don't drift the schedule
                self.arm_next(timer.due_at, self.advance_interval);
                log::debug!("Advanced {} -> {}", from, to);
                Some(PlaybackEvent::Advanced { from, to })
            }
            TimerKind::Finish => {
                self.state.is_playing = false;
                self.state.is_paused = false;
                self.finished = true;
                log::info!("Playback finished on index {}", self.state.current_index);
                Some(PlaybackEvent::Finished { index: self.state.current_index })
            }
        }
    }

    /// Manual next. Clamped to the last item; while running the single timer
    /// is replaced with a fresh interval from `now`.
    pub fn step_forward(&mut self, now: Millis) -> Option<PlaybackEvent> {
        let target = (self.state.current_index + 1).min(self.item_count.saturating_sub(1));
        self.step_to(now, target)
    }

    /// Manual previous, clamped to the first item
    pub fn step_back(&mut self, now: Millis) -> Option<PlaybackEvent> {
        let target = self.state.current_index.saturating_sub(1);
        self.step_to(now, target)
    }

    fn step_to(&mut self, now: Millis, to: usize) -> Option<PlaybackEvent> {
        let now = self.observe_time(now);
        let from = self.state.current_index;
        if self.torn_down || self.item_count == 0 || to == from {
            return None;
        }

        self.state.current_index = to;
        self.finished = false;
        if self.state.is_running() {
            self.timer.cancel();
            self.arm_next(now, self.advance_interval);
        } else {
            // Paused: the saved remainder belonged to the old item
            self.paused_remaining = None;
        }
        log::debug!("Stepped {} -> {}", from, to);
        Some(PlaybackEvent::Stepped { from, to })
    }

    /// Fire every timer due at `now`, in order
    pub fn tick(&mut self, now: Millis) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.fire_due(now) {
            events.push(event);
        }
        events
    }

    fn arm_next(&mut self, from: Millis, delay: Millis) {
        let kind = if self.state.current_index + 1 >= self.item_count {
            TimerKind::Finish
        } else {
            TimerKind::Advance
        };
        self.timer.arm(from, delay, kind);
    }

    fn observe_time(&mut self, now: Millis) -> Millis {
        // Clock readings never move backwards inside the machine
        self.last_now = self.last_now.max(now);
        self.last_now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const INTERVAL: Millis = 4000;

    fn machine(n: usize) -> PlaybackMachine {
        PlaybackMachine::new(n, INTERVAL, ResumePolicy::RestartInterval)
    }

    #[test]
    fn test_initial_state_is_idle() {
        let m = machine(5);
        assert_eq!(m.phase(), PlaybackPhase::Idle);
        assert_eq!(*m.state(), PlaybackState::default());
        assert!(!m.timer().is_armed());
    }

    #[test]
    fn test_advance_then_hold_then_stop() {
        let mut m = machine(5);
        assert_eq!(m.play(0), Some(PlaybackEvent::Started));

        let mut now = 0;
        for expected in 1..5 {
            now += INTERVAL;
            assert_eq!(m.tick(now), vec![PlaybackEvent::Advanced { from: expected - 1, to: expected }]);
            assert_eq!(m.state().current_index, expected);
            assert!(m.state().is_playing);
        }

        now += INTERVAL - 1;
        assert!(m.tick(now).is_empty(), "last item holds for a full interval");

        now += 1;
        assert_eq!(m.tick(now), vec![PlaybackEvent::Finished { index: 4 }]);
        assert!(!m.state().is_playing);
        assert!(m.state().has_played_once);
        assert_eq!(m.state().current_index, 4);
        assert_eq!(m.phase(), PlaybackPhase::Stopped);
        assert!(!m.timer().is_armed());

        assert!(m.tick(now + 10 * INTERVAL).is_empty());
        assert_eq!(m.state().current_index, 4);
    }

    #[test]
    fn test_long_gap_fires_in_sequence() {
        let mut m = machine(3);
        m.play(0);
        let events = m.tick(10 * INTERVAL);
        assert_eq!(
            events,
            vec![
                PlaybackEvent::Advanced { from: 0, to: 1 },
                PlaybackEvent::Advanced { from: 1, to: 2 },
                PlaybackEvent::Finished { index: 2 },
            ]
        );
    }

    #[test]
    fn test_single_item_roster_holds_then_stops() {
        let mut m = machine(1);
        m.play(0);
        assert_eq!(m.timer().pending().map(|t| t.kind), Some(TimerKind::Finish));
        assert_eq!(m.tick(INTERVAL), vec![PlaybackEvent::Finished { index: 0 }]);
    }

    #[test]
    fn test_play_on_empty_roster_is_noop() {
        let mut m = machine(0);
        assert_eq!(m.play(0), None);
        assert_eq!(m.phase(), PlaybackPhase::Idle);
        assert!(!m.timer().is_armed());
        assert_eq!(m.progress(), 0.0);
    }

    #[test]
    fn test_pause_keeps_index_and_stops_advancing() {
        let mut m = machine(5);
        m.play(0);
        m.tick(INTERVAL);
        assert_eq!(m.pause(INTERVAL + 100), Some(PlaybackEvent::Paused { index: 1 }));
        assert_eq!(m.phase(), PlaybackPhase::Paused);
        assert!(!m.timer().is_armed());

        assert!(m.tick(100 * INTERVAL).is_empty());
        assert_eq!(m.state().current_index, 1);
    }

    #[test]
    fn test_resume_restarts_full_interval() {
        let mut m = machine(5);
        m.play(0);
        m.pause(3000);
        m.resume(10_000);
        assert!(m.tick(10_000 + INTERVAL - 1).is_empty());
        assert_eq!(m.tick(10_000 + INTERVAL), vec![PlaybackEvent::Advanced { from: 0, to: 1 }]);
    }

    #[test]
    fn test_resume_carries_remaining_interval() {
        let mut m = PlaybackMachine::new(5, INTERVAL, ResumePolicy::CarryRemaining);
        m.play(0);
        m.pause(3000);
        m.resume(10_000);
        assert_eq!(m.timer().pending().map(|t| t.due_at), Some(11_000));
        assert_eq!(m.tick(11_000), vec![PlaybackEvent::Advanced { from: 0, to: 1 }]);
        // Later intervals are full again
        assert_eq!(m.timer().pending().map(|t| t.due_at), Some(15_000));
    }

    #[test]
    fn test_play_from_paused_resumes_without_rewinding() {
        let mut m = machine(5);
        m.play(0);
        m.tick(2 * INTERVAL);
        m.pause(2 * INTERVAL);
        assert_eq!(m.play(2 * INTERVAL + 5), Some(PlaybackEvent::Resumed { index: 2 }));
        assert_eq!(m.state().current_index, 2);
        assert_eq!(m.phase(), PlaybackPhase::Playing);
    }

    #[test]
    fn test_play_after_finish_starts_fresh() {
        let mut m = machine(2);
        m.play(0);
        m.tick(10 * INTERVAL);
        assert_eq!(m.phase(), PlaybackPhase::Stopped);
        assert_eq!(m.play(10 * INTERVAL), Some(PlaybackEvent::Started));
        assert_eq!(m.state().current_index, 0);
        assert!(m.state().is_playing);
    }

    #[test]
    fn test_pause_and_resume_are_idempotent() {
        let mut m = machine(5);
        assert_eq!(m.pause(0), None, "pause while idle");
        assert_eq!(m.resume(0), None, "resume while idle");

        m.play(0);
        let armed = m.timer().armed_total();
        assert_eq!(m.resume(10), None, "resume while playing");
        assert_eq!(m.timer().armed_total(), armed);

        m.pause(20);
        let snapshot = *m.state();
        assert_eq!(m.pause(30), None, "pause while paused");
        assert_eq!(*m.state(), snapshot);
        assert!(!m.timer().is_armed());
    }

    #[test]
    fn test_reset_keeps_played_flag() {
        let mut m = machine(4);
        m.play(0);
        m.tick(2 * INTERVAL);
        assert_eq!(m.reset(), Some(PlaybackEvent::Reset));

        let state = m.state();
        assert!(!state.is_playing);
        assert!(!state.is_paused);
        assert_eq!(state.current_index, 0);
        assert!(state.has_played_once);
        assert_eq!(m.phase(), PlaybackPhase::Stopped);
        assert!(!m.timer().is_armed());
    }

    #[test]
    fn test_reset_before_first_play_stays_idle() {
        let mut m = machine(4);
        m.reset();
        assert_eq!(m.phase(), PlaybackPhase::Idle);
    }

    #[test]
    fn test_full_reset_returns_to_idle() {
        let mut m = machine(4);
        m.play(0);
        m.tick(INTERVAL);
        assert_eq!(m.full_reset(), Some(PlaybackEvent::Rewound));
        assert_eq!(*m.state(), PlaybackState::default());
        assert_eq!(m.phase(), PlaybackPhase::Idle);
    }

    #[test]
    fn test_teardown_makes_machine_inert() {
        let mut m = machine(4);
        m.play(0);
        assert_eq!(m.teardown(), Some(PlaybackEvent::TornDown));
        assert!(!m.timer().is_armed());
        assert!(m.tick(100 * INTERVAL).is_empty());
        assert_eq!(m.play(0), None);
        assert_eq!(m.reset(), None);
        assert_eq!(m.teardown(), None);
        assert_eq!(m.state().current_index, 0);
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut m = machine(4);
        m.play(5000);
        assert!(m.tick(1000).is_empty());
        assert_eq!(m.tick(9000).len(), 1);
    }

    #[test]
    fn test_progress() {
        let mut m = machine(4);
        assert_eq!(m.progress(), 0.0, "never played");
        m.play(0);
        assert_eq!(m.progress(), 0.25);
        m.tick(INTERVAL);
        assert_eq!(m.progress(), 0.5);
        m.pause(INTERVAL);
        assert_eq!(m.progress(), 0.5);

        m.reset();
        assert_eq!(m.progress(), 0.0, "reset");

        m.play(INTERVAL);
        m.tick(10 * INTERVAL);
        assert_eq!(m.phase(), PlaybackPhase::Stopped);
        assert_eq!(m.progress(), 1.0, "finished run");
    }

    #[test]
    fn test_step_clamps_at_both_ends() {
        let mut m = machine(3);
        assert_eq!(m.step_back(0), None);
        assert_eq!(m.state().current_index, 0);

        assert_eq!(m.step_forward(0), Some(PlaybackEvent::Stepped { from: 0, to: 1 }));
        assert_eq!(m.step_forward(0), Some(PlaybackEvent::Stepped { from: 1, to: 2 }));
        assert_eq!(m.step_forward(0), None);
        assert_eq!(m.state().current_index, 2);

        assert_eq!(m.step_back(0), Some(PlaybackEvent::Stepped { from: 2, to: 1 }));
        // Stepping while idle does not start playback
        assert_eq!(m.phase(), PlaybackPhase::Idle);
        assert!(!m.timer().is_armed());
    }

    #[test]
    fn test_step_while_running_rearms_single_timer() {
        let mut m = machine(4);
        m.play(0);
        let armed = m.timer().armed_total();

        m.step_forward(1000);
        assert_eq!(m.timer().armed_total(), armed + 1);
        assert_eq!(m.timer().pending().map(|t| t.due_at), Some(1000 + INTERVAL));
        assert_eq!(m.timer().pending().map(|t| t.kind), Some(TimerKind::Advance));

        // Onto the last slot: the replacement timer is the finish hold
        m.step_forward(2000);
        m.step_forward(3000);
        assert_eq!(m.state().current_index, 3);
        assert_eq!(m.timer().pending().map(|t| t.kind), Some(TimerKind::Finish));

        assert!(m.tick(3000 + INTERVAL - 1).is_empty());
        assert_eq!(m.tick(3000 + INTERVAL), vec![PlaybackEvent::Finished { index: 3 }]);
    }

    #[test]
    fn test_step_while_paused_stays_paused() {
        let mut m = PlaybackMachine::new(4, INTERVAL, ResumePolicy::CarryRemaining);
        m.play(0);
        m.pause(3000);
        assert!(m.step_forward(3500).is_some());
        assert_eq!(m.phase(), PlaybackPhase::Paused);
        assert!(!m.timer().is_armed());

        // The carried remainder belonged to the old item
        m.resume(5000);
        assert_eq!(m.timer().pending().map(|t| t.due_at), Some(5000 + INTERVAL));
    }

    #[derive(Debug, Clone, Copy)]
    enum Command {
        Play,
        Pause,
        Resume,
        Reset,
        StepForward,
        StepBack,
        Wait(Millis),
    }

    fn command_strategy() -> impl Strategy<Value = Command> {
        prop_oneof![
            Just(Command::Play),
            Just(Command::Pause),
            Just(Command::Resume),
            Just(Command::Reset),
            Just(Command::StepForward),
            Just(Command::StepBack),
            (0u64..3 * INTERVAL).prop_map(Command::Wait),
        ]
    }

    fn policy_strategy() -> impl Strategy<Value = ResumePolicy> {
        prop_oneof![Just(ResumePolicy::RestartInterval), Just(ResumePolicy::CarryRemaining)]
    }

    proptest! {
        /// Whatever the command history, one interval of wall time produces
        /// at most one advance.
        #[test]
        fn prop_one_interval_one_advance(
            commands in proptest::collection::vec(command_strategy(), 0..40),
            policy in policy_strategy(),
            n in 1usize..12,
        ) {
            let mut m = PlaybackMachine::new(n, INTERVAL, policy);
            let mut now: Millis = 0;
            for command in commands {
                match command {
                    Command::Play => { m.play(now); }
                    Command::Pause => { m.pause(now); }
                    Command::Resume => { m.resume(now); }
                    Command::Reset => { m.reset(); }
                    Command::StepForward => { m.step_forward(now); }
                    Command::StepBack => { m.step_back(now); }
                    Command::Wait(ms) => { now += ms; m.tick(now); }
                }
                // Armed exactly when running
                prop_assert_eq!(m.timer().is_armed(), m.state().is_running());
                prop_assert!(m.state().current_index < n);
            }

            let before = m.state().current_index;
            let events = m.tick(now + INTERVAL - 1);
            let advances = events.iter().filter(|e| matches!(e, PlaybackEvent::Advanced { .. })).count();
            prop_assert!(advances <= 1);
            prop_assert!(m.state().current_index <= before + 1);
        }

        #[test]
        fn prop_index_moves_by_one(n in 1usize..12, waits in proptest::collection::vec(1u64..2 * INTERVAL, 1..30)) {
            let mut m = machine(n);
            m.play(0);
            let mut now = 0;
            for wait in waits {
                now += wait;
                for event in m.tick(now) {
                    if let PlaybackEvent::Advanced { from, to } = event {
                        prop_assert_eq!(to, from + 1);
                    }
                }
            }
        }
    }
}
