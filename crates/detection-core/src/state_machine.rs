//! Dwell-time state machine.
//!
//! Driven by the smoothed signal `s` and the frame time `now`:
//!
//! - `s >= distance_threshold`: back to `Normal`, session cleared.
//! - `s < distance_threshold` with no session: session starts, `Warning`.
//! - `s < distance_threshold` with a session: `duration = now - start`.
//!   Below `time_threshold` it stays `Warning`; at or above it fires a
//!   trigger and moves to `Detected`.
//!
//! What happens after a trigger depends on [`RetriggerPolicy`]:
//! `Periodic` restarts the session at `now`, so another trigger fires after
//! each further `time_threshold` of sustained proximity; `OncePerEpisode`
//! holds `Detected` until the signal rises again.

use handsoff_common::config::{DetectionConfig, RetriggerPolicy};
use handsoff_pose_model::state::{DetectorState, StateTransition};

/// Thresholds and retrigger policy. Immutable for the engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DwellPolicy {
    pub distance_threshold: f64,
    pub time_threshold: f64,
    pub retrigger: RetriggerPolicy,
}

impl From<&DetectionConfig> for DwellPolicy {
    fn from(config: &DetectionConfig) -> Self {
        Self {
            distance_threshold: config.distance_threshold,
            time_threshold: config.time_threshold,
            retrigger: config.retrigger,
        }
    }
}

/// The current proximity episode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScratchSession {
    /// Frame time the session started, `None` when no session is active.
    pub start_time: Option<f64>,
    /// Seconds since `start_time`; 0 without a session.
    pub duration: f64,
}

impl ScratchSession {
    pub fn is_active(&self) -> bool {
        self.start_time.is_some()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Monotonic trigger count. Only an explicit reset lowers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriggerCounter(u64);

impl TriggerCounter {
    pub fn get(&self) -> u64 {
        self.0
    }

    fn increment(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    fn reset(&mut self) {
        self.0 = 0;
    }
}

/// A qualifying `Detected` transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trigger {
    /// Counter value after this trigger.
    pub count: u64,
    /// Dwell that qualified, in seconds.
    pub dwell: f64,
    /// Frame time of the trigger.
    pub at: f64,
}

/// Result of one state machine update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepResult {
    pub transition: Option<StateTransition>,
    pub trigger: Option<Trigger>,
}

/// Mutable dwell-tracking record. Starts in `Normal`.
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    state: DetectorState,
    session: ScratchSession,
    triggers: TriggerCounter,
    last_trigger_time: Option<f64>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn session(&self) -> &ScratchSession {
        &self.session
    }

    pub fn trigger_count(&self) -> u64 {
        self.triggers.get()
    }

    pub fn last_trigger_time(&self) -> Option<f64> {
        self.last_trigger_time
    }

    /// Advance with one smoothed signal sample taken at `now`.
    pub fn update(&mut self, policy: &DwellPolicy, signal: f64, now: f64) -> StepResult {
        if signal >= policy.distance_threshold {
            return self.force_normal();
        }

        let previous = self.state;
        let mut trigger = None;

        match self.session.start_time {
            None => {
                self.session.start_time = Some(now);
                self.session.duration = 0.0;
                self.state = DetectorState::Warning;
            }
            Some(start) => {
                let duration = (now - start).max(0.0);
                self.session.duration = duration;

                if duration < policy.time_threshold {
                    self.state = DetectorState::Warning;
                } else {
                    match policy.retrigger {
                        RetriggerPolicy::Periodic => {
                            trigger = Some(self.fire(duration, now));
                            self.session.start_time = Some(now);
                            self.session.duration = 0.0;
                        }
                        RetriggerPolicy::OncePerEpisode => {
                            if self.state != DetectorState::Detected {
                                trigger = Some(self.fire(duration, now));
                            }
                        }
                    }
                    self.state = DetectorState::Detected;
                }
            }
        }

        StepResult {
            transition: transition(previous, self.state),
            trigger,
        }
    }

    /// Force `Normal` and clear the session, as when the hand leaves or
    /// nobody is in view.
    pub fn force_normal(&mut self) -> StepResult {
        let previous = self.state;
        self.state = DetectorState::Normal;
        self.session.clear();
        StepResult {
            transition: transition(previous, self.state),
            trigger: None,
        }
    }

    /// Reset the trigger counter. State and session are untouched.
    pub fn reset_counter(&mut self) {
        self.triggers.reset();
    }

    fn fire(&mut self, dwell: f64, now: f64) -> Trigger {
        let count = self.triggers.increment();
        self.last_trigger_time = Some(now);
        tracing::debug!(count, dwell, "Dwell threshold reached");
        Trigger {
            count,
            dwell,
            at: now,
        }
    }
}

fn transition(from: DetectorState, to: DetectorState) -> Option<StateTransition> {
    (from != to).then_some(StateTransition { from, to })
}

#[cfg(test)]
mod tests {
    use super::*;
    use DetectorState::{Detected, Normal, Warning};

    fn policy(retrigger: RetriggerPolicy) -> DwellPolicy {
        DwellPolicy {
            distance_threshold: 0.2,
            time_threshold: 2.0,
            retrigger,
        }
    }

    /// Feed `signals` at one-second spacing and collect the states.
    fn run(machine: &mut StateMachine, policy: &DwellPolicy, signals: &[f64]) -> Vec<DetectorState> {
        signals
            .iter()
            .enumerate()
            .map(|(i, s)| {
                machine.update(policy, *s, i as f64);
                machine.state()
            })
            .collect()
    }

    #[test]
    fn first_detection_sequence() {
        for retrigger in [RetriggerPolicy::Periodic, RetriggerPolicy::OncePerEpisode] {
            let mut machine = StateMachine::new();
            let states = run(&mut machine, &policy(retrigger), &[0.5, 0.5, 0.1, 0.1, 0.1]);
            assert_eq!(states, vec![Normal, Normal, Warning, Warning, Detected]);
            assert_eq!(machine.trigger_count(), 1);
            assert_eq!(machine.last_trigger_time(), Some(4.0));
        }
    }

    #[test]
    fn periodic_policy_retriggers_every_time_threshold() {
        let mut machine = StateMachine::new();
        let states = run(
            &mut machine,
            &policy(RetriggerPolicy::Periodic),
            &[0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1],
        );
        // Session restarts at each trigger (t=2, t=4, t=6).
        assert_eq!(
            states,
            vec![Warning, Warning, Detected, Warning, Detected, Warning, Detected]
        );
        assert_eq!(machine.trigger_count(), 3);
        assert_eq!(machine.session().start_time, Some(6.0));
        assert_eq!(machine.session().duration, 0.0);
    }

    #[test]
    fn once_per_episode_policy_holds_detected() {
        let mut machine = StateMachine::new();
        let p = policy(RetriggerPolicy::OncePerEpisode);
        let states = run(&mut machine, &p, &[0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1]);
        assert_eq!(
            states,
            vec![Warning, Warning, Detected, Detected, Detected, Detected, Detected]
        );
        assert_eq!(machine.trigger_count(), 1);
        assert_eq!(machine.session().duration, 6.0);

        // A new episode can fire again.
        machine.update(&p, 0.5, 7.0);
        machine.update(&p, 0.1, 8.0);
        machine.update(&p, 0.1, 10.0);
        assert_eq!(machine.state(), Detected);
        assert_eq!(machine.trigger_count(), 2);
    }

    #[test]
    fn trigger_reports_qualifying_dwell() {
        let mut machine = StateMachine::new();
        let p = policy(RetriggerPolicy::Periodic);
        machine.update(&p, 0.1, 10.0);
        let step = machine.update(&p, 0.1, 12.5);
        let trigger = step.trigger.unwrap();
        assert_eq!(trigger.count, 1);
        assert_eq!(trigger.dwell, 2.5);
        assert_eq!(trigger.at, 12.5);
        assert_eq!(
            step.transition,
            Some(StateTransition {
                from: Warning,
                to: Detected
            })
        );
    }

    #[test]
    fn leaving_clears_session() {
        let mut machine = StateMachine::new();
        let p = policy(RetriggerPolicy::Periodic);
        machine.update(&p, 0.1, 0.0);
        machine.update(&p, 0.1, 1.0);
        let step = machine.update(&p, 0.2, 1.5); // threshold itself is "not near"
        assert_eq!(machine.state(), Normal);
        assert_eq!(*machine.session(), ScratchSession::default());
        assert_eq!(
            step.transition,
            Some(StateTransition {
                from: Warning,
                to: Normal
            })
        );
    }

    #[test]
    fn reset_counter_leaves_state_and_session() {
        let mut machine = StateMachine::new();
        let p = policy(RetriggerPolicy::Periodic);
        run(&mut machine, &p, &[0.1, 0.1, 0.1, 0.1]);
        let state = machine.state();
        let session = *machine.session();
        assert_eq!(machine.trigger_count(), 1);

        machine.reset_counter();
        assert_eq!(machine.trigger_count(), 0);
        assert_eq!(machine.state(), state);
        assert_eq!(*machine.session(), session);
    }

    #[test]
    fn no_transition_reported_when_state_unchanged() {
        let mut machine = StateMachine::new();
        let p = policy(RetriggerPolicy::Periodic);
        assert_eq!(machine.update(&p, 0.5, 0.0), StepResult::default());
        assert!(machine.update(&p, 0.1, 1.0).transition.is_some());
        assert!(machine.update(&p, 0.1, 1.5).transition.is_none());
    }
}
