//! Daemon lifecycle state machine.
//!
//! The controller records what it last observed or did to the daemon. The
//! OS process table stays the source of truth; this state only exists to
//! reject nonsensical sequences (a stop poll with no stop issued, a banner
//! with no launch) and to make the controller's behaviour easy to test.

use super::error::LifecycleError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    #[default]
    NotRunning,
    /// Launched, banner not yet seen (or not observable on this platform)
    Starting,
    Ready,
    StopRequested,
    StoppedConfirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonEvent {
    /// A process-table scan outside of a start or stop sequence
    Observed { running: bool },
    LaunchIssued,
    BannerObserved,
    StartFailed,
    StopIssued,
    ProcessGone,
    StopTimedOut,
}

impl DaemonState {
    /// Whether the daemon is believed to be up
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            DaemonState::Starting | DaemonState::Ready | DaemonState::StopRequested
        )
    }

    /// Apply `event`, returning the next state
    pub fn on(self, event: DaemonEvent) -> Result<DaemonState, LifecycleError> {
        use DaemonEvent::*;
        use DaemonState::*;

        let next = match (self, event) {
            (_, Observed { running: true }) => Ready,
            (_, Observed { running: false }) => NotRunning,
            (NotRunning | StoppedConfirmed, LaunchIssued) => Starting,
            (Starting, BannerObserved) => Ready,
            (Starting, StartFailed) => NotRunning,
            (Ready, StopIssued) => StopRequested,
            (StopRequested, ProcessGone) => StoppedConfirmed,
            (StopRequested, StopTimedOut) => Ready,
            (from, event) => return Err(LifecycleError::InvalidTransition { from, event }),
        };
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_sequence() {
        let state = DaemonState::NotRunning
            .on(DaemonEvent::LaunchIssued)
            .and_then(|s| s.on(DaemonEvent::BannerObserved))
            .unwrap();
        assert_eq!(state, DaemonState::Ready);
        assert!(state.is_running());
    }

    #[test]
    fn test_stop_sequence() {
        let state = DaemonState::Ready
            .on(DaemonEvent::StopIssued)
            .and_then(|s| s.on(DaemonEvent::ProcessGone))
            .unwrap();
        assert_eq!(state, DaemonState::StoppedConfirmed);
        assert!(!state.is_running());

        // A confirmed stop can be started again
        assert_eq!(
            state.on(DaemonEvent::LaunchIssued).unwrap(),
            DaemonState::Starting
        );
    }

    #[test]
    fn test_stop_timeout_returns_to_ready() {
        let state = DaemonState::StopRequested.on(DaemonEvent::StopTimedOut).unwrap();
        assert_eq!(state, DaemonState::Ready);
    }

    #[test]
    fn test_observation_overrides_any_state() {
        for state in [
            DaemonState::NotRunning,
            DaemonState::Starting,
            DaemonState::Ready,
            DaemonState::StoppedConfirmed,
        ] {
            assert_eq!(
                state.on(DaemonEvent::Observed { running: true }).unwrap(),
                DaemonState::Ready
            );
            assert_eq!(
                state.on(DaemonEvent::Observed { running: false }).unwrap(),
                DaemonState::NotRunning
            );
        }
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(matches!(
            DaemonState::NotRunning.on(DaemonEvent::BannerObserved),
            Err(LifecycleError::InvalidTransition { .. })
        ));
        assert!(DaemonState::Ready.on(DaemonEvent::LaunchIssued).is_err());
        assert!(DaemonState::NotRunning.on(DaemonEvent::ProcessGone).is_err());
        assert!(DaemonState::Starting.on(DaemonEvent::StopIssued).is_err());
    }
}
