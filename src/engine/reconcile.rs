//! Lid switch reconciliation
//!
//! Firmware lid devices misbehave in documented ways: some return a bogus
//! initial state after boot or resume, some never send the open notification,
//! some keep reporting closed forever. This module turns that unreliable
//! stream into trustworthy transition events.
//!
//! # How It Works
//!
//! 1. **Debounce**: under the `ignore` policy, a report that merely repeats
//!    the last value within the report interval is suppressed, so chatty
//!    hardware cannot flood consumers.
//!
//! 2. **Decay**: the same value repeating for longer than the report interval
//!    is the signature of firmware that never fires the complementary
//!    transition. Under `ignore`, a one-shot compensating `open` pulse is
//!    injected immediately before a repeated `closed` - and only for
//!    `closed`. Buggy firmware is trusted to mean "closed" but not "open": a
//!    fabricated open merely unsticks the consumer's state machine, while a
//!    fabricated closed could trigger real power actions.
//!
//! 3. **Initial-state policy**: per-machine startup behavior (report nothing,
//!    assume open, or query the hardware), resolved from the quirk table.
//!
//! Both the raw-evaluation path and asynchronous notifications funnel through
//! one entry point sharing a single last-state/last-time pair; the decisions
//! above depend on that conflation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::{self, InitialStatePolicy};
use crate::error::{LidwatchError, Result};
use crate::identity::SystemIdentity;
use crate::sensor::{LidState, LidStateSource};
use crate::sink::{EventSink, WakeSignal};
use crate::status::LidStatus;

/// Set while a monitor bound via [`LidMonitor::bind`] is alive. A machine is
/// assumed to have a single lid.
static AUTHORITATIVE: AtomicBool = AtomicBool::new(false);

/// Last reconciled value and when it was recorded. Only ever written as a
/// pair.
#[derive(Debug, Clone, Copy)]
struct Reported {
    state: LidState,
    at: Instant,
}

#[derive(Debug)]
struct SensorState {
    reported: Reported,
    /// Last value the sink actually saw; switch consumers treat repeats as
    /// redundant, so the engine filters them here.
    sink_seen: Option<LidState>,
    initialized: bool,
    suspended: bool,
}

/// The lid state reconciliation engine
///
/// Owns one logical lid sensor. All mutable state sits behind one lock, held
/// for the duration of a single invocation; sink delivery is fire-and-forget
/// so the lock is held across it.
pub struct LidMonitor {
    source: Box<dyn LidStateSource>,
    sink: Box<dyn EventSink>,
    wake: Option<Box<dyn WakeSignal>>,
    policy: InitialStatePolicy,
    state: Mutex<SensorState>,
    /// One-shot guard for the non-compliant-firmware warning
    warned_noncompliant: AtomicBool,
    bound_flag: Option<&'static AtomicBool>,
}

impl LidMonitor {
    /// Create a monitor with an explicit policy
    ///
    /// `Disabled` machines must never get a monitor, so that policy is
    /// rejected here. This constructor does not claim process-wide
    /// authority; use [`LidMonitor::bind`] for that.
    pub fn new(
        source: Box<dyn LidStateSource>,
        sink: Box<dyn EventSink>,
        wake: Option<Box<dyn WakeSignal>>,
        policy: InitialStatePolicy,
    ) -> Result<Self> {
        if policy == InitialStatePolicy::Disabled {
            return Err(LidwatchError::SensorDisabled);
        }
        Ok(Self {
            source,
            sink,
            wake,
            policy,
            state: Mutex::new(SensorState {
                reported: Reported {
                    state: LidState::Closed,
                    at: Instant::now(),
                },
                sink_seen: None,
                initialized: false,
                suspended: false,
            }),
            warned_noncompliant: AtomicBool::new(false),
            bound_flag: None,
        })
    }

    /// Bind the process-wide authoritative monitor
    ///
    /// Resolves the initial-state policy for `identity` (forced value, quirk
    /// table, or the `method` default). Fails with [`LidwatchError::SensorDisabled`]
    /// when the policy forbids attaching a sensor, and with
    /// [`LidwatchError::DuplicateSensor`] when a monitor is already bound -
    /// the first one wins. Dropping the monitor releases the binding.
    pub fn bind(
        source: Box<dyn LidStateSource>,
        sink: Box<dyn EventSink>,
        wake: Option<Box<dyn WakeSignal>>,
        identity: &SystemIdentity,
    ) -> Result<Self> {
        let policy = config::resolved_policy(identity);
        Self::bind_with(source, sink, wake, policy, &AUTHORITATIVE)
    }

    fn bind_with(
        source: Box<dyn LidStateSource>,
        sink: Box<dyn EventSink>,
        wake: Option<Box<dyn WakeSignal>>,
        policy: InitialStatePolicy,
        flag: &'static AtomicBool,
    ) -> Result<Self> {
        if policy == InitialStatePolicy::Disabled {
            return Err(LidwatchError::SensorDisabled);
        }
        if flag.swap(true, Ordering::SeqCst) {
            return Err(LidwatchError::DuplicateSensor);
        }
        let mut monitor = match Self::new(source, sink, wake, policy) {
            Ok(m) => m,
            Err(e) => {
                flag.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };
        monitor.bound_flag = Some(flag);
        info!(policy = policy.as_str(), "lid monitor bound");
        Ok(monitor)
    }

    /// Ask the platform for the current raw lid state
    ///
    /// Failure means "unknown", never "closed".
    pub fn evaluate_raw(&self) -> Result<LidState> {
        self.source.query_raw()
    }

    /// Feed one observed state into the reconciliation state machine
    ///
    /// Called from both the raw-evaluation path and asynchronous hardware
    /// notifications. Decides whether the observation is delivered, whether
    /// a compensating pulse precedes it, or whether it is dropped as a rapid
    /// repeat.
    pub fn notify_state(&self, observed: LidState, now: Instant) {
        let mut st = self.state.lock();
        self.notify_locked(&mut st, observed, now);
    }

    /// Reconciliation core; caller holds the state lock
    fn notify_locked(&self, st: &mut SensorState, observed: LidState, now: Instant) {
        let changed = st.reported.state != observed;
        // Under `ignore`, last_time is only advanced on a timeout or an
        // actual switch; advancing it on every repeat would let a missing
        // "open" starve the next "close" forever.
        let mut do_update = self.policy != InitialStatePolicy::Ignore || changed;

        let decayed =
            now.saturating_duration_since(st.reported.at) > config::report_interval();
        if !changed && decayed {
            if !self.warned_noncompliant.swap(true, Ordering::Relaxed) {
                warn!("lid device keeps repeating one state; firmware is not switch-compliant");
            }
            if self.policy == InitialStatePolicy::Ignore {
                do_update = true;
                // Only the open complement is safe to fabricate: closed
                // reports from buggy firmware are trustworthy, open reports
                // are not, and a wrong closed could power the machine down.
                if observed == LidState::Closed {
                    self.deliver(&mut st.sink_seen, LidState::Open);
                }
            }
        }

        if do_update {
            self.deliver(&mut st.sink_seen, observed);
            st.reported = Reported { state: observed, at: now };
        }
    }

    /// Report a value to the sink unless it would repeat the last delivery
    fn deliver(&self, sink_seen: &mut Option<LidState>, value: LidState) {
        if *sink_seen == Some(value) {
            return;
        }
        debug!(state = value.as_str(), "lid switch event");
        self.sink.notify_on_change(value);
        *sink_seen = Some(value);
    }

    /// Raw evaluation path shared by notifications and open/resume; caller
    /// holds the state lock. The raw query and the wake/sink callbacks are
    /// fast and non-blocking, so holding the lock across them keeps one
    /// invocation serialized end to end.
    fn update_locked(&self, st: &mut SensorState, signal_wakeup: bool) -> Result<()> {
        let observed = self.evaluate_raw()?;
        if observed == LidState::Open && signal_wakeup {
            if let Some(wake) = &self.wake {
                wake.signal_wakeup();
            }
        }
        self.notify_locked(st, observed, Instant::now());
        Ok(())
    }

    /// Asynchronous hardware notification entry point
    ///
    /// Notifications racing device setup are dropped until the startup
    /// policy has been applied; the gate and the update run under one lock
    /// acquisition so nothing interleaves between them. A failed raw read
    /// suppresses delivery for this invocation only; the next stimulus
    /// retries naturally.
    pub fn handle_notification(&self) {
        let mut st = self.state.lock();
        if !st.initialized {
            debug!("lid notification before initialization, dropped");
            return;
        }
        if let Err(e) = self.update_locked(&mut st, true) {
            debug!(error = %e, "lid notification could not read raw state");
        }
    }

    /// Apply the initial-state policy
    ///
    /// Runs once when the consumer first opens the sensor and again on every
    /// resume.
    pub fn initialize(&self) {
        let mut st = self.state.lock();
        self.initialize_locked(&mut st);
    }

    fn initialize_locked(&self, st: &mut SensorState) {
        match self.policy {
            InitialStatePolicy::AssumeOpen => {
                self.notify_locked(st, LidState::Open, Instant::now());
            }
            InitialStatePolicy::QueryMethod => {
                if let Err(e) = self.update_locked(st, false) {
                    debug!(error = %e, "initial lid state query failed, no event");
                }
            }
            // `ignore` reports nothing at startup; `disabled` never gets a
            // monitor.
            InitialStatePolicy::Ignore | InitialStatePolicy::Disabled => {}
        }
        st.initialized = true;
    }

    /// Consumer-open hook
    ///
    /// Re-derives the last reconciled state from a fresh raw read and
    /// re-applies the startup policy.
    pub fn on_open(&self) {
        let mut st = self.state.lock();
        self.reset_locked(&mut st);
        self.initialize_locked(&mut st);
    }

    pub fn suspend(&self) {
        self.state.lock().suspended = true;
    }

    /// Resume from suspend
    ///
    /// Resets the last-state/last-time pair before re-initializing, so time
    /// spent suspended never counts toward the report interval.
    pub fn resume(&self) {
        let mut st = self.state.lock();
        st.suspended = false;
        self.reset_locked(&mut st);
        self.initialize_locked(&mut st);
    }

    fn reset_locked(&self, st: &mut SensorState) {
        // A failed read defaults to open, the safe assumption.
        let state = self.evaluate_raw().unwrap_or(LidState::Open);
        st.reported = Reported { state, at: Instant::now() };
    }

    /// Live status for introspection
    ///
    /// Always a fresh raw query, never the reconciled cache, so the answer
    /// cannot lie while the debounce logic is mid-decision.
    pub fn status(&self) -> LidStatus {
        self.evaluate_raw().into()
    }

    pub fn policy(&self) -> InitialStatePolicy {
        self.policy
    }

    pub fn is_suspended(&self) -> bool {
        self.state.lock().suspended
    }

    /// Last value recorded by the reconciliation state machine
    pub fn last_reported(&self) -> LidState {
        self.state.lock().reported.state
    }
}

impl Drop for LidMonitor {
    fn drop(&mut self) {
        if let Some(flag) = self.bound_flag {
            flag.store(false, Ordering::SeqCst);
        }
    }
}
