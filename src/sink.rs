//! Collaborator interfaces on the output side of the engine
//!
//! The engine itself never talks to the input subsystem or the power
//! management core directly; consumers plug in these traits.

use crate::sensor::LidState;

/// Consumer of reconciled lid switch events
///
/// Modeled after an input-subsystem switch: the engine only reports actual
/// transitions, so a delivered value always differs from the previous one.
/// Delivery is fire-and-forget and must not block; the engine may hold its
/// state lock across the call.
pub trait EventSink: Send + Sync {
    fn notify_on_change(&self, state: LidState);
}

/// Platform wake indication
///
/// Called when a raw evaluation observes the lid open on the notification
/// path, so a wakeup-worthy event is registered with the platform before the
/// switch event goes out. Synthesized compensation events never signal this.
pub trait WakeSignal: Send + Sync {
    fn signal_wakeup(&self);
}
