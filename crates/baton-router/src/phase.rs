//! Send/receive/end phase machine and retrieval key selection
//!
//! The data store moves the phase to `send` whenever a payload is written.
//! Guard hooks then drive it through `receive` and `end`. Once a transfer
//! reaches `end`, its key is never handed out again, so a later unrelated
//! visit cannot read a stale payload.

use baton_core::{NavType, Phase, RouteAction, RouteContext, SharedNavState, TransferKey};
use tracing::{debug, trace};

/// Drives the phase of one router's navigation state
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    state: SharedNavState,
}

impl PhaseTracker {
    /// Tracker over the context's navigation state
    pub fn new(context: &RouteContext) -> Self {
        Self {
            state: context.state().clone(),
        }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// A destination component is about to become active
    pub fn on_enter(&self) -> Phase {
        self.route_action(RouteAction::Enter)
    }

    /// An origin component is about to become inactive
    pub fn on_leave(&self) -> Phase {
        self.route_action(RouteAction::Leave)
    }

    /// Apply a guard event; events that do not match the phase are no-ops
    pub fn route_action(&self, action: RouteAction) -> Phase {
        self.state.update(|state| {
            let before = state.phase;
            let after = match action {
                RouteAction::Enter => before.on_enter(),
                RouteAction::Leave => before.on_leave(),
            };
            if before == after {
                trace!(?action, phase = %before, "Route action ignored");
            } else {
                debug!(?action, from = %before, to = %after, "Route data phase changed");
                state.phase = after;
            }
            after
        })
    }

    /// Pick the key a destination should read its payload from.
    ///
    /// History traversal prefers the last stored key, because the target of
    /// `back`/`forward` cannot carry a fresh `dataKey`. Every other navigation
    /// prefers the key the destination was given. The last key only counts
    /// while its transfer has not ended.
    pub fn resolve_retrieval_key(&self, explicit: Option<&str>) -> Option<TransferKey> {
        let snapshot = self.state.snapshot();
        let last = snapshot.live_transfer_key().cloned();
        let explicit = explicit.filter(|key| !key.is_empty()).map(TransferKey::from);
        let nav_type = snapshot.nav_info.nav_type;

        let key = if nav_type.is_history() {
            last.or(explicit)
        } else {
            explicit.or(last)
        };
        trace!(
            nav_type = ?nav_type,
            phase = %snapshot.phase,
            key = ?key.as_ref().map(TransferKey::as_str),
            "Resolved retrieval key"
        );
        key
    }

    /// Most recent navigation type, as recorded by the interceptor
    pub fn nav_type(&self) -> NavType {
        self.state.nav_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baton_core::{Location, NavArgument, NavInfo};

    fn tracker() -> (RouteContext, PhaseTracker) {
        let ctx = RouteContext::default();
        let tracker = PhaseTracker::new(&ctx);
        (ctx, tracker)
    }

    #[test]
    fn full_cycle() {
        let (ctx, tracker) = tracker();
        assert_eq!(tracker.on_enter(), Phase::End);
        assert_eq!(tracker.on_leave(), Phase::End);

        ctx.state().record_send(TransferKey::from("a-b"));
        assert_eq!(tracker.on_leave(), Phase::Send);
        assert_eq!(tracker.on_enter(), Phase::Receive);
        assert_eq!(tracker.on_enter(), Phase::Receive);
        assert_eq!(tracker.on_leave(), Phase::End);
        assert_eq!(tracker.phase(), Phase::End);
    }

    #[test]
    fn repeated_sends_collapse_to_latest() {
        let (ctx, tracker) = tracker();
        ctx.state().record_send(TransferKey::from("a-b"));
        tracker.on_enter();
        ctx.state().record_send(TransferKey::from("c-d"));
        assert_eq!(tracker.phase(), Phase::Send);
        assert_eq!(
            tracker.resolve_retrieval_key(None),
            Some(TransferKey::from("c-d"))
        );
    }

    #[test]
    fn push_prefers_explicit_key() {
        let (ctx, tracker) = tracker();
        ctx.state().record_send(TransferKey::from("last"));
        ctx.state().record_nav(NavInfo::for_call(
            NavType::Push,
            vec![NavArgument::Target(Location::path("/x"))],
        ));
        assert_eq!(
            tracker.resolve_retrieval_key(Some("explicit")),
            Some(TransferKey::from("explicit"))
        );
        assert_eq!(
            tracker.resolve_retrieval_key(None),
            Some(TransferKey::from("last"))
        );
    }

    #[test]
    fn history_prefers_last_key() {
        let (ctx, tracker) = tracker();
        ctx.state().record_send(TransferKey::from("last"));
        ctx.state().record_nav(NavInfo::for_step(-1));
        assert_eq!(
            tracker.resolve_retrieval_key(Some("explicit")),
            Some(TransferKey::from("last"))
        );

        ctx.state().record_nav(NavInfo::for_step(2));
        assert_eq!(
            tracker.resolve_retrieval_key(Some("explicit")),
            Some(TransferKey::from("last"))
        );
    }

    #[test]
    fn ended_transfer_hides_last_key() {
        let (ctx, tracker) = tracker();
        ctx.state().record_send(TransferKey::from("last"));
        tracker.on_enter();
        tracker.on_leave();
        ctx.state().record_nav(NavInfo::for_step(-1));

        assert_eq!(tracker.resolve_retrieval_key(None), None);
        assert_eq!(
            tracker.resolve_retrieval_key(Some("explicit")),
            Some(TransferKey::from("explicit"))
        );
    }

    #[test]
    fn empty_explicit_key_counts_as_absent() {
        let (_ctx, tracker) = tracker();
        assert_eq!(tracker.resolve_retrieval_key(Some("")), None);
    }
}
