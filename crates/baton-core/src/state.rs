//! Navigation state shared by the store, phase tracker and interceptor
//!
//! One [`NavigationState`] exists per router. It is reached through a
//! [`SharedNavState`] handle that every component receives at construction.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::keys::TransferKey;
use crate::location::Location;

/// Where the most recent payload is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Payload stored, navigation not yet arrived
    Send,
    /// Destination component entered
    Receive,
    /// Transfer complete; the last key is stale
    #[default]
    End,
}

impl Phase {
    /// Phase after a component-enter event
    pub fn on_enter(self) -> Phase {
        match self {
            Phase::Send => Phase::Receive,
            other => other,
        }
    }

    /// Phase after a component-leave event
    pub fn on_leave(self) -> Phase {
        match self {
            Phase::Receive => Phase::End,
            other => other,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Send => "send",
            Phase::Receive => "receive",
            Phase::End => "end",
        };
        f.write_str(label)
    }
}

/// Guard events that drive the phase machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteAction {
    /// A component bound to the destination is about to become active
    Enter,
    /// A component bound to the origin is about to become inactive
    Leave,
}

/// How the current route was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavType {
    /// History traversal with a negative offset
    Back,
    /// History traversal with a positive offset
    Forward,
    /// New history entry
    Push,
    /// Current history entry replaced
    Replace,
    /// First render or hard reload; no wrapped primitive was called
    #[default]
    Load,
}

impl NavType {
    /// Back or forward traversal
    pub fn is_history(self) -> bool {
        matches!(self, NavType::Back | NavType::Forward)
    }
}

/// One argument passed to a wrapped navigation primitive
#[derive(Debug, Clone, PartialEq)]
pub enum NavArgument {
    /// Offset handed to `step`
    Offset(i32),
    /// Target handed to `push_to` or `replace_with`
    Target(Location),
}

/// Most recent navigation intent
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavInfo {
    /// Navigation type
    pub nav_type: NavType,
    /// Arguments of the wrapped call, in order
    pub arguments: Vec<NavArgument>,
}

impl NavInfo {
    /// Intent for a relative history step.
    ///
    /// A zero offset reloads the current entry and is recorded as `Load`.
    pub fn for_step(offset: i32) -> Self {
        let nav_type = match offset {
            o if o < 0 => NavType::Back,
            o if o > 0 => NavType::Forward,
            _ => {
                return Self::default();
            }
        };
        Self {
            nav_type,
            arguments: vec![NavArgument::Offset(offset)],
        }
    }

    /// Intent for a push or replace with its argument list
    pub fn for_call(nav_type: NavType, arguments: Vec<NavArgument>) -> Self {
        Self {
            nav_type,
            arguments,
        }
    }
}

/// Per-router navigation bookkeeping
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavigationState {
    /// Lifecycle phase of the last payload
    pub phase: Phase,
    /// Key of the last stored payload
    pub last_transfer_key: Option<TransferKey>,
    /// Most recent navigation intent
    pub nav_info: NavInfo,
}

impl NavigationState {
    /// Last key, unless its transfer already completed
    pub fn live_transfer_key(&self) -> Option<&TransferKey> {
        if self.phase == Phase::End {
            None
        } else {
            self.last_transfer_key.as_ref()
        }
    }
}

/// Cloneable handle to a router's [`NavigationState`]
#[derive(Debug, Clone, Default)]
pub struct SharedNavState {
    inner: Arc<RwLock<NavigationState>>,
}

impl SharedNavState {
    /// Fresh state: phase `End`, no last key, nav type `Load`
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> NavigationState {
        self.inner.read().clone()
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.inner.read().phase
    }

    /// Stored last key regardless of phase
    pub fn last_transfer_key(&self) -> Option<TransferKey> {
        self.inner.read().last_transfer_key.clone()
    }

    /// Most recent navigation type
    pub fn nav_type(&self) -> NavType {
        self.inner.read().nav_info.nav_type
    }

    /// Most recent navigation intent
    pub fn nav_info(&self) -> NavInfo {
        self.inner.read().nav_info.clone()
    }

    /// Record that a payload was stored under `key`
    pub fn record_send(&self, key: TransferKey) {
        let mut state = self.inner.write();
        state.last_transfer_key = Some(key);
        state.phase = Phase::Send;
    }

    /// Record the intent of the navigation about to be dispatched
    pub fn record_nav(&self, nav_info: NavInfo) {
        self.inner.write().nav_info = nav_info;
    }

    /// Run `f` with exclusive access to the state
    pub fn update<R>(&self, f: impl FnOnce(&mut NavigationState) -> R) -> R {
        f(&mut self.inner.write())
    }
}
