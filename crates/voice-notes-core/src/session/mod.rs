mod busy_guard;
mod manager;
mod mode;

pub(crate) use busy_guard::BusyGuard;

pub use {
    manager::SessionManager,
    mode::{IgnoreReason, Outcome, SessionMode},
};
