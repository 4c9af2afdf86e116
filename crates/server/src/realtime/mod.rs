//! Realtime rooms and event dispatch
//!
//! Rooms are process-local broadcast channels: `user:<id>` carries targeted
//! notifications (incoming friend requests, acceptances) and
//! `dm:<min>:<max>` carries one conversation. Membership lives only as long
//! as a connection; clients re-join after reconnecting.

pub mod events;

mod dispatcher;
mod registry;
mod ws;

pub use dispatcher::{Dispatcher, Subscription};
pub use events::{ClientEvent, ServerEvent};
pub use registry::RoomRegistry;
pub use ws::realtime_ws;

/// Personal notification room for a user.
pub fn user_room(user_id: i64) -> String {
    format!("user:{user_id}")
}

/// Conversation room for an unordered user pair, canonicalized (min, max).
pub fn dm_room(a: i64, b: i64) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("dm:{lo}:{hi}")
}
