//! Wire events for the realtime channel
//!
//! Frames are JSON objects tagged by an `event` field, e.g.
//! `{"event":"send_message","receiver_id":2,"message":"hello"}`.

use serde::{Deserialize, Serialize};

/// Client-originated events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinUserRoom,
    JoinDm { friend_id: i64 },
    SendFriendRequest { friend_id: i64 },
    AcceptFriendRequest { friend_id: i64 },
    SendMessage { receiver_id: i64, message: String },
}

/// Server-emitted events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    ReceiveFriendRequest { from_id: i64 },
    FriendRequestAccepted { friend_id: i64 },
    NewMessage { sender_id: i64, message: String },
}
