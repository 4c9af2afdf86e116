//! Event dispatcher
//!
//! Applies client events to the stores and fans the resulting server events
//! out to the affected rooms. One event is processed to completion before
//! the next on the same connection; events from different connections
//! interleave freely.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::friends::{AcceptOutcome, FriendStore, RequestOutcome};
use crate::messages::MessageStore;
use crate::realtime::events::{ClientEvent, ServerEvent};
use crate::realtime::{dm_room, user_room, RoomRegistry};

/// Connection-local action requested by an event.
#[derive(Debug, PartialEq, Eq)]
pub enum Subscription {
    Join(String),
    None,
}

pub struct Dispatcher {
    friends: Arc<FriendStore>,
    messages: Arc<MessageStore>,
    rooms: Arc<RoomRegistry>,
}

impl Dispatcher {
    pub fn new(
        friends: Arc<FriendStore>,
        messages: Arc<MessageStore>,
        rooms: Arc<RoomRegistry>,
    ) -> Self {
        Self {
            friends,
            messages,
            rooms,
        }
    }

    /// Process one event from `actor_id`'s connection.
    ///
    /// Store no-ops and failures are logged and swallowed; no event tears
    /// down the connection. Join requests are returned to the connection,
    /// which owns its subscriptions.
    pub async fn handle(&self, actor_id: i64, event: ClientEvent) -> Subscription {
        match event {
            ClientEvent::JoinUserRoom => Subscription::Join(user_room(actor_id)),

            ClientEvent::JoinDm { friend_id } => {
                Subscription::Join(dm_room(actor_id, friend_id))
            }

            ClientEvent::SendFriendRequest { friend_id } => {
                match self.friends.request_friend(actor_id, friend_id).await {
                    Ok(RequestOutcome::Requested) => {
                        self.rooms
                            .publish(
                                &user_room(friend_id),
                                ServerEvent::ReceiveFriendRequest { from_id: actor_id },
                            )
                            .await;
                    }
                    Ok(outcome) => {
                        debug!(
                            "[Realtime] Friend request {} -> {} ignored: {:?}",
                            actor_id, friend_id, outcome
                        );
                    }
                    Err(e) => warn!("[Realtime] Friend request failed: {}", e),
                }
                Subscription::None
            }

            ClientEvent::AcceptFriendRequest { friend_id } => {
                match self.friends.accept_friend(actor_id, friend_id).await {
                    Ok(AcceptOutcome::Accepted) => {
                        // Each side is told the id of its new friend.
                        self.rooms
                            .publish(
                                &user_room(actor_id),
                                ServerEvent::FriendRequestAccepted { friend_id },
                            )
                            .await;
                        self.rooms
                            .publish(
                                &user_room(friend_id),
                                ServerEvent::FriendRequestAccepted {
                                    friend_id: actor_id,
                                },
                            )
                            .await;
                    }
                    Ok(AcceptOutcome::NoPendingRequest) => {
                        debug!(
                            "[Realtime] Accept from {} ignored: no pending request from {}",
                            actor_id, friend_id
                        );
                    }
                    Err(e) => warn!("[Realtime] Accept failed: {}", e),
                }
                Subscription::None
            }

            ClientEvent::SendMessage {
                receiver_id,
                message,
            } => {
                match self.messages.append(actor_id, receiver_id, &message).await {
                    Ok(stored) => {
                        self.rooms
                            .publish(
                                &dm_room(actor_id, receiver_id),
                                ServerEvent::NewMessage {
                                    sender_id: actor_id,
                                    message: stored.body,
                                },
                            )
                            .await;
                    }
                    Err(e) => warn!("[Realtime] Message from {} not stored: {}", actor_id, e),
                }
                Subscription::None
            }
        }
    }
}
