//! Friendship status between the signed-in user and anyone else.
//!
//! Computed from the friends list, the incoming requests and the requests
//! this client has sent. Server-provided `friendship_status` strings are only
//! consulted for users the book knows nothing about.

use std::collections::{HashMap, HashSet};

use crate::models::{Friend, FriendRequest, RequestStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Relationship {
    #[default]
    None,
    PendingOutgoing,
    PendingIncoming,
    Friends,
}

impl Relationship {
    /// Interpret a wire `friendship_status` value.
    pub fn from_wire(status: &str) -> Self {
        match status {
            "friends" | "accepted" => Self::Friends,
            "sent" => Self::PendingOutgoing,
            "pending" => Self::PendingIncoming,
            _ => Self::None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "not friends",
            Self::PendingOutgoing => "request sent",
            Self::PendingIncoming => "request received",
            Self::Friends => "friends",
        }
    }

    /// Whether a new friend request may be sent.
    pub fn can_request(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RelationshipBook {
    friends: HashSet<i64>,
    /// sender user id -> request id
    incoming: HashMap<i64, i64>,
    outgoing: HashSet<i64>,
}

impl RelationshipBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the friends and incoming sets with fresh server lists.
    /// Outgoing requests to users who became friends are dropped.
    pub fn sync(&mut self, friends: &[Friend], requests: &[FriendRequest]) {
        self.friends = friends.iter().map(|f| f.id).collect();
        self.incoming = requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .map(|r| (r.sender_id, r.id))
            .collect();
        let friends = &self.friends;
        self.outgoing.retain(|id| !friends.contains(id));
    }

    pub fn status(&self, user_id: i64) -> Relationship {
        if self.friends.contains(&user_id) {
            Relationship::Friends
        } else if self.incoming.contains_key(&user_id) {
            Relationship::PendingIncoming
        } else if self.outgoing.contains(&user_id) {
            Relationship::PendingOutgoing
        } else {
            Relationship::None
        }
    }

    /// Status with a server hint as fallback for unknown users.
    pub fn status_with_hint(&self, user_id: i64, hint: Option<&str>) -> Relationship {
        match self.status(user_id) {
            Relationship::None => hint.map(Relationship::from_wire).unwrap_or_default(),
            known => known,
        }
    }

    /// Incoming request id from `user_id`, if any.
    pub fn incoming_request(&self, user_id: i64) -> Option<i64> {
        self.incoming.get(&user_id).copied()
    }

    pub fn record_sent(&mut self, user_id: i64) {
        if !self.friends.contains(&user_id) {
            self.outgoing.insert(user_id);
        }
    }

    /// An incoming request was accepted.
    pub fn record_accepted(&mut self, request_id: i64) {
        if let Some(sender) = self.take_incoming(request_id) {
            self.friends.insert(sender);
        }
    }

    pub fn record_rejected(&mut self, request_id: i64) {
        self.take_incoming(request_id);
    }

    pub fn record_removed(&mut self, user_id: i64) {
        self.friends.remove(&user_id);
        self.outgoing.remove(&user_id);
    }

    pub fn friend_count(&self) -> usize {
        self.friends.len()
    }

    pub fn pending_incoming(&self) -> usize {
        self.incoming.len()
    }

    fn take_incoming(&mut self, request_id: i64) -> Option<i64> {
        let sender = self
            .incoming
            .iter()
            .find(|(_, req)| **req == request_id)
            .map(|(&sender, _)| sender)?;
        self.incoming.remove(&sender);
        Some(sender)
    }
}
