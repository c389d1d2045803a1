/// Per-connection lifecycle: `Connecting -> Authorizing -> Subscribed -> Closed`.
///
/// Each transition is a method; anything not listed below is refused. Closing
/// is accepted from every state and is a no-op once closed.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    Connecting { room_id: i64 },
    Authorizing { room_id: i64, user_id: i64 },
    Subscribed(Subscription),
    Closed,
}

/// Grant produced by a successful authorization.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub room_id: i64,
    pub user_id: i64,
    pub display_name: String,
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("cannot {transition} a connection that is {state}")]
pub struct InvalidTransition {
    pub transition: &'static str,
    pub state: &'static str,
}

impl ConnectionState {
    pub fn connecting(room_id: i64) -> Self {
        ConnectionState::Connecting { room_id }
    }

    fn name(&self) -> &'static str {
        match self {
            ConnectionState::Connecting { .. } => "connecting",
            ConnectionState::Authorizing { .. } => "authorizing",
            ConnectionState::Subscribed(_) => "subscribed",
            ConnectionState::Closed => "closed",
        }
    }

    fn refuse(&self, transition: &'static str) -> InvalidTransition {
        InvalidTransition { transition, state: self.name() }
    }

    /// An authenticated identity is attached to the connection.
    pub fn begin_authorization(&mut self, user_id: i64) -> Result<(), InvalidTransition> {
        match *self {
            ConnectionState::Connecting { room_id } => {
                *self = ConnectionState::Authorizing { room_id, user_id };
                Ok(())
            }
            _ => Err(self.refuse("authorize")),
        }
    }

    /// The room accepted the identity; the grant must be for the same room and user.
    pub fn subscribe(&mut self, subscription: Subscription) -> Result<(), InvalidTransition> {
        match *self {
            ConnectionState::Authorizing { room_id, user_id }
                if room_id == subscription.room_id && user_id == subscription.user_id =>
            {
                *self = ConnectionState::Subscribed(subscription);
                Ok(())
            }
            _ => Err(self.refuse("subscribe")),
        }
    }

    /// Returns the subscription that was live, if any, so the caller can leave its group.
    pub fn close(&mut self) -> Option<Subscription> {
        match std::mem::replace(self, ConnectionState::Closed) {
            ConnectionState::Subscribed(subscription) => Some(subscription),
            _ => None,
        }
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        match self {
            ConnectionState::Subscribed(subscription) => Some(subscription),
            _ => None,
        }
    }

    pub fn room_id(&self) -> Option<i64> {
        match self {
            ConnectionState::Connecting { room_id } | ConnectionState::Authorizing { room_id, .. } => {
                Some(*room_id)
            }
            ConnectionState::Subscribed(subscription) => Some(subscription.room_id),
            ConnectionState::Closed => None,
        }
    }
}
