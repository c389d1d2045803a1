use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    api::error,
    modules::{
        interaction::{
            model::{Direction, HistoryEntry},
            repository::InteractionRepository,
            schema::SignalKind,
        },
        user::{model::UserProfile, repository::UserRepository},
    },
};

/// Read side of the interaction ledger.
#[derive(Clone)]
pub struct InteractionService<I, U>
where
    I: InteractionRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    interaction_repo: Arc<I>,
    user_repo: Arc<U>,
}

impl<I, U> InteractionService<I, U>
where
    I: InteractionRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(interaction_repo: Arc<I>, user_repo: Arc<U>) -> Self {
        InteractionService { interaction_repo, user_repo }
    }

    pub async fn history(
        &self,
        user_id: i64,
        kind: SignalKind,
        direction: Direction,
    ) -> Result<Vec<HistoryEntry>, error::SystemError> {
        let signals = match direction {
            Direction::Sent => self.interaction_repo.list_from(user_id, kind).await?,
            Direction::Received => self.interaction_repo.list_to(user_id, kind).await?,
        };

        let counterpart = |from: i64, to: i64| match direction {
            Direction::Sent => to,
            Direction::Received => from,
        };

        let ids: Vec<i64> =
            signals.iter().map(|s| counterpart(s.from_user_id, s.to_user_id)).collect();
        let profiles: HashMap<i64, UserProfile> = self
            .user_repo
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, UserProfile::from(u)))
            .collect();

        let entries = signals
            .into_iter()
            .filter_map(|s| {
                let user = profiles.get(&counterpart(s.from_user_id, s.to_user_id))?.clone();
                Some(HistoryEntry { id: s.id, user, action_type: s.kind, created_at: s.created_at })
            })
            .collect();

        Ok(entries)
    }
}
