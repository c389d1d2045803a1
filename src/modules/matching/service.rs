use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    api::error,
    modules::{
        interaction::{repository::InteractionRepository, schema::SignalKind},
        matching::{
            model::{CanonicalPair, MatchResponse, MatchStatus, SignalOutcome},
            repository::MatchRepository,
        },
        room::{repository::RoomRepository, service::RoomService},
        user::{model::UserProfile, repository::UserRepository},
    },
    utils::KeyedLocks,
};

/// Match Engine
///
/// Every signal between two users is applied under the lock of their
/// canonical pair, so the interaction write, the reciprocal check and the
/// match transition are observed as a single step by the opposite signal.
pub struct MatchService<I, M, R, U>
where
    I: InteractionRepository + Send + Sync,
    M: MatchRepository + Send + Sync,
    R: RoomRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    interaction_repo: Arc<I>,
    match_repo: Arc<M>,
    user_repo: Arc<U>,
    rooms: RoomService<R, U>,
    pair_locks: KeyedLocks<CanonicalPair>,
}

// no `Clone` bound on the repositories, they sit behind `Arc`
impl<I, M, R, U> Clone for MatchService<I, M, R, U>
where
    I: InteractionRepository + Send + Sync,
    M: MatchRepository + Send + Sync,
    R: RoomRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            interaction_repo: self.interaction_repo.clone(),
            match_repo: self.match_repo.clone(),
            user_repo: self.user_repo.clone(),
            rooms: self.rooms.clone(),
            pair_locks: self.pair_locks.clone(),
        }
    }
}

impl<I, M, R, U> MatchService<I, M, R, U>
where
    I: InteractionRepository + Send + Sync,
    M: MatchRepository + Send + Sync,
    R: RoomRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(
        interaction_repo: Arc<I>,
        match_repo: Arc<M>,
        user_repo: Arc<U>,
        rooms: RoomService<R, U>,
    ) -> Self {
        MatchService { interaction_repo, match_repo, user_repo, rooms, pair_locks: KeyedLocks::new() }
    }

    pub async fn record_signal(
        &self,
        from_user_id: i64,
        to_user_id: i64,
        kind: SignalKind,
    ) -> Result<SignalOutcome, error::SystemError> {
        if from_user_id == to_user_id {
            return Err(error::SystemError::bad_request("You cannot send a signal to yourself"));
        }

        if self.user_repo.find_by_id(to_user_id).await?.is_none() {
            return Err(error::SystemError::not_found("Target user not found"));
        }

        let pair = CanonicalPair::new(from_user_id, to_user_id)?;
        let _guard = self.pair_locks.lock(pair).await;

        let previous =
            self.interaction_repo.find_signal(from_user_id, to_user_id).await?.map(|s| s.kind);

        if previous != Some(kind) {
            self.interaction_repo.upsert_signal(from_user_id, to_user_id, kind).await?;
            log::debug!("Signal {:?} from {} to {}", kind, from_user_id, to_user_id);
        }

        if kind == SignalKind::Like {
            if previous != Some(SignalKind::Like) {
                self.user_repo.increment_likes_count(to_user_id).await?;
            }
            return self.confirm_like(&pair, from_user_id, to_user_id).await;
        }

        match self.match_repo.deactivate(&pair).await? {
            Some(retracted) => {
                let room_id = self.rooms.find_for_pair(&pair).await?.map(|r| r.id);
                log::info!(
                    "Match {} retracted by user {} ({:?})",
                    retracted.id,
                    from_user_id,
                    kind
                );
                Ok(SignalOutcome::retracted(retracted.id, room_id))
            }
            None => Ok(SignalOutcome::recorded()),
        }
    }

    async fn confirm_like(
        &self,
        pair: &CanonicalPair,
        from_user_id: i64,
        to_user_id: i64,
    ) -> Result<SignalOutcome, error::SystemError> {
        let reciprocal = self.interaction_repo.find_signal(to_user_id, from_user_id).await?;
        if reciprocal.map(|s| s.kind) != Some(SignalKind::Like) {
            return Ok(SignalOutcome::pending());
        }

        if let Some(existing) = self.match_repo.find_by_pair(pair).await? {
            if existing.is_active {
                let room = self.rooms.ensure_room_for(pair).await?;
                return Ok(SignalOutcome::matched(MatchStatus::AlreadyMatched, existing.id, room.id));
            }
        }

        let formed = self.match_repo.activate(pair).await?;
        let room = self.rooms.ensure_room_for(pair).await?;
        log::info!(
            "Match {} formed between {} and {} (room {})",
            formed.id,
            pair.user_a,
            pair.user_b,
            room.id
        );

        Ok(SignalOutcome::matched(MatchStatus::Formed, formed.id, room.id))
    }

    /// Active matches of `user_id` with the counterpart's profile and room.
    pub async fn list_active(&self, user_id: i64) -> Result<Vec<MatchResponse>, error::SystemError> {
        let matches = self.match_repo.list_active_for_user(user_id).await?;

        let ids: Vec<i64> = matches.iter().map(|m| m.pair().other(user_id)).collect();
        let profiles: HashMap<i64, UserProfile> = self
            .user_repo
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, UserProfile::from(u)))
            .collect();

        let mut responses = Vec::with_capacity(matches.len());
        for m in matches {
            let Some(other_user) = profiles.get(&m.pair().other(user_id)).cloned() else {
                continue;
            };
            let chat_room_id = self.rooms.find_for_pair(&m.pair()).await?.map(|r| r.id);
            responses.push(MatchResponse {
                id: m.id,
                other_user,
                chat_room_id,
                is_active: m.is_active,
                created_at: m.created_at,
            });
        }

        Ok(responses)
    }
}
