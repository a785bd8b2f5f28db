use crate::core::similarity::shared_menus;
use crate::models::{SavedIds, ScoredPeer, UserProfile};

/// Ranks other users by how many saved menus they share with the caller
#[derive(Debug, Clone, Copy, Default)]
pub struct PeerRanker;

impl PeerRanker {
    pub fn new() -> Self {
        Self
    }

    /// Peers ordered by similarity, most similar first
    ///
    /// The caller and every id in `exclude_ids` are dropped. Nothing else is:
    /// peers with no overlap stay in the list behind the others.
    pub fn rank(
        &self,
        caller_id: &str,
        caller_saved: &SavedIds,
        peers: &[UserProfile],
        exclude_ids: &SavedIds,
    ) -> Vec<UserProfile> {
        self.rank_scored(caller_id, caller_saved, peers, exclude_ids)
            .into_iter()
            .map(|peer| peer.profile)
            .collect()
    }

    /// Same as [`rank`](Self::rank), keeping the similarity of each peer
    pub fn rank_scored(
        &self,
        caller_id: &str,
        caller_saved: &SavedIds,
        peers: &[UserProfile],
        exclude_ids: &SavedIds,
    ) -> Vec<ScoredPeer> {
        let mut scored: Vec<ScoredPeer> = peers
            .iter()
            .filter(|peer| peer.id != caller_id && !exclude_ids.contains(&peer.id))
            .map(|peer| {
                let shared_menu_ids = shared_menus(caller_saved, peer);
                ScoredPeer {
                    similarity: shared_menu_ids.len(),
                    shared_menu_ids,
                    profile: peer.clone(),
                }
            })
            .collect();

        // Equal scores fall back to id order so the list does not depend on
        // the order rows came back from the backend
        scored.sort_by(|a, b| {
            b.similarity
                .cmp(&a.similarity)
                .then_with(|| a.profile.id.cmp(&b.profile.id))
        });

        tracing::trace!(
            "Ranked {} of {} peers for {}",
            scored.len(),
            peers.len(),
            caller_id
        );

        scored
    }
}
