use crate::models::{SavedIds, UserProfile};

/// Similarity between the caller and a peer
///
/// Counts saved menus the two have in common. Both sides are already
/// normalized sets, so a scalar saved id in storage counts as one element.
#[inline]
pub fn similarity_score(caller_saved: &SavedIds, peer: &UserProfile) -> usize {
    caller_saved.overlap(&peer.saved_menu_ids)
}

/// Saved menu ids the caller and the peer have in common, in id order
///
/// Its length always equals [`similarity_score`].
pub fn shared_menus(caller_saved: &SavedIds, peer: &UserProfile) -> Vec<String> {
    peer.saved_menu_ids
        .iter()
        .filter(|id| caller_saved.contains(id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_peer(id: &str, saved: &[&str]) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            username: None,
            saved_menu_ids: saved.iter().copied().collect(),
            saved_user_ids: SavedIds::new(),
            dietary_restrictions: None,
        }
    }

    #[test]
    fn test_similarity_counts_overlap() {
        let caller: SavedIds = ["1", "2", "3"].into_iter().collect();

        assert_eq!(similarity_score(&caller, &create_peer("a", &["2", "3", "4"])), 2);
        assert_eq!(similarity_score(&caller, &create_peer("b", &["5"])), 0);
        assert_eq!(similarity_score(&caller, &create_peer("c", &[])), 0);
    }

    #[test]
    fn test_shared_menus() {
        let caller: SavedIds = ["1", "2", "3"].into_iter().collect();
        let peer = create_peer("a", &["4", "3", "2"]);

        assert_eq!(shared_menus(&caller, &peer), vec!["2", "3"]);
    }
}
