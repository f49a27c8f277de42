use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::conversation::sort_by_title;
use crate::memo::Memo;
use crate::models::ConversationVerificationData;
use crate::state::AppState;

use super::{ConversationList, ConversationSelector, Selectors};

type VerificationData = Arc<BTreeMap<String, ConversationVerificationData>>;

/// Every identity that must be re-verified before a pending send can go out,
/// including those scoped to a story distribution list. Cancelled entries
/// contribute nothing.
pub fn conversation_uuids_stopping_send(
    data: &BTreeMap<String, ConversationVerificationData>,
) -> BTreeSet<String> {
    let mut uuids = BTreeSet::new();
    for entry in data.values() {
        if let ConversationVerificationData::PendingVerification {
            uuids_needing_verification,
            by_distribution_id,
        } = entry
        {
            uuids.extend(uuids_needing_verification.iter().cloned());
            for distribution in by_distribution_id.iter().flat_map(|by_id| by_id.values()) {
                uuids.extend(distribution.uuids_needing_verification.iter().cloned());
            }
        }
    }
    uuids
}

pub(super) struct VerificationMemos {
    stopped_ids: Memo<(VerificationData,), Arc<Vec<String>>>,
    uuids_stopping_send: Memo<(VerificationData,), Arc<BTreeSet<String>>>,
    conversations_stopping_send:
        Memo<(Arc<ConversationSelector>, Arc<BTreeSet<String>>), ConversationList>,
}

impl VerificationMemos {
    pub(super) fn new() -> Self {
        VerificationMemos {
            stopped_ids: Memo::new("conversation_ids_stopped_for_verification"),
            uuids_stopping_send: Memo::new("conversation_uuids_stopping_send"),
            conversations_stopping_send: Memo::new("conversations_stopping_send"),
        }
    }

    pub(super) fn reset(&self) {
        self.stopped_ids.reset();
        self.uuids_stopping_send.reset();
        self.conversations_stopping_send.reset();
    }
}

impl Selectors {
    pub fn conversation_ids_stopped_for_verification(&self, state: &AppState) -> Arc<Vec<String>> {
        self.verification.stopped_ids.select(
            (Arc::clone(&state.conversations.verification_data_by_conversation),),
            |(data,)| Arc::new(data.keys().cloned().collect()),
        )
    }

    pub fn conversation_uuids_stopping_send(&self, state: &AppState) -> Arc<BTreeSet<String>> {
        self.verification.uuids_stopping_send.select(
            (Arc::clone(&state.conversations.verification_data_by_conversation),),
            |(data,)| Arc::new(conversation_uuids_stopping_send(data)),
        )
    }

    pub fn conversations_stopping_send(&self, state: &AppState) -> ConversationList {
        let inputs = (
            self.conversation_selector(state),
            self.conversation_uuids_stopping_send(state),
        );
        self.verification
            .conversations_stopping_send
            .select(inputs, |(conversations, uuids)| {
                let resolved = uuids
                    .iter()
                    .map(|uuid| conversations.get(Some(uuid.as_str())))
                    .collect();
                Arc::new(sort_by_title(resolved))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DistributionVerification;

    fn pending(uuids: &[&str], lists: &[(&str, &[&str])]) -> ConversationVerificationData {
        let by_distribution_id = (!lists.is_empty()).then(|| {
            lists
                .iter()
                .map(|(list, uuids)| {
                    (
                        list.to_string(),
                        DistributionVerification {
                            uuids_needing_verification: uuids.iter().map(|u| u.to_string()).collect(),
                        },
                    )
                })
                .collect()
        });
        ConversationVerificationData::PendingVerification {
            uuids_needing_verification: uuids.iter().map(|u| u.to_string()).collect(),
            by_distribution_id,
        }
    }

    #[test]
    fn aggregation_dedupes_across_conversations_and_lists() {
        let mut data = BTreeMap::new();
        data.insert("c1".to_string(), pending(&["u1", "u2"], &[]));
        data.insert("c2".to_string(), pending(&["u2", "u3"], &[("list", &["u1", "u4"][..])]));
        data.insert(
            "c3".to_string(),
            ConversationVerificationData::VerificationCancelled { canceled_at: 5 },
        );

        let uuids: Vec<String> = conversation_uuids_stopping_send(&data).into_iter().collect();
        assert_eq!(uuids, vec!["u1", "u2", "u3", "u4"]);
    }

    #[test]
    fn cancelled_only_stops_nothing() {
        let mut data = BTreeMap::new();
        data.insert(
            "c1".to_string(),
            ConversationVerificationData::VerificationCancelled { canceled_at: 1 },
        );
        assert!(conversation_uuids_stopping_send(&data).is_empty());
    }
}
