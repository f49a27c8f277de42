use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::conversation::{compare_titles, is_signal_conversation};
use crate::memo::Memo;
use crate::models::{ConversationLookup, ConversationType, LeftPaneLists};
use crate::state::AppState;

use super::Selectors;

/// Inbox ordering for the active and archived lists.
///
/// Recreated whenever the locale table or region changes, so the left pane
/// lists are re-derived with it.
#[derive(Debug, Default)]
pub struct ConversationComparator;

impl ConversationComparator {
    pub fn compare(&self, left: &ConversationType, right: &ConversationType) -> Ordering {
        match (left.timestamp(), right.timestamp()) {
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            (Some(l), Some(r)) if l != r => return r.cmp(&l),
            _ => {}
        }

        match (left.inbox_position, right.inbox_position) {
            (Some(l), Some(r)) if l != r => return l.cmp(&r),
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            _ => {}
        }

        compare_titles(&left.title, &right.title)
    }
}

/// Splits conversations into the pinned, archived and active lists.
///
/// The release-notes conversation never appears. Pinned wins over archived and
/// is shown regardless of activity; otherwise a conversation without
/// `active_at` is left out.
pub fn left_pane_lists(
    lookup: &ConversationLookup,
    comparator: &ConversationComparator,
    selected_conversation: Option<&str>,
    pinned_conversation_ids: &[String],
) -> LeftPaneLists {
    let mut conversations = Vec::new();
    let mut archived_conversations = Vec::new();
    let mut pinned_conversations = Vec::new();

    for conversation in lookup.values() {
        if is_signal_conversation(conversation) {
            continue;
        }
        let conversation = if selected_conversation == Some(conversation.id.as_str()) {
            Arc::new(ConversationType {
                is_selected: true,
                ..(**conversation).clone()
            })
        } else {
            Arc::clone(conversation)
        };

        if conversation.is_pinned {
            pinned_conversations.push(conversation);
            continue;
        }

        if conversation.active_at().is_some() {
            if conversation.is_archived {
                archived_conversations.push(conversation);
            } else {
                conversations.push(conversation);
            }
        }
    }

    conversations.sort_by(|a, b| comparator.compare(a, b));
    archived_conversations.sort_by(|a, b| comparator.compare(a, b));

    let pinned_order: HashMap<&str, usize> = pinned_conversation_ids
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.as_str(), idx))
        .collect();
    // ids missing from the pinned list sort first, as indexOf would place them
    pinned_conversations.sort_by_key(|conversation| {
        pinned_order
            .get(conversation.id.as_str())
            .map_or(-1, |idx| *idx as i64)
    });

    LeftPaneLists {
        conversations,
        archived_conversations,
        pinned_conversations,
    }
}

type LeftPaneInputs = (
    Arc<ConversationLookup>,
    Arc<ConversationComparator>,
    Option<String>,
    Arc<Vec<String>>,
);

pub(super) struct LeftPaneMemos {
    comparator: Memo<(Arc<BTreeMap<String, String>>, Option<String>), Arc<ConversationComparator>>,
    lists: Memo<LeftPaneInputs, Arc<LeftPaneLists>>,
}

impl LeftPaneMemos {
    pub(super) fn new() -> Self {
        LeftPaneMemos {
            comparator: Memo::new("conversation_comparator"),
            lists: Memo::new("left_pane_lists"),
        }
    }

    pub(super) fn reset(&self) {
        self.comparator.reset();
        self.lists.reset();
    }
}

impl Selectors {
    pub fn conversation_comparator(&self, state: &AppState) -> Arc<ConversationComparator> {
        self.left_pane.comparator.select(
            (Arc::clone(&state.user.intl), state.user.region_code.clone()),
            |_| Arc::new(ConversationComparator),
        )
    }

    pub fn left_pane_lists(&self, state: &AppState) -> Arc<LeftPaneLists> {
        let inputs = (
            Arc::clone(&state.conversations.conversation_lookup),
            self.conversation_comparator(state),
            state.conversations.selected_conversation_id.clone(),
            Arc::clone(&state.items.pinned_conversation_ids),
        );
        self.left_pane.lists.select(inputs, |(lookup, comparator, selected, pinned)| {
            Arc::new(left_pane_lists(lookup, comparator, selected.as_deref(), pinned))
        })
    }

    pub fn left_pane_recomputations(&self) -> usize {
        self.left_pane.lists.recomputations()
    }
}
