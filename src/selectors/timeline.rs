use std::sync::Arc;

use crate::config::capacity;
use crate::memo::{BoundedCache, ByAddress, Memo};
use crate::models::{
    ConversationMessageType, MessageLoadingState, MessagesByConversation, TimelineProps,
};
use crate::state::AppState;

use super::Selectors;

/// Timeline props for one loaded message window.
///
/// The window has the newest (oldest) message when the metrics know of none or
/// its last (first) id is that message.
pub fn conversation_messages_props(window: &ConversationMessageType) -> TimelineProps {
    let first_id = window.message_ids.first();
    let last_id = window.message_ids.last();
    let metrics = &window.metrics;

    let have_newest = match (&metrics.newest, last_id) {
        (Some(newest), Some(last)) => newest.id == *last,
        _ => true,
    };
    let have_oldest = match (&metrics.oldest, first_id) {
        (Some(oldest), Some(first)) => oldest.id == *first,
        _ => true,
    };

    let position = |id: &str| window.message_ids.iter().position(|candidate| candidate == id);

    TimelineProps {
        have_newest,
        have_oldest,
        is_near_bottom: window.is_near_bottom,
        items: window.message_ids.clone(),
        message_change_counter: window.message_change_counter,
        message_loading_state: window.message_loading_state,
        oldest_unseen_index: metrics
            .oldest_unseen
            .as_ref()
            .and_then(|unseen| position(unseen.id.as_str())),
        scroll_to_index: window.scroll_to_message_id.as_deref().and_then(position),
        scroll_to_index_counter: window.scroll_to_message_counter,
        total_unseen: metrics.total_unseen,
    }
}

fn initial_load_props() -> TimelineProps {
    TimelineProps {
        message_loading_state: Some(MessageLoadingState::DoingInitialLoad),
        ..Default::default()
    }
}

type PropsCache = BoundedCache<ByAddress<ConversationMessageType>, Arc<TimelineProps>>;

#[derive(Debug)]
pub struct ConversationMessagesSelector {
    messages_by_conversation: Arc<MessagesByConversation>,
    cache: Arc<PropsCache>,
}

impl ConversationMessagesSelector {
    /// A conversation with no loaded window reads as still doing its initial load.
    pub fn get(&self, conversation_id: &str) -> Arc<TimelineProps> {
        match self.messages_by_conversation.get(conversation_id) {
            Some(window) => self
                .cache
                .get_or_insert_with(ByAddress(Arc::clone(window)), |key| {
                    Arc::new(conversation_messages_props(&key.0))
                }),
            None => Arc::new(initial_load_props()),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

pub(super) struct TimelineMemos {
    cached_props: Memo<(Option<String>, Option<String>), Arc<PropsCache>>,
    selector: Memo<(Arc<PropsCache>, Arc<MessagesByConversation>), Arc<ConversationMessagesSelector>>,
}

impl TimelineMemos {
    pub(super) fn new() -> Self {
        TimelineMemos {
            cached_props: Memo::new("cached_conversation_messages_selector"),
            selector: Memo::new("conversation_messages_selector"),
        }
    }

    pub(super) fn reset(&self) {
        self.cached_props.reset();
        self.selector.reset();
    }
}

impl Selectors {
    pub fn conversation_messages_selector(
        &self,
        state: &AppState,
    ) -> Arc<ConversationMessagesSelector> {
        let cache = self.timeline.cached_props.select(
            (state.user.region_code.clone(), state.user.our_number.clone()),
            |_| {
                Arc::new(BoundedCache::new(
                    "conversation_messages",
                    capacity(self.config.conversation_messages_cache_capacity),
                ))
            },
        );
        let inputs = (cache, Arc::clone(&state.conversations.messages_by_conversation));
        self.timeline.selector.select(inputs, |(cache, windows)| {
            Arc::new(ConversationMessagesSelector {
                messages_by_conversation: Arc::clone(windows),
                cache: Arc::clone(cache),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageMetrics, MessageTimestamps};

    fn stamp(id: &str, at: i64) -> MessageTimestamps {
        MessageTimestamps {
            id: id.to_string(),
            sent_at: at,
            received_at: at,
        }
    }

    fn window(ids: &[&str]) -> ConversationMessageType {
        ConversationMessageType {
            message_ids: ids.iter().map(|id| id.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn window_without_metrics_has_both_ends() {
        let props = conversation_messages_props(&window(&["m1", "m2"]));
        assert!(props.have_newest);
        assert!(props.have_oldest);
        assert_eq!(props.items, vec!["m1", "m2"]);
        assert_eq!(props.oldest_unseen_index, None);
    }

    #[test]
    fn partial_window_reports_missing_ends_and_indices() {
        let mut partial = window(&["m2", "m3", "m4"]);
        partial.metrics = MessageMetrics {
            newest: Some(stamp("m5", 5)),
            oldest: Some(stamp("m2", 2)),
            oldest_unseen: Some(stamp("m3", 3)),
            total_unseen: 2,
        };
        partial.scroll_to_message_id = Some("m4".to_string());
        partial.scroll_to_message_counter = 7;

        let props = conversation_messages_props(&partial);
        assert!(!props.have_newest);
        assert!(props.have_oldest);
        assert_eq!(props.oldest_unseen_index, Some(1));
        assert_eq!(props.scroll_to_index, Some(2));
        assert_eq!(props.scroll_to_index_counter, 7);
        assert_eq!(props.total_unseen, 2);
    }

    #[test]
    fn unknown_scroll_target_has_no_index() {
        let mut loaded = window(&["m1"]);
        loaded.scroll_to_message_id = Some("gone".to_string());
        assert_eq!(conversation_messages_props(&loaded).scroll_to_index, None);
    }
}
