use std::sync::Arc;

use crate::conversation::{
    can_compose_conversation, has_display_info, is_conversation_unregistered,
    is_missing_required_profile_sharing, is_signal_connection, is_signal_conversation,
};
use crate::memo::Memo;
use crate::models::{ConversationKind, ConversationLookup, ConversationType, TargetedMessage};
use crate::state::AppState;

use super::{ConversationList, Selectors};

type LookupMemo = Memo<(Arc<ConversationLookup>,), ConversationList>;

pub(super) struct ListMemos {
    all: LookupMemo,
    signal_connections: Memo<(ConversationList,), ConversationList>,
    targeted_message: Memo<(Option<String>, u64), Option<Arc<TargetedMessage>>>,
    me: Memo<(Arc<ConversationLookup>, Option<String>), Arc<ConversationType>>,
    all_composable: LookupMemo,
    groups_with_invite_access: LookupMemo,
    composable_contacts: LookupMemo,
    candidate_contacts: LookupMemo,
    composable_groups: LookupMemo,
}

impl ListMemos {
    pub(super) fn new() -> Self {
        ListMemos {
            all: Memo::new("all_conversations"),
            signal_connections: Memo::new("all_signal_connections"),
            targeted_message: Memo::new("targeted_message"),
            me: Memo::new("me"),
            all_composable: Memo::new("all_composable_conversations"),
            groups_with_invite_access: Memo::new("all_groups_with_invite_access"),
            composable_contacts: Memo::new("composable_contacts"),
            candidate_contacts: Memo::new("candidate_contacts_for_new_group"),
            composable_groups: Memo::new("composable_groups"),
        }
    }

    pub(super) fn reset(&self) {
        self.all.reset();
        self.signal_connections.reset();
        self.targeted_message.reset();
        self.me.reset();
        self.all_composable.reset();
        self.groups_with_invite_access.reset();
        self.composable_contacts.reset();
        self.candidate_contacts.reset();
        self.composable_groups.reset();
    }
}

fn filter_lookup<F>(lookup: &ConversationLookup, keep: F) -> ConversationList
where
    F: Fn(&ConversationType) -> bool,
{
    Arc::new(
        lookup
            .values()
            .filter(|conversation| keep(conversation))
            .cloned()
            .collect(),
    )
}

// The compose filters below read the clock but are keyed on the lookup only,
// so an unregistered mark can outlive its window until the lookup changes.
impl Selectors {
    pub fn all_conversations(&self, state: &AppState) -> ConversationList {
        self.lists.all.select(
            (Arc::clone(&state.conversations.conversation_lookup),),
            |(lookup,)| Arc::new(lookup.values().cloned().collect()),
        )
    }

    pub fn all_signal_connections(&self, state: &AppState) -> ConversationList {
        self.lists
            .signal_connections
            .select((self.all_conversations(state),), |(conversations,)| {
                Arc::new(
                    conversations
                        .iter()
                        .filter(|conversation| is_signal_connection(conversation))
                        .cloned()
                        .collect(),
                )
            })
    }

    pub fn targeted_message(&self, state: &AppState) -> Option<Arc<TargetedMessage>> {
        let inputs = (
            state.conversations.targeted_message.clone(),
            state.conversations.targeted_message_counter,
        );
        self.lists.targeted_message.select(inputs, |(id, counter)| {
            id.as_ref().map(|id| {
                Arc::new(TargetedMessage {
                    id: id.clone(),
                    counter: *counter,
                })
            })
        })
    }

    /// Our own conversation, or the placeholder when we are not known yet.
    pub fn me(&self, state: &AppState) -> Arc<ConversationType> {
        let inputs = (
            Arc::clone(&state.conversations.conversation_lookup),
            state.user.our_conversation_id.clone(),
        );
        self.lists.me.select(inputs, |(lookup, our_id)| {
            our_id
                .as_ref()
                .and_then(|id| lookup.get(id).cloned())
                .unwrap_or_else(|| self.placeholder_contact())
        })
    }

    /// Forwarding targets: anything with a real title that can still receive messages.
    pub fn all_composable_conversations(&self, state: &AppState) -> ConversationList {
        let now = self.now_ms();
        let window = self.config.unregistered_window_ms;
        self.lists.all_composable.select(
            (Arc::clone(&state.conversations.conversation_lookup),),
            |(lookup,)| {
                filter_lookup(lookup, |conversation| {
                    !is_signal_conversation(conversation)
                        && !conversation.is_blocked
                        && conversation.removal_stage.is_none()
                        && !conversation.is_group_v1_and_disabled
                        && !is_conversation_unregistered(conversation, now, window)
                        && conversation
                            .title_no_default
                            .as_deref()
                            .map_or(false, |title| !title.is_empty())
                        && has_display_info(conversation)
                })
            },
        )
    }

    pub fn all_groups_with_invite_access(&self, state: &AppState) -> ConversationList {
        self.lists.groups_with_invite_access.select(
            (Arc::clone(&state.conversations.conversation_lookup),),
            |(lookup,)| {
                filter_lookup(lookup, |conversation| {
                    conversation.kind == ConversationKind::Group
                        && !conversation.title.is_empty()
                        && conversation.can_add_new_members
                })
            },
        )
    }

    /// Direct conversations offered by the composer, including Note to Self.
    pub fn composable_contacts(&self, state: &AppState) -> ConversationList {
        let now = self.now_ms();
        let window = self.config.unregistered_window_ms;
        self.lists.composable_contacts.select(
            (Arc::clone(&state.conversations.conversation_lookup),),
            |(lookup,)| {
                filter_lookup(lookup, |conversation| {
                    conversation.kind == ConversationKind::Direct
                        && can_compose_conversation(conversation, now, window)
                })
            },
        )
    }

    /// Same as [`Selectors::composable_contacts`] without Note to Self.
    pub fn candidate_contacts_for_new_group(&self, state: &AppState) -> ConversationList {
        let now = self.now_ms();
        let window = self.config.unregistered_window_ms;
        self.lists.candidate_contacts.select(
            (Arc::clone(&state.conversations.conversation_lookup),),
            |(lookup,)| {
                filter_lookup(lookup, |conversation| {
                    conversation.kind == ConversationKind::Direct
                        && !conversation.is_me
                        && can_compose_conversation(conversation, now, window)
                })
            },
        )
    }

    pub fn composable_groups(&self, state: &AppState) -> ConversationList {
        let now = self.now_ms();
        let window = self.config.unregistered_window_ms;
        self.lists.composable_groups.select(
            (Arc::clone(&state.conversations.conversation_lookup),),
            |(lookup,)| {
                filter_lookup(lookup, |conversation| {
                    conversation.kind == ConversationKind::Group
                        && can_compose_conversation(conversation, now, window)
                })
            },
        )
    }

    pub fn is_missing_required_profile_sharing(
        &self,
        state: &AppState,
        conversation: &ConversationType,
    ) -> bool {
        is_missing_required_profile_sharing(conversation, state.items.mandatory_profile_sharing)
    }
}
