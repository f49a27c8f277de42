//! Immutable snapshot of the application state the selectors read.
//!
//! Every slice is behind an `Arc`. The `with_*` helpers return a new snapshot
//! that shares all untouched slices, which is what lets the memoized selectors
//! detect change by pointer.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::composer::ComposerState;
use crate::error::CoreError;
use crate::models::{
    ConversationLookup, ConversationMessageType, ConversationType, ConversationVerificationData,
    MessageLookup, MessageTimestamps, MessageType, MessagesByConversation, PanelRender,
    PreJoinConversation, StoryDataType,
};

#[derive(Debug, Clone, Default)]
pub struct ConversationsState {
    pub conversation_lookup: Arc<ConversationLookup>,
    pub conversations_by_uuid: Arc<ConversationLookup>,
    pub conversations_by_e164: Arc<ConversationLookup>,
    pub conversations_by_group_id: Arc<ConversationLookup>,
    pub conversations_by_username: Arc<ConversationLookup>,
    pub pre_join_conversation: Option<Arc<PreJoinConversation>>,
    pub selected_conversation_id: Option<String>,
    pub targeted_message: Option<String>,
    pub targeted_message_counter: u64,
    pub selected_message_ids: Option<Arc<Vec<String>>>,
    pub last_selected_message: Option<Arc<MessageTimestamps>>,
    pub show_archived: bool,
    pub composer: Option<Arc<ComposerState>>,
    pub messages_lookup: Arc<MessageLookup>,
    pub messages_by_conversation: Arc<MessagesByConversation>,
    pub invited_uuids_for_newly_created_group: Option<Arc<Vec<String>>>,
    pub verification_data_by_conversation: Arc<BTreeMap<String, ConversationVerificationData>>,
    pub targeted_conversation_panels: Arc<Vec<PanelRender>>,
}

impl ConversationsState {
    /// Builds the primary lookup and every alternate-identity index from a set of
    /// records. Uuids are indexed lowercased.
    pub fn from_conversations<I>(conversations: I) -> Self
    where
        I: IntoIterator<Item = ConversationType>,
    {
        let lookup: ConversationLookup = conversations
            .into_iter()
            .map(|conversation| (conversation.id.clone(), Arc::new(conversation)))
            .collect();
        let mut state = ConversationsState::default();
        state.replace_lookup(lookup);
        state
    }

    fn replace_lookup(&mut self, lookup: ConversationLookup) {
        let mut by_uuid = ConversationLookup::new();
        let mut by_e164 = ConversationLookup::new();
        let mut by_group_id = ConversationLookup::new();
        let mut by_username = ConversationLookup::new();
        for conversation in lookup.values() {
            if let Some(uuid) = &conversation.uuid {
                by_uuid.insert(uuid.to_lowercase(), Arc::clone(conversation));
            }
            if let Some(e164) = &conversation.e164 {
                by_e164.insert(e164.clone(), Arc::clone(conversation));
            }
            if let Some(group_id) = &conversation.group_id {
                by_group_id.insert(group_id.clone(), Arc::clone(conversation));
            }
            if let Some(username) = &conversation.username {
                by_username.insert(username.clone(), Arc::clone(conversation));
            }
        }
        self.conversation_lookup = Arc::new(lookup);
        self.conversations_by_uuid = Arc::new(by_uuid);
        self.conversations_by_e164 = Arc::new(by_e164);
        self.conversations_by_group_id = Arc::new(by_group_id);
        self.conversations_by_username = Arc::new(by_username);
    }

    /// Inserts or replaces one record; all lookup maps are rebuilt.
    pub fn with_conversation(&self, conversation: ConversationType) -> Self {
        let mut lookup = (*self.conversation_lookup).clone();
        lookup.insert(conversation.id.clone(), Arc::new(conversation));
        let mut next = self.clone();
        next.replace_lookup(lookup);
        next
    }

    pub fn without_conversation(&self, id: &str) -> Self {
        let mut lookup = (*self.conversation_lookup).clone();
        if lookup.remove(id).is_none() {
            return self.clone();
        }
        let mut next = self.clone();
        next.replace_lookup(lookup);
        next
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserState {
    pub our_conversation_id: Option<String>,
    pub our_number: Option<String>,
    pub region_code: Option<String>,
    /// Localized strings by message key.
    pub intl: Arc<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ItemsState {
    pub pinned_conversation_ids: Arc<Vec<String>>,
    pub mandatory_profile_sharing: bool,
}

#[derive(Debug, Clone, Default)]
pub struct StoriesState {
    pub stories: Arc<Vec<StoryDataType>>,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub conversations: Arc<ConversationsState>,
    pub user: Arc<UserState>,
    pub items: Arc<ItemsState>,
    pub stories: Arc<StoriesState>,
}

impl AppState {
    pub fn new(conversations: ConversationsState) -> Self {
        AppState {
            conversations: Arc::new(conversations),
            ..Default::default()
        }
    }

    pub fn from_json_str(input: &str) -> Result<Self, CoreError> {
        let snapshot: StateSnapshot = serde_json::from_str(input)?;
        Ok(snapshot.into_state())
    }

    pub fn with_conversations(&self, conversations: ConversationsState) -> Self {
        AppState {
            conversations: Arc::new(conversations),
            ..self.clone()
        }
    }

    pub fn with_conversation(&self, conversation: ConversationType) -> Self {
        self.with_conversations(self.conversations.with_conversation(conversation))
    }

    pub fn with_composer(&self, composer: Option<ComposerState>) -> Self {
        let mut conversations = (*self.conversations).clone();
        conversations.composer = composer.map(Arc::new);
        self.with_conversations(conversations)
    }

    pub fn with_selected_conversation(&self, id: Option<&str>) -> Self {
        let mut conversations = (*self.conversations).clone();
        conversations.selected_conversation_id = id.map(str::to_string);
        self.with_conversations(conversations)
    }

    pub fn with_verification_data(
        &self,
        data: BTreeMap<String, ConversationVerificationData>,
    ) -> Self {
        let mut conversations = (*self.conversations).clone();
        conversations.verification_data_by_conversation = Arc::new(data);
        self.with_conversations(conversations)
    }

    pub fn with_message_window(&self, conversation_id: &str, window: ConversationMessageType) -> Self {
        let mut conversations = (*self.conversations).clone();
        let mut windows = (*conversations.messages_by_conversation).clone();
        windows.insert(conversation_id.to_string(), Arc::new(window));
        conversations.messages_by_conversation = Arc::new(windows);
        self.with_conversations(conversations)
    }

    pub fn with_user(&self, user: UserState) -> Self {
        AppState {
            user: Arc::new(user),
            ..self.clone()
        }
    }

    pub fn with_pinned(&self, ids: Vec<String>) -> Self {
        let mut items = (*self.items).clone();
        items.pinned_conversation_ids = Arc::new(ids);
        AppState {
            items: Arc::new(items),
            ..self.clone()
        }
    }

    pub fn with_stories(&self, stories: Vec<StoryDataType>) -> Self {
        AppState {
            stories: Arc::new(StoriesState {
                stories: Arc::new(stories),
            }),
            ..self.clone()
        }
    }
}

/// Plain serde form of [`AppState`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StateSnapshot {
    pub conversations: Vec<ConversationType>,
    pub selected_conversation_id: Option<String>,
    pub targeted_message: Option<String>,
    pub targeted_message_counter: u64,
    pub selected_message_ids: Option<Vec<String>>,
    pub last_selected_message: Option<MessageTimestamps>,
    pub show_archived: bool,
    pub composer: Option<ComposerState>,
    pub pre_join_conversation: Option<PreJoinConversation>,
    pub messages: Vec<MessageType>,
    pub messages_by_conversation: BTreeMap<String, ConversationMessageType>,
    pub invited_uuids_for_newly_created_group: Option<Vec<String>>,
    pub verification_data_by_conversation: BTreeMap<String, ConversationVerificationData>,
    pub targeted_conversation_panels: Vec<PanelRender>,
    pub our_conversation_id: Option<String>,
    pub our_number: Option<String>,
    pub region_code: Option<String>,
    pub intl: BTreeMap<String, String>,
    pub pinned_conversation_ids: Vec<String>,
    pub mandatory_profile_sharing: bool,
    pub stories: Vec<StoryDataType>,
}

impl StateSnapshot {
    pub fn into_state(self) -> AppState {
        let mut conversations = ConversationsState::from_conversations(self.conversations);
        conversations.selected_conversation_id = self.selected_conversation_id;
        conversations.targeted_message = self.targeted_message;
        conversations.targeted_message_counter = self.targeted_message_counter;
        conversations.selected_message_ids = self.selected_message_ids.map(Arc::new);
        conversations.last_selected_message = self.last_selected_message.map(Arc::new);
        conversations.show_archived = self.show_archived;
        conversations.composer = self.composer.map(Arc::new);
        conversations.pre_join_conversation = self.pre_join_conversation.map(Arc::new);
        conversations.messages_lookup = Arc::new(
            self.messages
                .into_iter()
                .map(|message| (message.id.clone(), Arc::new(message)))
                .collect(),
        );
        conversations.messages_by_conversation = Arc::new(
            self.messages_by_conversation
                .into_iter()
                .map(|(id, window)| (id, Arc::new(window)))
                .collect(),
        );
        conversations.invited_uuids_for_newly_created_group =
            self.invited_uuids_for_newly_created_group.map(Arc::new);
        conversations.verification_data_by_conversation =
            Arc::new(self.verification_data_by_conversation);
        conversations.targeted_conversation_panels = Arc::new(self.targeted_conversation_panels);

        AppState {
            conversations: Arc::new(conversations),
            user: Arc::new(UserState {
                our_conversation_id: self.our_conversation_id,
                our_number: self.our_number,
                region_code: self.region_code,
                intl: Arc::new(self.intl),
            }),
            items: Arc::new(ItemsState {
                pinned_conversation_ids: Arc::new(self.pinned_conversation_ids),
                mandatory_profile_sharing: self.mandatory_profile_sharing,
            }),
            stories: Arc::new(StoriesState {
                stories: Arc::new(self.stories),
            }),
        }
    }
}
