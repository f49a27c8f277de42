//! Memoized projections over an [`AppState`] snapshot.
//!
//! A [`Selectors`] value owns every cache. Each projection is a method taking
//! the current snapshot: it gathers its inputs (slices of the snapshot or the
//! outputs of upstream projections), and recomputes only when one of them is
//! a different `Arc` than last time. Lookup-style projections return selector
//! objects that carry their own bounded argument caches.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::SelectorConfig;
use crate::diagnostics::Diagnostics;
use crate::error::CoreError;
use crate::models::{
    ConversationLookup, ConversationType, ConversationVerificationData, MessageLookup,
    MessageTimestamps, MessagesByConversation, PanelRender, PanelType, PreJoinConversation,
};
use crate::state::{AppState, ConversationsState};

#[path = "selectors/composer.rs"]
mod composer;
#[path = "selectors/left_pane.rs"]
mod left_pane;
#[path = "selectors/lists.rs"]
mod lists;
#[path = "selectors/lookup.rs"]
mod lookup;
#[path = "selectors/stories.rs"]
mod stories;
#[path = "selectors/timeline.rs"]
mod timeline;
#[path = "selectors/verification.rs"]
mod verification;

pub use left_pane::{left_pane_lists, ConversationComparator};
pub use lookup::{
    member_colors, ContactNameColorSelector, ContactSelector, ConversationSelector,
    ConversationsByTitleSelector, CustomColorSelector, GroupAdminsSelector, KeyedConversationSelector,
    MemberColorsSelector,
};
pub use stories::HasStoriesSelector;
pub use timeline::{conversation_messages_props, ConversationMessagesSelector};
pub use verification::conversation_uuids_stopping_send;

pub type ConversationList = Arc<Vec<Arc<ConversationType>>>;

pub const PLACEHOLDER_CONTACT_ID: &str = "placeholder-contact";

pub struct Selectors {
    config: SelectorConfig,
    clock: Arc<dyn Clock>,
    diagnostics: Arc<Diagnostics>,
    placeholder: Arc<ConversationType>,
    left_pane: left_pane::LeftPaneMemos,
    lists: lists::ListMemos,
    composer: composer::ComposerMemos,
    lookup: lookup::LookupMemos,
    timeline: timeline::TimelineMemos,
    stories: stories::StoryMemos,
    verification: verification::VerificationMemos,
}

impl Default for Selectors {
    fn default() -> Self {
        Selectors::build(SelectorConfig::default(), Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for Selectors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selectors")
            .field("config", &self.config)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

impl Selectors {
    pub fn new(config: SelectorConfig) -> Result<Self, CoreError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: SelectorConfig, clock: Arc<dyn Clock>) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    fn build(config: SelectorConfig, clock: Arc<dyn Clock>) -> Self {
        let diagnostics = Arc::new(Diagnostics::new(
            config.diagnostics_dir.clone(),
            config.strict_assertions,
        ));
        let placeholder = Arc::new(ConversationType {
            id: PLACEHOLDER_CONTACT_ID.to_string(),
            title: config.placeholder_title.clone(),
            ..Default::default()
        });
        Selectors {
            config,
            clock,
            diagnostics,
            placeholder,
            left_pane: left_pane::LeftPaneMemos::new(),
            lists: lists::ListMemos::new(),
            composer: composer::ComposerMemos::new(),
            lookup: lookup::LookupMemos::new(),
            timeline: timeline::TimelineMemos::new(),
            stories: stories::StoryMemos::new(),
            verification: verification::VerificationMemos::new(),
        }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Drops every cached projection. Bounded argument caches live inside the
    /// cached selector objects and go with them.
    pub fn reset(&self) {
        self.left_pane.reset();
        self.lists.reset();
        self.composer.reset();
        self.lookup.reset();
        self.timeline.reset();
        self.stories.reset();
        self.verification.reset();
    }

    fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn placeholder_contact(&self) -> Arc<ConversationType> {
        Arc::clone(&self.placeholder)
    }

    pub fn conversations<'a>(&self, state: &'a AppState) -> &'a ConversationsState {
        &state.conversations
    }

    pub fn pre_join_conversation(&self, state: &AppState) -> Option<Arc<PreJoinConversation>> {
        state.conversations.pre_join_conversation.clone()
    }

    pub fn conversation_lookup(&self, state: &AppState) -> Arc<ConversationLookup> {
        Arc::clone(&state.conversations.conversation_lookup)
    }

    pub fn conversations_by_uuid(&self, state: &AppState) -> Arc<ConversationLookup> {
        Arc::clone(&state.conversations.conversations_by_uuid)
    }

    pub fn conversations_by_e164(&self, state: &AppState) -> Arc<ConversationLookup> {
        Arc::clone(&state.conversations.conversations_by_e164)
    }

    pub fn conversations_by_group_id(&self, state: &AppState) -> Arc<ConversationLookup> {
        Arc::clone(&state.conversations.conversations_by_group_id)
    }

    pub fn conversations_by_username(&self, state: &AppState) -> Arc<ConversationLookup> {
        Arc::clone(&state.conversations.conversations_by_username)
    }

    pub fn targeted_conversation_panels_count(&self, state: &AppState) -> usize {
        state.conversations.targeted_conversation_panels.len()
    }

    pub fn selected_conversation_id(&self, state: &AppState) -> Option<String> {
        state.conversations.selected_conversation_id.clone()
    }

    pub fn selected_message_ids(&self, state: &AppState) -> Option<Arc<Vec<String>>> {
        state.conversations.selected_message_ids.clone()
    }

    pub fn last_selected_message(&self, state: &AppState) -> Option<Arc<MessageTimestamps>> {
        state.conversations.last_selected_message.clone()
    }

    pub fn show_archived(&self, state: &AppState) -> bool {
        state.conversations.show_archived
    }

    pub fn messages(&self, state: &AppState) -> Arc<MessageLookup> {
        Arc::clone(&state.conversations.messages_lookup)
    }

    pub fn messages_by_conversation(&self, state: &AppState) -> Arc<MessagesByConversation> {
        Arc::clone(&state.conversations.messages_by_conversation)
    }

    pub fn conversation_verification_data(
        &self,
        state: &AppState,
    ) -> Arc<BTreeMap<String, ConversationVerificationData>> {
        Arc::clone(&state.conversations.verification_data_by_conversation)
    }

    pub fn top_panel(&self, state: &AppState) -> Option<PanelRender> {
        state.conversations.targeted_conversation_panels.last().cloned()
    }

    /// Localized header for the panel on top of the conversation panel stack.
    pub fn conversation_title(&self, state: &AppState) -> Option<String> {
        let panel_type = self.top_panel(state).map(|panel| panel.panel_type);
        conversation_title_for_panel_type(&state.user.intl, panel_type)
    }
}

fn panel_title_key(panel_type: PanelType) -> Option<&'static str> {
    let key = match panel_type {
        PanelType::AllMedia => "icu:allMedia",
        PanelType::ChatColorEditor => "icu:ChatColorPicker__menu-title",
        PanelType::ContactDetails => return None,
        PanelType::ConversationDetails => "icu:ConversationDetails__title",
        PanelType::EditHistory => "icu:EditHistoryMessagesModal__title",
        PanelType::GroupInvites => "icu:ConversationDetails--requests-and-invites",
        PanelType::GroupLinkManagement => "icu:ConversationDetails--group-link",
        PanelType::GroupPermissions => "icu:permissions",
        PanelType::GroupV1Members => "icu:ConversationDetails--members",
        PanelType::MessageDetails => "icu:MessageDetails__title",
        PanelType::NotificationSettings => "icu:ConversationDetails--notifications",
        PanelType::StickerManager => "icu:stickers",
    };
    Some(key)
}

pub fn conversation_title_for_panel_type(
    intl: &BTreeMap<String, String>,
    panel_type: Option<PanelType>,
) -> Option<String> {
    let key = panel_title_key(panel_type?)?;
    Some(intl.get(key).cloned().unwrap_or_else(|| key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_title_uses_intl_table() {
        let mut intl = BTreeMap::new();
        intl.insert("icu:allMedia".to_string(), "All media".to_string());
        assert_eq!(
            conversation_title_for_panel_type(&intl, Some(PanelType::AllMedia)).as_deref(),
            Some("All media")
        );
        assert_eq!(
            conversation_title_for_panel_type(&intl, Some(PanelType::StickerManager)).as_deref(),
            Some("icu:stickers")
        );
        assert_eq!(conversation_title_for_panel_type(&intl, Some(PanelType::ContactDetails)), None);
        assert_eq!(conversation_title_for_panel_type(&intl, None), None);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SelectorConfig {
            conversation_messages_cache_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            Selectors::new(config),
            Err(CoreError::InvalidArgument(_))
        ));
    }
}
