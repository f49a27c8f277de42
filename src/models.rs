use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationKind {
    #[default]
    Direct,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalStage {
    JustNotification,
    MessageRequest,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorySendMode {
    #[default]
    IfActive,
    Always,
    Never,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub uuid: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub id: String,
    pub uuid: Option<String>,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HasStories {
    Read,
    Unread,
}

/// A conversation record as materialized by the store.
///
/// Timestamps are milliseconds since the epoch. A zero timestamp is treated the
/// same as an absent one everywhere in this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationType {
    pub id: String,
    pub uuid: Option<String>,
    pub e164: Option<String>,
    pub phone_number: Option<String>,
    pub username: Option<String>,
    pub group_id: Option<String>,
    pub group_version: Option<u8>,
    #[serde(rename = "type")]
    pub kind: ConversationKind,

    pub title: String,
    pub title_no_default: Option<String>,
    pub name: Option<String>,
    pub profile_name: Option<String>,
    pub system_given_name: Option<String>,
    pub system_family_name: Option<String>,

    pub is_me: bool,
    pub is_pinned: bool,
    pub is_archived: bool,
    pub is_blocked: bool,
    pub is_selected: bool,
    pub is_group_v1_and_disabled: bool,
    pub left: bool,
    pub profile_sharing: bool,
    pub accepted_message_request: bool,
    pub can_add_new_members: bool,
    pub hide_story: bool,
    pub has_messages: bool,
    pub removal_stage: Option<RemovalStage>,
    pub discovered_unregistered_at: Option<i64>,

    pub active_at: Option<i64>,
    pub timestamp: Option<i64>,
    pub inbox_position: Option<i64>,

    pub shared_group_names: Vec<String>,
    pub members_count: Option<u32>,
    pub memberships: Vec<GroupMembership>,
    pub sorted_group_members: Vec<GroupMember>,
    pub story_send_mode: StorySendMode,
    pub custom_color_id: Option<String>,
    pub badges: Vec<String>,
    pub has_stories: Option<HasStories>,
}

impl ConversationType {
    pub fn direct(id: impl Into<String>, title: impl Into<String>) -> Self {
        ConversationType {
            id: id.into(),
            title: title.into(),
            kind: ConversationKind::Direct,
            ..Default::default()
        }
    }

    pub fn group(id: impl Into<String>, title: impl Into<String>) -> Self {
        ConversationType {
            id: id.into(),
            title: title.into(),
            kind: ConversationKind::Group,
            ..Default::default()
        }
    }

    pub fn active_at(&self) -> Option<i64> {
        self.active_at.filter(|ts| *ts != 0)
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp.filter(|ts| *ts != 0)
    }
}

pub type ConversationLookup = BTreeMap<String, Arc<ConversationType>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreJoinConversation {
    pub title: String,
    pub member_count: u32,
    pub avatar_url: Option<String>,
    pub approval_required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTimestamps {
    pub id: String,
    pub sent_at: i64,
    pub received_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageType {
    pub id: String,
    pub conversation_id: String,
    pub sent_at: i64,
    pub received_at: i64,
    pub body: Option<String>,
}

pub type MessageLookup = BTreeMap<String, Arc<MessageType>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageLoadingState {
    #[default]
    DoingInitialLoad,
    LoadingOlderMessages,
    LoadingNewerMessages,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageMetrics {
    pub newest: Option<MessageTimestamps>,
    pub oldest: Option<MessageTimestamps>,
    pub oldest_unseen: Option<MessageTimestamps>,
    pub total_unseen: u32,
}

/// The loaded message window for one conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationMessageType {
    pub message_ids: Vec<String>,
    pub metrics: MessageMetrics,
    pub is_near_bottom: Option<bool>,
    pub message_change_counter: u64,
    pub message_loading_state: Option<MessageLoadingState>,
    pub scroll_to_message_id: Option<String>,
    pub scroll_to_message_counter: u64,
}

pub type MessagesByConversation = BTreeMap<String, Arc<ConversationMessageType>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimelineProps {
    pub have_newest: bool,
    pub have_oldest: bool,
    pub is_near_bottom: Option<bool>,
    pub items: Vec<String>,
    pub message_change_counter: u64,
    pub message_loading_state: Option<MessageLoadingState>,
    pub oldest_unseen_index: Option<usize>,
    pub scroll_to_index: Option<usize>,
    pub scroll_to_index_counter: u64,
    pub total_unseen: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetedMessage {
    pub id: String,
    pub counter: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionVerification {
    pub uuids_needing_verification: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationVerificationData {
    PendingVerification {
        uuids_needing_verification: Vec<String>,
        #[serde(default)]
        by_distribution_id: Option<BTreeMap<String, DistributionVerification>>,
    },
    VerificationCancelled {
        canceled_at: i64,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryDataType {
    pub message_id: String,
    pub conversation_id: String,
    pub story_distribution_list_id: Option<String>,
    pub timestamp: i64,
    #[serde(default)]
    pub read_at: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelType {
    AllMedia,
    ChatColorEditor,
    ContactDetails,
    ConversationDetails,
    EditHistory,
    GroupInvites,
    GroupLinkManagement,
    GroupPermissions,
    GroupV1Members,
    MessageDetails,
    NotificationSettings,
    StickerManager,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelRender {
    #[serde(rename = "type")]
    pub panel_type: PanelType,
    #[serde(default)]
    pub args: BTreeMap<String, String>,
}

pub type ContactNameColor = &'static str;

pub const CONTACT_NAME_COLORS: [ContactNameColor; 12] = [
    "200", "120", "300", "010", "210", "330", "230", "180", "220", "400", "100", "110",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSummary {
    pub id: String,
    pub title: String,
    pub uuid: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LeftPaneLists {
    pub conversations: Vec<Arc<ConversationType>>,
    pub archived_conversations: Vec<Arc<ConversationType>>,
    pub pinned_conversations: Vec<Arc<ConversationType>>,
}
