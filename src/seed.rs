use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::conversation::SIGNAL_ACI;
use crate::models::{
    ConversationMessageType, ConversationType, ConversationVerificationData, GroupMember,
    GroupMembership, MessageMetrics, MessageTimestamps, MessageType, StoryDataType, StorySendMode,
};
use crate::state::{AppState, ConversationsState, ItemsState, StoriesState, UserState};

pub const DEMO_ME_ID: &str = "r1";
pub const DEMO_PARTNER_ID: &str = "t1";
pub const DEMO_PINNED_ID: &str = "pinned";
pub const DEMO_GROUP_ID: &str = "g1";
pub const DEMO_SIGNAL_ID: &str = "signal";

const BASE_TS: i64 = 1_700_000_000_000;

pub fn demo_uuid(n: u128) -> String {
    Uuid::from_u128(0x5eed_0000_0000_4000_8000_000000000000 | n).to_string()
}

fn contact(id: &str, title: &str, uuid: u128, active_at: Option<i64>) -> ConversationType {
    let mut conversation = ConversationType::direct(id, title);
    conversation.uuid = Some(demo_uuid(uuid));
    conversation.e164 = Some(format!("+1555{:07}", uuid));
    conversation.title_no_default = Some(title.to_string());
    conversation.profile_name = Some(title.to_string());
    conversation.profile_sharing = true;
    conversation.active_at = active_at;
    conversation.timestamp = active_at;
    conversation.has_messages = active_at.is_some();
    conversation
}

/// A populated snapshot for demos and tests: ourselves, a partner with
/// `primary_count` loaded messages, `secondary_threads` short threads (every
/// third archived), a pinned friend, a story-mode group with one unread story,
/// the release-notes conversation and a pending verification on the partner.
pub fn demo_state(primary_count: usize, secondary_threads: usize) -> AppState {
    let last_primary_ts = BASE_TS + primary_count.saturating_sub(1) as i64 * 60_000;

    let mut me = contact(DEMO_ME_ID, "You", 1, None);
    me.is_me = true;

    let mut partner = contact(DEMO_PARTNER_ID, "Partner", 2, Some(last_primary_ts));
    partner.name = Some("Partner".to_string());

    let mut pinned = contact(DEMO_PINNED_ID, "Pinned friend", 3, Some(BASE_TS - 60_000));
    pinned.is_pinned = true;

    let mut group = ConversationType::group(DEMO_GROUP_ID, "Hikers");
    group.name = Some("Hikers".to_string());
    group.title_no_default = Some("Hikers".to_string());
    group.group_id = Some("group-hikers".to_string());
    group.group_version = Some(2);
    group.active_at = Some(BASE_TS - 120_000);
    group.timestamp = group.active_at;
    group.can_add_new_members = true;
    group.story_send_mode = StorySendMode::Always;
    group.members_count = Some(2);
    group.memberships = vec![
        GroupMembership {
            uuid: demo_uuid(1),
            is_admin: true,
        },
        GroupMembership {
            uuid: demo_uuid(2),
            is_admin: false,
        },
    ];
    group.sorted_group_members = [(&me, 1), (&partner, 2)]
        .iter()
        .map(|(member, uuid)| GroupMember {
            id: member.id.clone(),
            uuid: Some(demo_uuid(*uuid)),
            title: member.title.clone(),
        })
        .collect();

    let mut release_notes = ConversationType::direct(DEMO_SIGNAL_ID, "Signal");
    release_notes.uuid = Some(SIGNAL_ACI.to_string());
    release_notes.active_at = Some(BASE_TS);
    release_notes.timestamp = Some(BASE_TS);

    let mut records = vec![me, partner, pinned, group, release_notes];
    for idx in 0..secondary_threads {
        let ts = BASE_TS + idx as i64 * 120_000;
        let mut secondary = contact(
            &format!("t{}", idx + 2),
            &format!("Secondary {}", idx + 1),
            100 + idx as u128,
            Some(ts),
        );
        secondary.is_archived = (idx + 1) % 3 == 0;
        records.push(secondary);
    }

    let mut conversations = ConversationsState::from_conversations(records);

    let messages: Vec<MessageType> = (0..primary_count)
        .map(|idx| {
            let ts = BASE_TS + idx as i64 * 60_000;
            let body = if idx % 2 == 0 {
                format!("Demo message {}", idx + 1)
            } else {
                format!("Reply {}", idx + 1)
            };
            MessageType {
                id: format!("demo:m{}", idx + 1),
                conversation_id: DEMO_PARTNER_ID.to_string(),
                sent_at: ts,
                received_at: ts,
                body: Some(body),
            }
        })
        .collect();
    let stamp = |message: &MessageType| MessageTimestamps {
        id: message.id.clone(),
        sent_at: message.sent_at,
        received_at: message.received_at,
    };
    let window = ConversationMessageType {
        message_ids: messages.iter().map(|message| message.id.clone()).collect(),
        metrics: MessageMetrics {
            newest: messages.last().map(stamp),
            oldest: messages.first().map(stamp),
            oldest_unseen: messages.last().map(stamp),
            total_unseen: u32::from(!messages.is_empty()),
        },
        is_near_bottom: Some(true),
        ..Default::default()
    };
    conversations.messages_by_conversation = Arc::new(BTreeMap::from([(
        DEMO_PARTNER_ID.to_string(),
        Arc::new(window),
    )]));
    conversations.messages_lookup = Arc::new(
        messages
            .into_iter()
            .map(|message| (message.id.clone(), Arc::new(message)))
            .collect(),
    );
    conversations.verification_data_by_conversation = Arc::new(BTreeMap::from([(
        DEMO_PARTNER_ID.to_string(),
        ConversationVerificationData::PendingVerification {
            uuids_needing_verification: vec![demo_uuid(2)],
            by_distribution_id: None,
        },
    )]));

    AppState {
        conversations: Arc::new(conversations),
        user: Arc::new(UserState {
            our_conversation_id: Some(DEMO_ME_ID.to_string()),
            our_number: Some(format!("+1555{:07}", 1)),
            region_code: Some("US".to_string()),
            intl: Arc::default(),
        }),
        items: Arc::new(ItemsState {
            pinned_conversation_ids: Arc::new(vec![DEMO_PINNED_ID.to_string()]),
            mandatory_profile_sharing: false,
        }),
        stories: Arc::new(StoriesState {
            stories: Arc::new(vec![StoryDataType {
                message_id: "demo:story1".to_string(),
                conversation_id: DEMO_GROUP_ID.to_string(),
                story_distribution_list_id: None,
                timestamp: BASE_TS,
                read_at: None,
            }]),
        }),
    }
}
