use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use icu_collator::{Collator, CollatorOptions};
use uuid::Uuid;

use crate::models::{ConversationKind, ConversationLookup, ConversationType, StorySendMode};

/// Service id of the release-notes conversation maintained by the client itself.
pub const SIGNAL_ACI: Uuid = Uuid::from_u128(0x11111111_1111_4111_8111_111111111111);

pub fn is_signal_conversation(conversation: &ConversationType) -> bool {
    conversation
        .uuid
        .as_deref()
        .and_then(|uuid| Uuid::parse_str(uuid).ok())
        .map_or(false, |uuid| uuid == SIGNAL_ACI)
}

pub fn is_direct_conversation(conversation: &ConversationType) -> bool {
    conversation.kind == ConversationKind::Direct
}

pub fn is_group_v1(conversation: &ConversationType) -> bool {
    conversation.kind == ConversationKind::Group
        && conversation.group_id.is_some()
        && conversation.group_version.unwrap_or(1) == 1
}

pub fn is_group_v2(group_id: Option<&str>, group_version: Option<u8>) -> bool {
    group_id.map_or(false, |id| !id.is_empty()) && group_version == Some(2)
}

pub fn is_in_system_contacts(conversation: &ConversationType) -> bool {
    if conversation.kind != ConversationKind::Direct {
        return false;
    }
    [
        &conversation.name,
        &conversation.system_given_name,
        &conversation.system_family_name,
    ]
    .iter()
    .any(|field| field.as_deref().map_or(false, |value| !value.is_empty()))
}

pub fn is_signal_connection(conversation: &ConversationType) -> bool {
    conversation.profile_sharing || is_in_system_contacts(conversation)
}

/// A contact discovered to be unregistered stays hidden for `window_ms`; after
/// that it is offered again so a re-registration gets noticed.
pub fn is_conversation_unregistered(conversation: &ConversationType, now_ms: i64, window_ms: i64) -> bool {
    match conversation.discovered_unregistered_at {
        Some(at) if at != 0 => at > now_ms.saturating_sub(window_ms),
        _ => false,
    }
}

pub fn is_group_in_story_mode(
    conversation: &ConversationType,
    conversation_ids_with_stories: &HashSet<String>,
) -> bool {
    if conversation.kind != ConversationKind::Group {
        return false;
    }
    if !is_group_v2(conversation.group_id.as_deref(), conversation.group_version) {
        return false;
    }
    match conversation.story_send_mode {
        StorySendMode::Always => true,
        StorySendMode::Never => false,
        StorySendMode::IfActive => conversation_ids_with_stories.contains(&conversation.id),
    }
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().map_or(false, |v| !v.is_empty())
}

pub fn is_trusted(conversation: &ConversationType) -> bool {
    if conversation.kind == ConversationKind::Group {
        return true;
    }
    is_in_system_contacts(conversation)
        || !conversation.shared_group_names.is_empty()
        || conversation.profile_sharing
        || conversation.is_me
}

pub fn has_display_info(conversation: &ConversationType) -> bool {
    if conversation.kind == ConversationKind::Group {
        return non_empty(&conversation.name);
    }
    non_empty(&conversation.name)
        || non_empty(&conversation.profile_name)
        || non_empty(&conversation.phone_number)
        || conversation.is_me
}

/// Whether a conversation may be offered as a compose target.
pub fn can_compose_conversation(conversation: &ConversationType, now_ms: i64, window_ms: i64) -> bool {
    !is_signal_conversation(conversation)
        && !conversation.is_blocked
        && conversation.removal_stage.is_none()
        && !is_conversation_unregistered(conversation, now_ms, window_ms)
        && has_display_info(conversation)
        && is_trusted(conversation)
}

pub fn is_missing_required_profile_sharing(conversation: &ConversationType, remote_flag: bool) -> bool {
    let requires_it = !conversation.is_me
        && !conversation.left
        && (is_group_v1(conversation) || is_direct_conversation(conversation));
    requires_it && !conversation.profile_sharing && remote_flag && conversation.has_messages
}

thread_local! {
    static TITLE_COLLATOR: Option<Collator> =
        Collator::try_new(&Default::default(), CollatorOptions::new()).ok();
}

/// Title collation: root-locale Unicode collation, then code points, so the
/// order is total.
pub fn compare_titles(left: &str, right: &str) -> Ordering {
    let collated = TITLE_COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(left, right),
        None => left
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(right.chars().flat_map(char::to_lowercase)),
    });
    collated.then_with(|| left.cmp(right))
}

pub fn sort_by_title(mut conversations: Vec<Arc<ConversationType>>) -> Vec<Arc<ConversationType>> {
    conversations.sort_by(|a, b| compare_titles(&a.title, &b.title));
    conversations
}

/// Resolves ids against a lookup, skipping unknown ones.
pub fn deconstruct_lookup(lookup: &ConversationLookup, keys: &[String]) -> Vec<Arc<ConversationType>> {
    keys.iter()
        .filter_map(|key| lookup.get(key).cloned())
        .collect()
}
