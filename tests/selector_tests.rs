use std::collections::HashSet;
use std::sync::Arc;

use golden_thread_selectors::clock::FixedClock;
use golden_thread_selectors::composer::{ComposerState, GroupDraft};
use golden_thread_selectors::models::{
    ConversationType, ConversationVerificationData, DistributionVerification, HasStories,
    RemovalStage, CONTACT_NAME_COLORS,
};
use golden_thread_selectors::seed::{demo_state, demo_uuid, DEMO_GROUP_ID, DEMO_ME_ID, DEMO_PARTNER_ID};
use golden_thread_selectors::selectors::PLACEHOLDER_CONTACT_ID;
use golden_thread_selectors::state::ConversationsState;
use golden_thread_selectors::{AppState, SelectorConfig, Selectors};

const NOW: i64 = 1_700_000_500_000;

fn selectors() -> Selectors {
    Selectors::with_clock(SelectorConfig::default(), Arc::new(FixedClock(NOW))).expect("selectors")
}

fn ids(list: &[Arc<ConversationType>]) -> Vec<&str> {
    list.iter().map(|conversation| conversation.id.as_str()).collect()
}

fn trusted_contact(id: &str, title: &str) -> ConversationType {
    let mut contact = ConversationType::direct(id, title);
    contact.name = Some(title.to_string());
    contact.title_no_default = Some(title.to_string());
    contact.profile_sharing = true;
    contact
}

fn state_of(conversations: Vec<ConversationType>) -> AppState {
    AppState::new(ConversationsState::from_conversations(conversations))
}

#[test]
fn left_pane_partitions_demo_state() {
    let state = demo_state(3, 4);
    let selectors = selectors();
    let lists = selectors.left_pane_lists(&state);

    assert_eq!(ids(&lists.pinned_conversations), vec!["pinned"]);
    assert_eq!(ids(&lists.archived_conversations), vec!["t4"]);
    assert_eq!(ids(&lists.conversations), vec!["t5", "t1", "t3", "t2", "g1"]);

    let mut seen = HashSet::new();
    for conversation in lists
        .conversations
        .iter()
        .chain(&lists.archived_conversations)
        .chain(&lists.pinned_conversations)
    {
        assert!(seen.insert(conversation.id.clone()), "{} listed twice", conversation.id);
    }
    // the release notes and our own record (no activity) are the only ones left out
    let missing: Vec<&String> = state
        .conversations
        .conversation_lookup
        .keys()
        .filter(|id| !seen.contains(*id))
        .collect();
    assert_eq!(missing, vec![DEMO_ME_ID, "signal"]);
}

#[test]
fn pinned_wins_over_archived_and_follows_pinned_order() {
    let mut first = trusted_contact("a", "Alpha");
    first.is_pinned = true;
    first.is_archived = true;
    first.active_at = Some(10);
    let mut second = trusted_contact("b", "Beta");
    second.is_pinned = true;
    let state = state_of(vec![first, second]).with_pinned(vec!["b".to_string(), "a".to_string()]);

    let lists = selectors().left_pane_lists(&state);
    assert_eq!(ids(&lists.pinned_conversations), vec!["b", "a"]);
    assert!(lists.archived_conversations.is_empty());
    assert!(lists.conversations.is_empty());
}

#[test]
fn active_list_orders_by_timestamp_descending() {
    let mut a = trusted_contact("a", "A");
    a.active_at = Some(100);
    a.timestamp = Some(100);
    let mut b = trusted_contact("b", "B");
    b.active_at = Some(50);
    b.timestamp = Some(50);
    let mut c = trusted_contact("c", "C");
    c.active_at = Some(75);

    let lists = selectors().left_pane_lists(&state_of(vec![b, c, a]));
    assert_eq!(ids(&lists.conversations), vec!["a", "b", "c"]);
}

#[test]
fn selected_conversation_is_flagged_in_left_pane_only() {
    let state = demo_state(1, 0).with_selected_conversation(Some(DEMO_PARTNER_ID));
    let selectors = selectors();
    let lists = selectors.left_pane_lists(&state);
    let partner = lists
        .conversations
        .iter()
        .find(|conversation| conversation.id == DEMO_PARTNER_ID)
        .expect("partner listed");
    assert!(partner.is_selected);
    assert!(!state.conversations.conversation_lookup[DEMO_PARTNER_ID].is_selected);
}

#[test]
fn left_pane_recomputes_only_when_inputs_change() {
    let state = demo_state(2, 2);
    let selectors = selectors();

    let first = selectors.left_pane_lists(&state);
    let second = selectors.left_pane_lists(&state);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(selectors.left_pane_recomputations(), 1);

    // stories are not an input
    let with_stories = state.with_stories(Vec::new());
    let third = selectors.left_pane_lists(&with_stories);
    assert!(Arc::ptr_eq(&first, &third));
    assert_eq!(selectors.left_pane_recomputations(), 1);

    let selected = state.with_selected_conversation(Some("t2"));
    selectors.left_pane_lists(&selected);
    assert_eq!(selectors.left_pane_recomputations(), 2);
}

#[test]
fn uuid_resolution_beats_internal_id() {
    let mut by_uuid = trusted_contact("x", "Found by uuid");
    by_uuid.uuid = Some("ABC".to_string());
    let by_id = trusted_contact("abc", "Found by id");
    let state = state_of(vec![by_uuid, by_id]);

    let lookup = selectors().conversation_selector(&state);
    assert_eq!(lookup.get(Some("abc")).id, "x");
    assert_eq!(lookup.get(Some("ABC")).id, "x");
}

#[test]
fn resolution_falls_back_through_e164_and_group_id() {
    let mut contact = trusted_contact("c1", "Carol");
    contact.e164 = Some("+15550009999".to_string());
    let mut group = ConversationType::group("g1", "Group");
    group.group_id = Some("group-xyz".to_string());
    let state = state_of(vec![contact, group]);

    let lookup = selectors().conversation_selector(&state);
    assert_eq!(lookup.get(Some("+15550009999")).id, "c1");
    assert_eq!(lookup.get(Some("group-xyz")).id, "g1");
    assert_eq!(lookup.get(Some("c1")).id, "c1");
}

#[test]
fn unknown_or_empty_ids_resolve_to_placeholder() {
    let state = demo_state(1, 0);
    let selectors = selectors();
    let lookup = selectors.conversation_selector(&state);

    for key in [None, Some(""), Some("nobody")] {
        let resolved = lookup.get(key);
        assert_eq!(resolved.id, PLACEHOLDER_CONTACT_ID);
        assert_eq!(resolved.title, "Unknown contact");
    }
    assert!(Arc::ptr_eq(&lookup.get(None), &selectors.placeholder_contact()));
}

#[test]
fn conversation_cache_evicts_past_capacity() {
    let config = SelectorConfig {
        conversation_cache_capacity: 2,
        ..Default::default()
    };
    let selectors = Selectors::with_clock(config, Arc::new(FixedClock(NOW))).expect("selectors");
    let state = state_of(vec![
        trusted_contact("a", "A"),
        trusted_contact("b", "B"),
        trusted_contact("c", "C"),
    ]);
    let lookup = selectors.conversation_selector(&state);
    for id in ["a", "b", "c"] {
        lookup.get(Some(id));
    }
    assert_eq!(lookup.cached_len(), 2);
    let a = lookup.get(Some("a"));
    assert!(Arc::ptr_eq(&a, &state.conversations.conversation_lookup["a"]));
}

#[test]
fn region_change_replaces_conversation_cache() {
    let state = demo_state(1, 0);
    let selectors = selectors();
    let before = selectors.conversation_selector(&state);
    assert!(Arc::ptr_eq(&before, &selectors.conversation_selector(&state)));

    let mut user = (*state.user).clone();
    user.region_code = Some("GB".to_string());
    let moved = state.with_user(user);
    let after = selectors.conversation_selector(&moved);
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(after.cached_len(), 0);
}

#[test]
fn blocked_contacts_are_never_composable() {
    let mut blocked = trusted_contact("blocked", "Blocked");
    blocked.is_blocked = true;
    blocked.is_me = true;
    let mut removed = trusted_contact("removed", "Removed");
    removed.removal_stage = Some(RemovalStage::JustNotification);
    let state = state_of(vec![blocked, removed, trusted_contact("ok", "Okay")]);
    let selectors = selectors();

    assert_eq!(ids(&selectors.composable_contacts(&state)), vec!["ok"]);
    assert_eq!(ids(&selectors.all_composable_conversations(&state)), vec!["ok"]);
}

#[test]
fn recently_unregistered_contacts_are_hidden() {
    let mut gone = trusted_contact("gone", "Gone");
    gone.discovered_unregistered_at = Some(NOW - 60_000);
    let mut back = trusted_contact("back", "Back");
    back.discovered_unregistered_at = Some(NOW - 7 * 60 * 60 * 1000);
    let state = state_of(vec![gone, back]);

    assert_eq!(ids(&selectors().composable_contacts(&state)), vec!["back"]);
}

#[test]
fn note_to_self_is_composable_but_not_a_group_candidate() {
    let state = demo_state(2, 4);
    let selectors = selectors();

    let contacts = selectors.composable_contacts(&state);
    assert!(contacts.iter().any(|c| c.id == DEMO_ME_ID));
    assert!(contacts.iter().all(|c| c.id != "signal"));
    assert_eq!(contacts.len(), 7);

    let candidates = selectors.candidate_contacts_for_new_group(&state);
    assert!(candidates.iter().all(|c| c.id != DEMO_ME_ID));
    assert_eq!(candidates.len(), 6);

    assert_eq!(ids(&selectors.composable_groups(&state)), vec![DEMO_GROUP_ID]);
}

#[test]
fn compose_search_uses_trimmed_term() {
    let state = demo_state(2, 2).with_composer(Some(ComposerState::StartDirectConversation {
        search_term: "  part ".to_string(),
        uuid_fetch_state: Default::default(),
    }));
    let selectors = selectors();
    assert_eq!(selectors.composer_conversation_search_term(&state), "  part ");
    assert_eq!(ids(&selectors.filtered_compose_contacts(&state)), vec![DEMO_PARTNER_ID]);
}

#[test]
fn filtered_groups_always_carry_member_count() {
    let mut group = ConversationType::group("g", "Climbers");
    group.name = Some("Climbers".to_string());
    let state = state_of(vec![group]).with_composer(Some(ComposerState::StartDirectConversation {
        search_term: String::new(),
        uuid_fetch_state: Default::default(),
    }));

    let groups = selectors().filtered_compose_groups(&state);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].members_count, Some(0));
}

#[test]
fn group_creation_fields_come_from_the_draft() {
    let draft = GroupDraft {
        group_name: "Trip".to_string(),
        group_expire_timer: 3600,
        selected_conversation_ids: vec![DEMO_PARTNER_ID.to_string(), "missing".to_string()],
        ..Default::default()
    };
    let state = demo_state(1, 0).with_composer(Some(ComposerState::SetGroupMetadata {
        has_error: true,
        is_creating: false,
        is_editing_avatar: false,
        draft,
    }));
    let selectors = selectors();

    assert_eq!(selectors.compose_group_name(&state), "Trip");
    assert_eq!(selectors.compose_group_expire_timer(&state), 3600);
    assert!(selectors.has_group_creation_error(&state));
    assert!(!selectors.is_creating_group(&state));
    assert_eq!(ids(&selectors.compose_selected_contacts(&state)), vec![DEMO_PARTNER_ID]);
}

#[test]
fn member_colors_follow_uuid_order() {
    let state = demo_state(1, 0);
    let selectors = selectors();
    let colors = selectors.contact_name_color_selector(&state);

    assert_eq!(colors.get(DEMO_GROUP_ID, Some(DEMO_ME_ID)), CONTACT_NAME_COLORS[0]);
    assert_eq!(colors.get(DEMO_GROUP_ID, Some(DEMO_PARTNER_ID)), CONTACT_NAME_COLORS[1]);
    assert_eq!(colors.get(DEMO_GROUP_ID, Some("stranger")), CONTACT_NAME_COLORS[0]);
    assert_eq!(colors.get(DEMO_PARTNER_ID, None), CONTACT_NAME_COLORS[0]);
}

#[test]
fn group_admins_resolve_through_uuids() {
    let state = demo_state(1, 0);
    let selectors = selectors();
    let admins = selectors.group_admins_selector(&state).get(DEMO_GROUP_ID);
    assert_eq!(ids(&admins), vec![DEMO_ME_ID]);
    assert!(selectors.group_admins_selector(&state).get(DEMO_PARTNER_ID).is_empty());
}

#[test]
fn timeline_props_for_loaded_and_missing_windows() {
    let state = demo_state(3, 0);
    let selectors = selectors();
    let timeline = selectors.conversation_messages_selector(&state);

    let props = timeline.get(DEMO_PARTNER_ID);
    assert_eq!(props.items.len(), 3);
    assert!(props.have_newest);
    assert!(props.have_oldest);
    assert_eq!(props.oldest_unseen_index, Some(2));
    assert_eq!(props.total_unseen, 1);
    assert!(Arc::ptr_eq(&props, &timeline.get(DEMO_PARTNER_ID)));

    let empty = timeline.get("t9");
    assert!(empty.items.is_empty());
    assert!(!empty.have_newest);
    assert_eq!(
        empty.message_loading_state,
        Some(golden_thread_selectors::models::MessageLoadingState::DoingInitialLoad)
    );
}

#[test]
fn story_mode_groups_are_split_out() {
    let state = demo_state(1, 0);
    let selectors = selectors();

    let stories = selectors.group_stories(&state);
    assert_eq!(ids(&stories), vec![DEMO_GROUP_ID]);
    assert_eq!(stories[0].has_stories, Some(HasStories::Unread));
    assert!(selectors.non_group_stories(&state).is_empty());
    assert!(selectors.conversation_ids_with_stories(&state).contains(DEMO_GROUP_ID));

    let timestamps = selectors.most_recent_active_story_timestamp_by_group_or_distribution_list(&state);
    assert!(timestamps.contains_key(DEMO_GROUP_ID));
}

#[test]
fn verification_blocks_are_deduplicated() {
    let mut data = std::collections::BTreeMap::new();
    data.insert(
        DEMO_PARTNER_ID.to_string(),
        ConversationVerificationData::PendingVerification {
            uuids_needing_verification: vec![demo_uuid(2)],
            by_distribution_id: Some(
                [(
                    "list".to_string(),
                    DistributionVerification {
                        uuids_needing_verification: vec![demo_uuid(2), demo_uuid(3)],
                    },
                )]
                .into_iter()
                .collect(),
            ),
        },
    );
    data.insert(
        DEMO_GROUP_ID.to_string(),
        ConversationVerificationData::PendingVerification {
            uuids_needing_verification: vec![demo_uuid(3)],
            by_distribution_id: None,
        },
    );
    let state = demo_state(1, 0).with_verification_data(data);
    let selectors = selectors();

    assert_eq!(selectors.conversation_uuids_stopping_send(&state).len(), 2);
    assert_eq!(
        *selectors.conversation_ids_stopped_for_verification(&state),
        vec![DEMO_GROUP_ID.to_string(), DEMO_PARTNER_ID.to_string()]
    );
    let blocked = selectors.conversations_stopping_send(&state);
    let titles: Vec<&str> = blocked.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Partner", "Pinned friend"]);
}

#[test]
fn me_falls_back_to_placeholder() {
    let state = demo_state(1, 0);
    let selectors = selectors();
    assert_eq!(selectors.me(&state).id, DEMO_ME_ID);

    let mut user = (*state.user).clone();
    user.our_conversation_id = None;
    assert_eq!(selectors.me(&state.with_user(user)).id, PLACEHOLDER_CONTACT_ID);
}
