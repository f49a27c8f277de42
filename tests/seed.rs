use golden_thread_selectors::seed::{demo_state, DEMO_PARTNER_ID};
use golden_thread_selectors::Selectors;

#[test]
fn demo_seed_selector_roundtrip() {
    let state = demo_state(2, 0);
    let selectors = Selectors::default();

    let lists = selectors.left_pane_lists(&state);
    assert_eq!(lists.conversations.len(), 2);
    assert_eq!(lists.pinned_conversations.len(), 1);

    let timeline = selectors.conversation_messages_selector(&state).get(DEMO_PARTNER_ID);
    assert_eq!(timeline.items.len(), 2);
    assert_eq!(state.conversations.messages_lookup.len(), 2);

    let hits = selectors.conversations_by_title_selector(&state).get("Partner");
    assert_eq!(hits.len(), 1);
    assert_eq!(selectors.conversations_stopping_send(&state).len(), 1);
}
