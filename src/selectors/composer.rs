use std::sync::Arc;

use crate::composer::{
    AvatarDataType, ComposerState, ComposerStep, GroupDraft, OneTimeModalState, UuidFetchState,
};
use crate::conversation::deconstruct_lookup;
use crate::memo::Memo;
use crate::models::{ConversationLookup, ConversationType};
use crate::search::filter_and_sort_conversations_by_recent;
use crate::state::AppState;

use super::{ConversationList, Selectors};

type ComposerInput = Option<Arc<ComposerState>>;
type FilterInputs = (String, ConversationList, Option<String>);

pub(super) struct ComposerMemos {
    search_term: Memo<(ComposerInput,), String>,
    uuid_fetch_state: Memo<(ComposerInput,), Arc<UuidFetchState>>,
    group_creation: Memo<(ComposerInput,), Arc<GroupDraft>>,
    selected_contacts: Memo<(Arc<ConversationLookup>, Arc<GroupDraft>), ConversationList>,
    filtered_contacts: Memo<FilterInputs, ConversationList>,
    filtered_groups: Memo<FilterInputs, ConversationList>,
    filtered_candidates: Memo<FilterInputs, ConversationList>,
}

impl ComposerMemos {
    pub(super) fn new() -> Self {
        ComposerMemos {
            search_term: Memo::new("composer_conversation_search_term"),
            uuid_fetch_state: Memo::new("composer_uuid_fetch_state"),
            group_creation: Memo::new("group_creation_composer_state"),
            selected_contacts: Memo::new("compose_selected_contacts"),
            filtered_contacts: Memo::new("filtered_compose_contacts"),
            filtered_groups: Memo::new("filtered_compose_groups"),
            filtered_candidates: Memo::new("filtered_candidate_contacts_for_new_group"),
        }
    }

    pub(super) fn reset(&self) {
        self.search_term.reset();
        self.uuid_fetch_state.reset();
        self.group_creation.reset();
        self.selected_contacts.reset();
        self.filtered_contacts.reset();
        self.filtered_groups.reset();
        self.filtered_candidates.reset();
    }
}

fn set_group_metadata(composer: Option<&ComposerState>) -> Option<(bool, bool, bool, &GroupDraft)> {
    match composer {
        Some(ComposerState::SetGroupMetadata {
            has_error,
            is_creating,
            is_editing_avatar,
            draft,
        }) => Some((*has_error, *is_creating, *is_editing_avatar, draft)),
        _ => None,
    }
}

// Reads that only make sense for some composer steps go through
// `Diagnostics::assert_dev` and fall back to an empty value. Use the
// accessors on `ComposerState` to get a typed error instead.
impl Selectors {
    pub fn composer_state(&self, state: &AppState) -> Option<Arc<ComposerState>> {
        state.conversations.composer.clone()
    }

    pub fn composer_step(&self, state: &AppState) -> Option<ComposerStep> {
        state.conversations.composer.as_deref().map(ComposerState::step)
    }

    pub fn has_group_creation_error(&self, state: &AppState) -> bool {
        set_group_metadata(state.conversations.composer.as_deref())
            .map_or(false, |(has_error, ..)| has_error)
    }

    pub fn is_creating_group(&self, state: &AppState) -> bool {
        set_group_metadata(state.conversations.composer.as_deref())
            .map_or(false, |(_, is_creating, ..)| is_creating)
    }

    pub fn is_editing_avatar(&self, state: &AppState) -> bool {
        set_group_metadata(state.conversations.composer.as_deref())
            .map_or(false, |(_, _, is_editing_avatar, _)| is_editing_avatar)
    }

    pub fn compose_avatar_data(&self, state: &AppState) -> Vec<AvatarDataType> {
        set_group_metadata(state.conversations.composer.as_deref())
            .map(|(.., draft)| draft.user_avatar_data.clone())
            .unwrap_or_default()
    }

    pub fn maximum_group_size_modal_state(&self, state: &AppState) -> OneTimeModalState {
        match state.conversations.composer.as_deref().map(ComposerState::group_creation) {
            Some(Ok(draft)) => draft.maximum_group_size_modal_state,
            _ => {
                self.diagnostics.assert_dev(
                    false,
                    "can't get the maximum group size modal state in this composer state; returning \"never shown\"",
                );
                OneTimeModalState::NeverShown
            }
        }
    }

    pub fn recommended_group_size_modal_state(&self, state: &AppState) -> OneTimeModalState {
        match state.conversations.composer.as_deref().map(ComposerState::group_creation) {
            Some(Ok(draft)) => draft.recommended_group_size_modal_state,
            _ => {
                self.diagnostics.assert_dev(
                    false,
                    "can't get the recommended group size modal state in this composer state; returning \"never shown\"",
                );
                OneTimeModalState::NeverShown
            }
        }
    }

    pub fn composer_conversation_search_term(&self, state: &AppState) -> String {
        self.composer.search_term.select(
            (state.conversations.composer.clone(),),
            |(composer,)| match composer.as_deref().map(ComposerState::search_term) {
                None => {
                    self.diagnostics.assert_dev(
                        false,
                        "composer_conversation_search_term: composer is not open",
                    );
                    String::new()
                }
                Some(Err(err)) => {
                    self.diagnostics.assert_dev(
                        false,
                        &format!("composer_conversation_search_term: {}", err),
                    );
                    String::new()
                }
                Some(Ok(term)) => term.to_string(),
            },
        )
    }

    pub fn composer_uuid_fetch_state(&self, state: &AppState) -> Arc<UuidFetchState> {
        self.composer.uuid_fetch_state.select(
            (state.conversations.composer.clone(),),
            |(composer,)| match composer.as_deref().map(ComposerState::uuid_fetch_state) {
                None => {
                    self.diagnostics
                        .assert_dev(false, "composer_uuid_fetch_state: composer is not open");
                    Arc::default()
                }
                Some(Err(err)) => {
                    self.diagnostics
                        .assert_dev(false, &format!("composer_uuid_fetch_state: {}", err));
                    Arc::default()
                }
                Some(Ok(fetch_state)) => Arc::new(fetch_state.clone()),
            },
        )
    }

    fn group_creation_composer_state(&self, state: &AppState) -> Arc<GroupDraft> {
        self.composer.group_creation.select(
            (state.conversations.composer.clone(),),
            |(composer,)| match composer.as_deref().map(ComposerState::group_creation) {
                Some(Ok(draft)) => Arc::new(draft.clone()),
                _ => {
                    self.diagnostics.assert_dev(
                        false,
                        "group_creation_composer_state: expected a group creation step",
                    );
                    Arc::default()
                }
            },
        )
    }

    pub fn compose_group_avatar(&self, state: &AppState) -> Option<Vec<u8>> {
        self.group_creation_composer_state(state).group_avatar.clone()
    }

    pub fn compose_group_name(&self, state: &AppState) -> String {
        self.group_creation_composer_state(state).group_name.clone()
    }

    /// Disappearing-message timer for the new group, in seconds.
    pub fn compose_group_expire_timer(&self, state: &AppState) -> u32 {
        self.group_creation_composer_state(state).group_expire_timer
    }

    pub fn compose_selected_contacts(&self, state: &AppState) -> ConversationList {
        let inputs = (
            Arc::clone(&state.conversations.conversation_lookup),
            self.group_creation_composer_state(state),
        );
        self.composer.selected_contacts.select(inputs, |(lookup, draft)| {
            Arc::new(deconstruct_lookup(lookup, &draft.selected_conversation_ids))
        })
    }

    fn normalized_search_term(&self, state: &AppState) -> String {
        self.composer_conversation_search_term(state).trim().to_string()
    }

    pub fn filtered_compose_contacts(&self, state: &AppState) -> ConversationList {
        let inputs = (
            self.normalized_search_term(state),
            self.composable_contacts(state),
            state.user.region_code.clone(),
        );
        self.composer
            .filtered_contacts
            .select(inputs, |(term, contacts, region_code)| {
                Arc::new(filter_and_sort_conversations_by_recent(
                    contacts,
                    term,
                    region_code.as_deref(),
                ))
            })
    }

    /// Matching composable groups. Every group carries a member count, zero
    /// when the store has none yet.
    pub fn filtered_compose_groups(&self, state: &AppState) -> ConversationList {
        let inputs = (
            self.normalized_search_term(state),
            self.composable_groups(state),
            state.user.region_code.clone(),
        );
        self.composer
            .filtered_groups
            .select(inputs, |(term, groups, region_code)| {
                Arc::new(
                    filter_and_sort_conversations_by_recent(groups, term, region_code.as_deref())
                        .into_iter()
                        .map(|group| {
                            if group.members_count.is_some() {
                                group
                            } else {
                                Arc::new(ConversationType {
                                    members_count: Some(0),
                                    ..(*group).clone()
                                })
                            }
                        })
                        .collect(),
                )
            })
    }

    pub fn filtered_candidate_contacts_for_new_group(&self, state: &AppState) -> ConversationList {
        let inputs = (
            self.normalized_search_term(state),
            self.candidate_contacts_for_new_group(state),
            state.user.region_code.clone(),
        );
        self.composer
            .filtered_candidates
            .select(inputs, |(term, candidates, region_code)| {
                Arc::new(filter_and_sort_conversations_by_recent(
                    candidates,
                    term,
                    region_code.as_deref(),
                ))
            })
    }
}
