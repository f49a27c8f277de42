use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComposerStep {
    StartDirectConversation,
    ChooseGroupMembers,
    SetGroupMetadata,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OneTimeModalState {
    #[default]
    NeverShown,
    Showing,
    Shown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarDataType {
    pub id: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub text: Option<String>,
    pub image_path: Option<String>,
}

/// Identifier (username or phone number) -> lookup in flight.
pub type UuidFetchState = BTreeMap<String, bool>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupDraft {
    pub group_name: String,
    pub group_avatar: Option<Vec<u8>>,
    pub group_expire_timer: u32,
    pub selected_conversation_ids: Vec<String>,
    pub recommended_group_size_modal_state: OneTimeModalState,
    pub maximum_group_size_modal_state: OneTimeModalState,
    pub user_avatar_data: Vec<AvatarDataType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ComposerState {
    StartDirectConversation {
        #[serde(default)]
        search_term: String,
        #[serde(default)]
        uuid_fetch_state: UuidFetchState,
    },
    ChooseGroupMembers {
        #[serde(default)]
        search_term: String,
        #[serde(default)]
        uuid_fetch_state: UuidFetchState,
        #[serde(default)]
        draft: GroupDraft,
    },
    SetGroupMetadata {
        #[serde(default)]
        has_error: bool,
        #[serde(default)]
        is_creating: bool,
        #[serde(default)]
        is_editing_avatar: bool,
        #[serde(default)]
        draft: GroupDraft,
    },
}

impl ComposerState {
    pub fn step(&self) -> ComposerStep {
        match self {
            ComposerState::StartDirectConversation { .. } => ComposerStep::StartDirectConversation,
            ComposerState::ChooseGroupMembers { .. } => ComposerStep::ChooseGroupMembers,
            ComposerState::SetGroupMetadata { .. } => ComposerStep::SetGroupMetadata,
        }
    }

    pub fn search_term(&self) -> Result<&str, CoreError> {
        match self {
            ComposerState::StartDirectConversation { search_term, .. }
            | ComposerState::ChooseGroupMembers { search_term, .. } => Ok(search_term),
            ComposerState::SetGroupMetadata { .. } => Err(CoreError::InvalidComposerState(
                "composer does not have a search term".to_string(),
            )),
        }
    }

    pub fn uuid_fetch_state(&self) -> Result<&UuidFetchState, CoreError> {
        match self {
            ComposerState::StartDirectConversation { uuid_fetch_state, .. }
            | ComposerState::ChooseGroupMembers { uuid_fetch_state, .. } => Ok(uuid_fetch_state),
            other => Err(CoreError::InvalidComposerState(format!(
                "step {:?} has no uuid fetch state",
                other.step()
            ))),
        }
    }

    /// Group fields shared by the two group creation steps.
    pub fn group_creation(&self) -> Result<&GroupDraft, CoreError> {
        match self {
            ComposerState::ChooseGroupMembers { draft, .. }
            | ComposerState::SetGroupMetadata { draft, .. } => Ok(draft),
            ComposerState::StartDirectConversation { .. } => Err(CoreError::InvalidComposerState(
                "expected a group creation step".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_group_metadata_has_no_search_term() {
        let state = ComposerState::SetGroupMetadata {
            has_error: false,
            is_creating: false,
            is_editing_avatar: false,
            draft: GroupDraft::default(),
        };
        assert!(matches!(
            state.search_term(),
            Err(CoreError::InvalidComposerState(_))
        ));
        assert!(state.uuid_fetch_state().is_err());
        assert!(state.group_creation().is_ok());
    }

    #[test]
    fn composer_state_decodes_tagged_json() {
        let json = r#"{"step":"choose_group_members","search_term":"al","draft":{"group_name":"Hikers","selected_conversation_ids":["c1"]}}"#;
        let state: ComposerState = serde_json::from_str(json).expect("decode");
        assert_eq!(state.step(), ComposerStep::ChooseGroupMembers);
        assert_eq!(state.search_term().expect("term"), "al");
        let draft = state.group_creation().expect("draft");
        assert_eq!(draft.group_name, "Hikers");
        assert_eq!(draft.selected_conversation_ids, vec!["c1".to_string()]);
    }
}
