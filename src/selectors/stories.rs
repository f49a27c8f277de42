use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::conversation::is_group_in_story_mode;
use crate::memo::Memo;
use crate::models::{ConversationLookup, ConversationType, HasStories, StoryDataType};
use crate::state::AppState;

use super::{ConversationList, Selectors};

/// Per-conversation story badge: unread while any story is unread.
#[derive(Debug)]
pub struct HasStoriesSelector {
    by_conversation: HashMap<String, HasStories>,
}

impl HasStoriesSelector {
    fn new(stories: &[StoryDataType]) -> Self {
        let mut by_conversation = HashMap::new();
        for story in stories {
            let status = if story.read_at.is_some() {
                HasStories::Read
            } else {
                HasStories::Unread
            };
            by_conversation
                .entry(story.conversation_id.clone())
                .and_modify(|current| {
                    if status == HasStories::Unread {
                        *current = HasStories::Unread;
                    }
                })
                .or_insert(status);
        }
        HasStoriesSelector { by_conversation }
    }

    pub fn get(&self, conversation_id: &str) -> Option<HasStories> {
        self.by_conversation.get(conversation_id).copied()
    }
}

type StoryList = Arc<Vec<StoryDataType>>;

pub(super) struct StoryMemos {
    ids_with_stories: Memo<(StoryList,), Arc<HashSet<String>>>,
    has_stories: Memo<(StoryList,), Arc<HasStoriesSelector>>,
    non_group_stories: Memo<(ConversationList, Arc<HashSet<String>>), ConversationList>,
    group_stories: Memo<
        (Arc<ConversationLookup>, Arc<HashSet<String>>, Arc<HasStoriesSelector>),
        ConversationList,
    >,
    most_recent: Memo<(StoryList,), Arc<BTreeMap<String, i64>>>,
    hidden: Memo<(ConversationList,), Arc<Vec<String>>>,
}

impl StoryMemos {
    pub(super) fn new() -> Self {
        StoryMemos {
            ids_with_stories: Memo::new("conversation_ids_with_stories"),
            has_stories: Memo::new("has_stories_selector"),
            non_group_stories: Memo::new("non_group_stories"),
            group_stories: Memo::new("group_stories"),
            most_recent: Memo::new("most_recent_active_story_timestamp"),
            hidden: Memo::new("hide_story_conversation_ids"),
        }
    }

    pub(super) fn reset(&self) {
        self.ids_with_stories.reset();
        self.has_stories.reset();
        self.non_group_stories.reset();
        self.group_stories.reset();
        self.most_recent.reset();
        self.hidden.reset();
    }
}

impl Selectors {
    pub fn conversation_ids_with_stories(&self, state: &AppState) -> Arc<HashSet<String>> {
        self.stories.ids_with_stories.select(
            (Arc::clone(&state.stories.stories),),
            |(stories,)| {
                Arc::new(
                    stories
                        .iter()
                        .map(|story| story.conversation_id.clone())
                        .collect(),
                )
            },
        )
    }

    pub fn has_stories_selector(&self, state: &AppState) -> Arc<HasStoriesSelector> {
        self.stories.has_stories.select(
            (Arc::clone(&state.stories.stories),),
            |(stories,)| Arc::new(HasStoriesSelector::new(stories)),
        )
    }

    /// Composable groups that post to the regular timeline rather than stories.
    pub fn non_group_stories(&self, state: &AppState) -> ConversationList {
        let inputs = (
            self.composable_groups(state),
            self.conversation_ids_with_stories(state),
        );
        self.stories
            .non_group_stories
            .select(inputs, |(groups, with_stories)| {
                Arc::new(
                    groups
                        .iter()
                        .filter(|group| !is_group_in_story_mode(group, with_stories) && !group.left)
                        .cloned()
                        .collect(),
                )
            })
    }

    /// Groups in story mode, each annotated with its story badge.
    pub fn group_stories(&self, state: &AppState) -> ConversationList {
        let inputs = (
            Arc::clone(&state.conversations.conversation_lookup),
            self.conversation_ids_with_stories(state),
            self.has_stories_selector(state),
        );
        self.stories
            .group_stories
            .select(inputs, |(lookup, with_stories, has_stories)| {
                Arc::new(
                    lookup
                        .values()
                        .filter(|conversation| {
                            is_group_in_story_mode(conversation, with_stories) && !conversation.left
                        })
                        .map(|conversation| {
                            Arc::new(ConversationType {
                                has_stories: has_stories.get(&conversation.id),
                                ..(**conversation).clone()
                            })
                        })
                        .collect(),
                )
            })
    }

    /// Newest story timestamp per distribution list, or per conversation for
    /// stories sent without one.
    pub fn most_recent_active_story_timestamp_by_group_or_distribution_list(
        &self,
        state: &AppState,
    ) -> Arc<BTreeMap<String, i64>> {
        self.stories.most_recent.select(
            (Arc::clone(&state.stories.stories),),
            |(stories,)| {
                let mut newest: BTreeMap<String, i64> = BTreeMap::new();
                for story in stories.iter() {
                    let key = story
                        .story_distribution_list_id
                        .as_ref()
                        .unwrap_or(&story.conversation_id);
                    let entry = newest.entry(key.clone()).or_insert(story.timestamp);
                    if story.timestamp > *entry {
                        *entry = story.timestamp;
                    }
                }
                Arc::new(newest)
            },
        )
    }

    pub fn hide_story_conversation_ids(&self, state: &AppState) -> Arc<Vec<String>> {
        self.stories
            .hidden
            .select((self.all_conversations(state),), |(conversations,)| {
                Arc::new(
                    conversations
                        .iter()
                        .filter(|conversation| conversation.hide_story)
                        .map(|conversation| conversation.id.clone())
                        .collect(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(conversation_id: &str, read_at: Option<i64>) -> StoryDataType {
        StoryDataType {
            message_id: format!("story-{}", conversation_id),
            conversation_id: conversation_id.to_string(),
            story_distribution_list_id: None,
            timestamp: 1,
            read_at,
        }
    }

    #[test]
    fn any_unread_story_marks_conversation_unread() {
        let selector = HasStoriesSelector::new(&[
            story("a", Some(10)),
            story("a", None),
            story("b", Some(5)),
        ]);
        assert_eq!(selector.get("a"), Some(HasStories::Unread));
        assert_eq!(selector.get("b"), Some(HasStories::Read));
        assert_eq!(selector.get("c"), None);
    }
}
