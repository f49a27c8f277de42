use std::collections::HashMap;
use std::sync::Arc;

use crate::config::capacity;
use crate::conversation::{deconstruct_lookup, is_group_v2};
use crate::diagnostics::Diagnostics;
use crate::memo::{BoundedCache, ByAddress, Memo};
use crate::models::{
    ContactNameColor, ContactSummary, ConversationKind, ConversationLookup, ConversationType,
    CONTACT_NAME_COLORS,
};
use crate::state::AppState;

use super::{ConversationList, Selectors};

type ConversationCache = BoundedCache<ByAddress<ConversationType>, Arc<ConversationType>>;

/// Resolves any identifier a caller may hold to a conversation record.
///
/// Resolution order is uuid (case-insensitive), e164, group id, then internal
/// id. Unknown and empty identifiers resolve to the placeholder contact, so the
/// result is always renderable.
#[derive(Debug)]
pub struct ConversationSelector {
    by_uuid: Arc<ConversationLookup>,
    by_e164: Arc<ConversationLookup>,
    by_group_id: Arc<ConversationLookup>,
    by_id: Arc<ConversationLookup>,
    cache: Arc<ConversationCache>,
    placeholder: Arc<ConversationType>,
    diagnostics: Arc<Diagnostics>,
}

impl ConversationSelector {
    pub fn get(&self, id: Option<&str>) -> Arc<ConversationType> {
        let id = match id {
            Some(id) if !id.is_empty() => id,
            _ => return Arc::clone(&self.placeholder),
        };

        let found = self
            .by_uuid
            .get(&id.to_lowercase())
            .or_else(|| self.by_e164.get(id))
            .or_else(|| self.by_group_id.get(id))
            .or_else(|| self.by_id.get(id));

        match found {
            Some(conversation) => self
                .cache
                .get_or_insert_with(ByAddress(Arc::clone(conversation)), |key| Arc::clone(&key.0)),
            None => {
                self.diagnostics.warn(
                    "lookup_miss",
                    &format!("could not find conversation with id {}", id),
                );
                Arc::clone(&self.placeholder)
            }
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

/// Exact-key lookup over a single index. Misses are `None`, not the placeholder.
#[derive(Debug)]
pub struct KeyedConversationSelector {
    lookup: Arc<ConversationLookup>,
    lowercase_keys: bool,
}

impl KeyedConversationSelector {
    pub fn get(&self, key: &str) -> Option<Arc<ConversationType>> {
        if self.lowercase_keys {
            self.lookup.get(&key.to_lowercase()).cloned()
        } else {
            self.lookup.get(key).cloned()
        }
    }
}

const MISSING_UUID_SORT_KEY: &str = "undefined";

/// Assigns contact name colors for one conversation.
///
/// In a direct conversation both sides get the first palette color. In a group
/// the members are ordered by uuid and walk the palette in that order.
pub fn member_colors(
    conversation: &ConversationType,
    our_conversation_id: Option<&str>,
) -> HashMap<String, ContactNameColor> {
    let mut colors = HashMap::new();
    if conversation.kind == ConversationKind::Direct {
        if let Some(our_id) = our_conversation_id {
            colors.insert(our_id.to_string(), CONTACT_NAME_COLORS[0]);
        }
        colors.insert(conversation.id.clone(), CONTACT_NAME_COLORS[0]);
        return colors;
    }

    // members without a uuid sort under the literal key "undefined"
    let mut members: Vec<_> = conversation.sorted_group_members.iter().collect();
    members.sort_by(|left, right| {
        let left = left.uuid.as_deref().unwrap_or(MISSING_UUID_SORT_KEY);
        left.cmp(right.uuid.as_deref().unwrap_or(MISSING_UUID_SORT_KEY))
    });
    for (idx, member) in members.into_iter().enumerate() {
        colors.insert(
            member.id.clone(),
            CONTACT_NAME_COLORS[idx % CONTACT_NAME_COLORS.len()],
        );
    }
    colors
}

#[derive(Debug)]
pub struct MemberColorsSelector {
    conversations: Arc<ConversationSelector>,
    our_conversation_id: Option<String>,
    cache: BoundedCache<String, Arc<HashMap<String, ContactNameColor>>>,
}

impl MemberColorsSelector {
    pub fn get(&self, conversation_id: &str) -> Arc<HashMap<String, ContactNameColor>> {
        self.cache
            .get_or_insert_with(conversation_id.to_string(), |id| {
                let conversation = self.conversations.get(Some(id));
                Arc::new(member_colors(
                    &conversation,
                    self.our_conversation_id.as_deref(),
                ))
            })
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[derive(Debug)]
pub struct ContactNameColorSelector {
    member_colors: Arc<MemberColorsSelector>,
    diagnostics: Arc<Diagnostics>,
}

impl ContactNameColorSelector {
    pub fn get(&self, conversation_id: &str, contact_id: Option<&str>) -> ContactNameColor {
        let contact_id = match contact_id {
            Some(id) => id,
            None => {
                self.diagnostics.warn(
                    "missing_color",
                    &format!("no contact id for color in conversation {}", conversation_id),
                );
                return CONTACT_NAME_COLORS[0];
            }
        };

        let color = self.member_colors.get(conversation_id).get(contact_id).copied();
        match color {
            Some(color) => color,
            None => {
                self.diagnostics.warn(
                    "missing_color",
                    &format!(
                        "no color for contact {} in conversation {}",
                        contact_id, conversation_id
                    ),
                );
                CONTACT_NAME_COLORS[0]
            }
        }
    }
}

#[derive(Debug)]
pub struct GroupAdminsSelector {
    conversations: Arc<ConversationSelector>,
}

impl GroupAdminsSelector {
    pub fn get(&self, conversation_id: &str) -> Vec<Arc<ConversationType>> {
        let group = self.conversations.get(Some(conversation_id));
        if !is_group_v2(group.group_id.as_deref(), group.group_version) {
            return Vec::new();
        }
        group
            .memberships
            .iter()
            .filter(|membership| membership.is_admin)
            .map(|membership| self.conversations.get(Some(&membership.uuid)))
            .collect()
    }
}

#[derive(Debug)]
pub struct ContactSelector {
    conversations: Arc<ConversationSelector>,
}

impl ContactSelector {
    pub fn get(&self, conversation_id: &str) -> ContactSummary {
        let conversation = self.conversations.get(Some(conversation_id));
        ContactSummary {
            id: conversation.id.clone(),
            title: conversation.title.clone(),
            uuid: conversation.uuid.clone(),
        }
    }
}

#[derive(Debug)]
pub struct ConversationsByTitleSelector {
    conversations: ConversationList,
}

impl ConversationsByTitleSelector {
    pub fn get(&self, title: &str) -> Vec<Arc<ConversationType>> {
        self.conversations
            .iter()
            .filter(|conversation| conversation.title == title)
            .cloned()
            .collect()
    }
}

#[derive(Debug)]
pub struct CustomColorSelector {
    conversations: ConversationList,
}

impl CustomColorSelector {
    pub fn get(&self, color_id: &str) -> Vec<Arc<ConversationType>> {
        self.conversations
            .iter()
            .filter(|conversation| conversation.custom_color_id.as_deref() == Some(color_id))
            .cloned()
            .collect()
    }
}

type SelectorInputs = (
    Arc<ConversationLookup>,
    Arc<ConversationLookup>,
    Arc<ConversationLookup>,
    Arc<ConversationLookup>,
    Arc<ConversationCache>,
);

pub(super) struct LookupMemos {
    cached_conversations: Memo<(Option<String>, Option<String>), Arc<ConversationCache>>,
    conversation_selector: Memo<SelectorInputs, Arc<ConversationSelector>>,
    by_id: Memo<(Arc<ConversationLookup>,), Arc<KeyedConversationSelector>>,
    by_uuid: Memo<(Arc<ConversationLookup>,), Arc<KeyedConversationSelector>>,
    member_colors: Memo<(Arc<ConversationSelector>, Option<String>), Arc<MemberColorsSelector>>,
    contact_name_color: Memo<(Arc<MemberColorsSelector>,), Arc<ContactNameColorSelector>>,
    group_admins: Memo<(Arc<ConversationSelector>,), Arc<GroupAdminsSelector>>,
    contact: Memo<(Arc<ConversationSelector>,), Arc<ContactSelector>>,
    by_title: Memo<(ConversationList,), Arc<ConversationsByTitleSelector>>,
    custom_color: Memo<(ConversationList,), Arc<CustomColorSelector>>,
    invited: Memo<(Arc<ConversationLookup>, Option<Arc<Vec<String>>>), ConversationList>,
}

impl LookupMemos {
    pub(super) fn new() -> Self {
        LookupMemos {
            cached_conversations: Memo::new("cached_conversation_selector"),
            conversation_selector: Memo::new("conversation_selector"),
            by_id: Memo::new("conversation_by_id_selector"),
            by_uuid: Memo::new("conversation_by_uuid_selector"),
            member_colors: Memo::new("member_colors_selector"),
            contact_name_color: Memo::new("contact_name_color_selector"),
            group_admins: Memo::new("group_admins_selector"),
            contact: Memo::new("contact_selector"),
            by_title: Memo::new("conversations_by_title_selector"),
            custom_color: Memo::new("conversations_with_custom_color_selector"),
            invited: Memo::new("invited_contacts_for_newly_created_group"),
        }
    }

    pub(super) fn reset(&self) {
        self.cached_conversations.reset();
        self.conversation_selector.reset();
        self.by_id.reset();
        self.by_uuid.reset();
        self.member_colors.reset();
        self.contact_name_color.reset();
        self.group_admins.reset();
        self.contact.reset();
        self.by_title.reset();
        self.custom_color.reset();
        self.invited.reset();
    }
}

impl Selectors {
    // Recreated when the region or our number changes, which is when rendered
    // conversation props would change without the records themselves changing.
    fn cached_conversations(&self, state: &AppState) -> Arc<ConversationCache> {
        let inputs = (state.user.region_code.clone(), state.user.our_number.clone());
        self.lookup.cached_conversations.select(inputs, |_| {
            Arc::new(BoundedCache::new(
                "conversation",
                capacity(self.config.conversation_cache_capacity),
            ))
        })
    }

    pub fn conversation_selector(&self, state: &AppState) -> Arc<ConversationSelector> {
        let conversations = &state.conversations;
        let inputs = (
            Arc::clone(&conversations.conversations_by_uuid),
            Arc::clone(&conversations.conversations_by_e164),
            Arc::clone(&conversations.conversations_by_group_id),
            Arc::clone(&conversations.conversation_lookup),
            self.cached_conversations(state),
        );
        self.lookup.conversation_selector.select(
            inputs,
            |(by_uuid, by_e164, by_group_id, by_id, cache)| {
                Arc::new(ConversationSelector {
                    by_uuid: Arc::clone(by_uuid),
                    by_e164: Arc::clone(by_e164),
                    by_group_id: Arc::clone(by_group_id),
                    by_id: Arc::clone(by_id),
                    cache: Arc::clone(cache),
                    placeholder: self.placeholder_contact(),
                    diagnostics: Arc::clone(&self.diagnostics),
                })
            },
        )
    }

    pub fn conversation_by_id_selector(&self, state: &AppState) -> Arc<KeyedConversationSelector> {
        self.lookup.by_id.select(
            (Arc::clone(&state.conversations.conversation_lookup),),
            |(lookup,)| {
                Arc::new(KeyedConversationSelector {
                    lookup: Arc::clone(lookup),
                    lowercase_keys: false,
                })
            },
        )
    }

    pub fn conversation_by_uuid_selector(
        &self,
        state: &AppState,
    ) -> Arc<KeyedConversationSelector> {
        self.lookup.by_uuid.select(
            (Arc::clone(&state.conversations.conversations_by_uuid),),
            |(lookup,)| {
                Arc::new(KeyedConversationSelector {
                    lookup: Arc::clone(lookup),
                    lowercase_keys: true,
                })
            },
        )
    }

    pub fn member_colors_selector(&self, state: &AppState) -> Arc<MemberColorsSelector> {
        let inputs = (
            self.conversation_selector(state),
            state.user.our_conversation_id.clone(),
        );
        self.lookup
            .member_colors
            .select(inputs, |(conversations, our_id)| {
                Arc::new(MemberColorsSelector {
                    conversations: Arc::clone(conversations),
                    our_conversation_id: our_id.clone(),
                    cache: BoundedCache::new(
                        "member_colors",
                        capacity(self.config.member_colors_cache_capacity),
                    ),
                })
            })
    }

    pub fn contact_name_color_selector(&self, state: &AppState) -> Arc<ContactNameColorSelector> {
        self.lookup.contact_name_color.select(
            (self.member_colors_selector(state),),
            |(member_colors,)| {
                Arc::new(ContactNameColorSelector {
                    member_colors: Arc::clone(member_colors),
                    diagnostics: Arc::clone(&self.diagnostics),
                })
            },
        )
    }

    pub fn group_admins_selector(&self, state: &AppState) -> Arc<GroupAdminsSelector> {
        self.lookup.group_admins.select(
            (self.conversation_selector(state),),
            |(conversations,)| {
                Arc::new(GroupAdminsSelector {
                    conversations: Arc::clone(conversations),
                })
            },
        )
    }

    pub fn contact_selector(&self, state: &AppState) -> Arc<ContactSelector> {
        self.lookup
            .contact
            .select((self.conversation_selector(state),), |(conversations,)| {
                Arc::new(ContactSelector {
                    conversations: Arc::clone(conversations),
                })
            })
    }

    pub fn conversations_by_title_selector(
        &self,
        state: &AppState,
    ) -> Arc<ConversationsByTitleSelector> {
        self.lookup
            .by_title
            .select((self.all_conversations(state),), |(conversations,)| {
                Arc::new(ConversationsByTitleSelector {
                    conversations: Arc::clone(conversations),
                })
            })
    }

    pub fn conversations_with_custom_color_selector(
        &self,
        state: &AppState,
    ) -> Arc<CustomColorSelector> {
        self.lookup
            .custom_color
            .select((self.all_conversations(state),), |(conversations,)| {
                Arc::new(CustomColorSelector {
                    conversations: Arc::clone(conversations),
                })
            })
    }

    pub fn invited_contacts_for_newly_created_group(&self, state: &AppState) -> ConversationList {
        let inputs = (
            Arc::clone(&state.conversations.conversations_by_uuid),
            state.conversations.invited_uuids_for_newly_created_group.clone(),
        );
        self.lookup.invited.select(inputs, |(by_uuid, invited)| {
            let keys: Vec<String> = invited
                .as_deref()
                .map(|uuids| uuids.iter().map(|uuid| uuid.to_lowercase()).collect())
                .unwrap_or_default();
            Arc::new(deconstruct_lookup(by_uuid, &keys))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GroupMember;

    fn member(id: &str, uuid: &str) -> GroupMember {
        GroupMember {
            id: id.to_string(),
            uuid: Some(uuid.to_string()),
            title: id.to_string(),
        }
    }

    #[test]
    fn direct_conversation_colors_both_sides_alike() {
        let conversation = ConversationType::direct("them", "Them");
        let colors = member_colors(&conversation, Some("me"));
        assert_eq!(colors.get("them"), Some(&CONTACT_NAME_COLORS[0]));
        assert_eq!(colors.get("me"), Some(&CONTACT_NAME_COLORS[0]));
    }

    #[test]
    fn group_colors_follow_uuid_order() {
        let mut group = ConversationType::group("g", "Group");
        group.sorted_group_members = vec![member("c", "ccc"), member("a", "aaa"), member("b", "bbb")];
        let colors = member_colors(&group, Some("me"));
        assert_eq!(colors.get("a"), Some(&CONTACT_NAME_COLORS[0]));
        assert_eq!(colors.get("b"), Some(&CONTACT_NAME_COLORS[1]));
        assert_eq!(colors.get("c"), Some(&CONTACT_NAME_COLORS[2]));
        assert!(!colors.contains_key("me"));
    }

    #[test]
    fn members_without_uuid_sort_as_undefined() {
        let mut group = ConversationType::group("g", "Group");
        let anonymous = GroupMember {
            id: "anon".to_string(),
            uuid: None,
            title: "anon".to_string(),
        };
        group.sorted_group_members = vec![anonymous, member("z", "zzz"), member("a", "aaa")];
        let colors = member_colors(&group, None);
        // "aaa" < "undefined" < "zzz"
        assert_eq!(colors.get("a"), Some(&CONTACT_NAME_COLORS[0]));
        assert_eq!(colors.get("anon"), Some(&CONTACT_NAME_COLORS[1]));
        assert_eq!(colors.get("z"), Some(&CONTACT_NAME_COLORS[2]));
    }

    #[test]
    fn palette_wraps_for_large_groups() {
        let mut group = ConversationType::group("g", "Group");
        group.sorted_group_members = (0..13)
            .map(|i| member(&format!("m{:02}", i), &format!("u{:02}", i)))
            .collect();
        let colors = member_colors(&group, None);
        assert_eq!(colors.get("m12"), Some(&CONTACT_NAME_COLORS[0]));
        assert_eq!(colors.get("m11"), Some(&CONTACT_NAME_COLORS[11]));
    }
}
