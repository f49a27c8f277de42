//! Composer search: filters conversations by a free-text term and orders the
//! result by match quality, then by recency.

use std::cmp::Ordering;
use std::sync::Arc;

use phonenumber::{country, Mode, PhoneNumber};

use crate::models::ConversationType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchQuality {
    Substring,
    WordPrefix,
    Prefix,
    Exact,
}

fn looks_like_phone_number(term: &str) -> bool {
    let digits = term.chars().filter(|c| c.is_ascii_digit()).count();
    digits >= 3
        && term
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')' | '.'))
}

fn e164_digits(number: &PhoneNumber) -> String {
    number
        .format()
        .mode(Mode::E164)
        .to_string()
        .chars()
        .filter(char::is_ascii_digit)
        .collect()
}

/// Digit strings a stored e164 number is matched against. The term's own digits
/// always count; when the term parses as a full number, read with the region's
/// national rules, its e164 digits count too.
fn phone_candidates(term: &str, region_code: Option<&str>) -> Vec<String> {
    let mut candidates = vec![term.chars().filter(char::is_ascii_digit).collect::<String>()];
    let region = region_code.and_then(|code| code.to_ascii_uppercase().parse::<country::Id>().ok());
    if let Ok(number) = phonenumber::parse(region, term) {
        let digits = e164_digits(&number);
        if !candidates.contains(&digits) {
            candidates.push(digits);
        }
    }
    candidates
}

fn text_quality(haystack: &str, needle: &str) -> Option<MatchQuality> {
    let haystack = haystack.to_lowercase();
    if haystack == needle {
        return Some(MatchQuality::Exact);
    }
    if haystack.starts_with(needle) {
        return Some(MatchQuality::Prefix);
    }
    if haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| !word.is_empty() && word.starts_with(needle))
    {
        return Some(MatchQuality::WordPrefix);
    }
    if haystack.contains(needle) {
        return Some(MatchQuality::Substring);
    }
    None
}

fn match_quality(
    conversation: &ConversationType,
    needle: &str,
    phone_candidates: Option<&[String]>,
) -> Option<MatchQuality> {
    let text_fields = [
        Some(conversation.title.as_str()),
        conversation.name.as_deref(),
        conversation.profile_name.as_deref(),
        conversation.username.as_deref(),
    ];
    let mut best = text_fields
        .iter()
        .flatten()
        .filter_map(|field| text_quality(field, needle))
        .max();

    if let Some(candidates) = phone_candidates {
        let numbers = [conversation.e164.as_deref(), conversation.phone_number.as_deref()];
        for number in numbers.iter().flatten() {
            let number_digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
            for candidate in candidates {
                let quality = if number_digits == *candidate {
                    Some(MatchQuality::Exact)
                } else if number_digits.starts_with(candidate.as_str()) {
                    Some(MatchQuality::Prefix)
                } else if number_digits.contains(candidate.as_str()) {
                    Some(MatchQuality::Substring)
                } else {
                    None
                };
                best = best.max(quality);
            }
        }
    }
    best
}

fn by_recency(a: &ConversationType, b: &ConversationType) -> Ordering {
    match (a.active_at(), b.active_at()) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn filter_and_sort_conversations_by_recent(
    conversations: &[Arc<ConversationType>],
    search_term: &str,
    region_code: Option<&str>,
) -> Vec<Arc<ConversationType>> {
    let needle = search_term.trim().to_lowercase();
    if needle.is_empty() {
        let mut sorted = conversations.to_vec();
        sorted.sort_by(|a, b| by_recency(a, b));
        return sorted;
    }

    let phone_candidates = looks_like_phone_number(&needle).then(|| phone_candidates(&needle, region_code));
    let mut scored: Vec<(MatchQuality, Arc<ConversationType>)> = conversations
        .iter()
        .filter_map(|conversation| {
            match_quality(conversation, &needle, phone_candidates.as_deref())
                .map(|quality| (quality, Arc::clone(conversation)))
        })
        .collect();
    scored.sort_by(|(qa, a), (qb, b)| qb.cmp(qa).then_with(|| by_recency(a, b)));
    scored.into_iter().map(|(_, conversation)| conversation).collect()
}
