//! Topic syntax checks performed before anything is sent to FCM
use once_cell::sync::Lazy;
use regex::Regex;

// Compile regex patterns once at startup
static TOPIC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.~%-]+$").expect("hardcoded topic regex is invalid - fix source code")
});

/// Everything a well-formed condition may contain. Whatever is left after
/// removing these tokens is garbage.
static CONDITION_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"'[a-zA-Z0-9_.~%-]+'|topics|in|&&|\|\||\(|\)|\s")
        .expect("hardcoded condition regex is invalid - fix source code")
});

static QUOTED_TOPIC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"'([^']*)'").expect("hardcoded quoted topic regex is invalid - fix source code")
});

/// Validate a topic name (`/topics/<name>` suffix)
pub fn validate_topic(topic: &str) -> bool {
    TOPIC_REGEX.is_match(topic)
}

/// Validate a topic condition such as `'a' in topics && ('b' in topics || 'c' in topics)`
///
/// Only quoted topic names, `in topics`, `&&`, `||` and parentheses are
/// allowed, and every quoted topic must itself be a valid topic name.
pub fn validate_condition(condition: &str) -> bool {
    validate_condition_format(condition) && validate_condition_topics(condition)
}

fn validate_condition_format(condition: &str) -> bool {
    if condition.trim().is_empty() {
        return false;
    }
    CONDITION_TOKEN_REGEX.replace_all(condition, "").is_empty()
}

fn validate_condition_topics(condition: &str) -> bool {
    let mut topics = QUOTED_TOPIC_REGEX
        .captures_iter(condition)
        .filter_map(|caps| caps.get(1))
        .peekable();

    topics.peek().is_some() && topics.all(|topic| validate_topic(topic.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_topics() {
        assert!(validate_topic("TopicA"));
        assert!(validate_topic("news-2024_daily.v1~x%20"));
    }

    #[test]
    fn test_invalid_topics() {
        assert!(!validate_topic("TopicA$"));
        assert!(!validate_topic(""));
        assert!(!validate_topic("/topics/TopicA"));
        assert!(!validate_topic("Topic A"));
    }

    #[test]
    fn test_valid_condition() {
        assert!(validate_condition(
            "'TopicA' in topics && ('TopicB' in topics || 'TopicC' in topics)"
        ));
        assert!(validate_condition("'TopicA' in topics"));
    }

    #[test]
    fn test_condition_with_unknown_words_is_rejected() {
        assert!(!validate_condition(
            "'TopicA' in topics and some other text ('TopicB' in topics || 'TopicC' in topics)"
        ));
        assert!(!validate_condition("!('TopicA' in topics)"));
    }

    #[test]
    fn test_condition_with_invalid_topic_is_rejected() {
        assert!(!validate_condition("'TopicA$' in topics"));
        assert!(!validate_condition("'TopicA' in topics && 'Bad Topic' in topics"));
    }

    #[test]
    fn test_empty_condition_is_rejected() {
        assert!(!validate_condition(""));
        assert!(!validate_condition("   "));
        assert!(!validate_condition("in topics"));
    }
}
