use serde::Deserialize;

use crate::error::ChatError;
use crate::i18n::Locale;
use crate::llm::{ChatMessage, ProviderRequest, Role};

pub const MAX_MESSAGE_CHARS: usize = 1000;
pub const MAX_HISTORY_ENTRIES: usize = 20;
pub const MAX_HISTORY_CONTENT_CHARS: usize = 1000;
pub const MAX_NAME_CHARS: usize = 50;
pub const MAX_LAST_PRAYER_CHARS: usize = 30;
pub const MAX_PRAYER_STREAK: i64 = 100_000;
pub const DEFAULT_NAME: &str = "Sahabat";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorChatRequest {
    pub message: String,
    #[serde(default)]
    pub context: MentorContext,
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
    #[serde(default)]
    pub locale: Option<String>,
}

/// Caller supplied profile snippet. Free text, never trusted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorContext {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub prayer_streak: Option<i64>,
    #[serde(default)]
    pub last_prayer: Option<String>,
}

/// History entry as sent by the client; the role is free text
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedContext {
    pub name: String,
    pub prayer_streak: u32,
    pub last_prayer: Option<String>,
}

impl MentorChatRequest {
    /// Body `locale` wins over the header derived one
    pub fn locale(&self, fallback: Locale) -> Locale {
        self.locale
            .as_deref()
            .and_then(Locale::from_tag)
            .unwrap_or(fallback)
    }

    pub fn into_provider_request(self, message: String, locale: Locale) -> ProviderRequest {
        let context = self.context.sanitized();
        ProviderRequest {
            system_prompt: context.system_prompt(locale),
            history: sanitize_history(self.history.unwrap_or_default()),
            message,
        }
    }
}

impl MentorContext {
    pub fn sanitized(&self) -> SanitizedContext {
        let name = self
            .name
            .as_deref()
            .map(|n| sanitize_text(n, MAX_NAME_CHARS))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_NAME.to_string());

        let last_prayer = self
            .last_prayer
            .as_deref()
            .map(|p| sanitize_text(p, MAX_LAST_PRAYER_CHARS))
            .filter(|p| !p.is_empty());

        SanitizedContext {
            name,
            prayer_streak: self.prayer_streak.unwrap_or(0).clamp(0, MAX_PRAYER_STREAK) as u32,
            last_prayer,
        }
    }
}

impl SanitizedContext {
    pub fn system_prompt(&self, locale: Locale) -> String {
        match locale {
            Locale::Id => {
                let last = self.last_prayer.as_deref().unwrap_or("belum tercatat");
                format!(
                    "Kamu adalah Mentor Nawaetu, pendamping spiritual Muslim yang hangat dan bijak. \
                     Jawab dalam Bahasa Indonesia dengan singkat, lembut, dan menyemangati. \
                     Rujuk Al-Qur'an dan hadits sahih bila relevan, dan jangan memberi fatwa. \
                     Nama pengguna: {}. Streak salat: {} hari. Salat terakhir: {}.",
                    self.name, self.prayer_streak, last
                )
            }
            Locale::En => {
                let last = self.last_prayer.as_deref().unwrap_or("not recorded");
                format!(
                    "You are the Nawaetu Mentor, a warm and wise spiritual companion for Muslims. \
                     Answer in English, briefly, gently and encouragingly. \
                     Refer to the Quran and authentic hadith when relevant, and do not issue fatwas. \
                     User name: {}. Prayer streak: {} days. Last prayer: {}.",
                    self.name, self.prayer_streak, last
                )
            }
        }
    }
}

/// Trims the message and enforces the length limit
pub fn validate_message(raw: &str) -> Result<String, ChatError> {
    let message = raw.trim();
    if message.is_empty() {
        return Err(ChatError::EmptyMessage);
    }
    let len = message.chars().count();
    if len > MAX_MESSAGE_CHARS {
        return Err(ChatError::MessageTooLong {
            len,
            max: MAX_MESSAGE_CHARS,
        });
    }
    Ok(message.to_string())
}

/// Keeps the latest entries, truncates their content and collapses roles to
/// `user` / `assistant`.
pub fn sanitize_history(entries: Vec<HistoryEntry>) -> Vec<ChatMessage> {
    let skip = entries.len().saturating_sub(MAX_HISTORY_ENTRIES);
    entries
        .into_iter()
        .skip(skip)
        .map(|entry| ChatMessage {
            role: Role::coerce(&entry.role),
            content: truncate_chars(&entry.content, MAX_HISTORY_CONTENT_CHARS),
        })
        .collect()
}

/// Removes bracket and control characters, trims and truncates. Everything
/// else, including text that looks like SQL, passes through untouched: the
/// value only ever ends up inside a prompt string.
pub fn sanitize_text(raw: &str, max_chars: usize) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '{' | '}' | '<' | '>') && !c.is_control())
        .collect();
    truncate_chars(stripped.trim(), max_chars).trim_end().to_string()
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_bounded_and_roles_coerced() {
        let roles = ["admin", "system", "user"];
        let entries: Vec<HistoryEntry> = (0..30)
            .map(|i| HistoryEntry {
                role: roles[i % 3].to_string(),
                content: format!("{:02}", i) + &"x".repeat(1998),
            })
            .collect();

        let sanitized = sanitize_history(entries.clone());

        assert_eq!(sanitized.len(), 20);
        for (message, original) in sanitized.iter().zip(&entries[10..]) {
            assert!(message.content.chars().count() <= 1000);
            assert!(original.content.starts_with(&message.content));
            let expected = if original.role == "user" {
                Role::User
            } else {
                Role::Assistant
            };
            assert_eq!(message.role, expected);
        }
        // the oldest ten were dropped
        assert!(sanitized[0].content.starts_with("10"));
    }

    #[test]
    fn only_exact_user_role_is_user() {
        assert_eq!(Role::coerce("user"), Role::User);
        assert_eq!(Role::coerce("User"), Role::Assistant);
        assert_eq!(Role::coerce("system"), Role::Assistant);
        assert_eq!(Role::coerce(""), Role::Assistant);
    }

    #[test]
    fn short_history_is_kept_whole() {
        let entries = vec![HistoryEntry {
            role: "user".into(),
            content: "Assalamualaikum".into(),
        }];
        let sanitized = sanitize_history(entries);
        assert_eq!(
            sanitized,
            vec![ChatMessage {
                role: Role::User,
                content: "Assalamualaikum".into()
            }]
        );
    }

    #[test]
    fn name_keeps_sql_looking_text_but_drops_brackets() {
        assert_eq!(
            sanitize_text("] DROP TABLE users; --", MAX_NAME_CHARS),
            "DROP TABLE users; --"
        );
        assert_eq!(sanitize_text("Ah\u{0}mad\n[admin]", MAX_NAME_CHARS), "Ahmadadmin");
    }

    #[test]
    fn context_defaults_and_clamps() {
        let context = MentorContext {
            name: Some("[]".into()),
            prayer_streak: Some(-5),
            last_prayer: Some("   ".into()),
        };
        assert_eq!(
            context.sanitized(),
            SanitizedContext {
                name: DEFAULT_NAME.into(),
                prayer_streak: 0,
                last_prayer: None,
            }
        );

        let long = MentorContext {
            name: Some("a".repeat(80)),
            prayer_streak: Some(i64::MAX),
            last_prayer: Some("Isya".into()),
        };
        let sanitized = long.sanitized();
        assert_eq!(sanitized.name.chars().count(), MAX_NAME_CHARS);
        assert_eq!(sanitized.prayer_streak, MAX_PRAYER_STREAK as u32);
        assert_eq!(sanitized.last_prayer.as_deref(), Some("Isya"));
    }

    #[test]
    fn system_prompt_embeds_context() {
        let context = SanitizedContext {
            name: "Fatimah".into(),
            prayer_streak: 12,
            last_prayer: Some("Maghrib".into()),
        };
        let prompt = context.system_prompt(Locale::En);
        assert!(prompt.contains("Fatimah"));
        assert!(prompt.contains("12 days"));
        assert!(prompt.contains("Maghrib"));
        assert!(context.system_prompt(Locale::Id).contains("12 hari"));
    }

    #[test]
    fn message_validation() {
        assert!(matches!(validate_message("   "), Err(ChatError::EmptyMessage)));
        assert!(matches!(
            validate_message(&"a".repeat(1001)),
            Err(ChatError::MessageTooLong { len: 1001, .. })
        ));
        assert_eq!(validate_message("  Salam  ").unwrap(), "Salam");
        assert!(validate_message(&"é".repeat(1000)).is_ok());
    }

    #[test]
    fn body_locale_overrides_header() {
        let request: MentorChatRequest =
            serde_json::from_str(r#"{"message":"hi","locale":"en-GB"}"#).unwrap();
        assert_eq!(request.locale(Locale::Id), Locale::En);

        let request: MentorChatRequest =
            serde_json::from_str(r#"{"message":"hi","history":null}"#).unwrap();
        assert_eq!(request.locale(Locale::En), Locale::En);
        assert!(request.history.is_none());
    }
}
