//! Caption providers behind [`NarrationPort`].
//!
//! - [`LlmNarrator`] asks the configured LLM for a `{"caption": "..."}` payload
//! - [`TemplateNarrator`] builds captions offline from fixed phrases
//! - [`DisabledNarrator`] always declines, so every turn uses the fallback

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex_lite::Regex;
use serde::Deserialize;
use skirmish_domain::NarrationStyle;

use crate::infrastructure::ports::{
    ChatMessage, LlmPort, LlmRequest, NarrationError, NarrationPort, NarrationRequest,
};

/// Captions longer than this are cut at a character boundary.
const MAX_CAPTION_CHARS: usize = 280;

const EXAMPLE_TURN: &str = "Goblin strikes Squire for 4 damage.";
const EXAMPLE_CAPTION: &str = r#"{"caption": "The goblin's rusty blade nicks the squire's shoulder."}"#;

// =============================================================================
// LLM narrator
// =============================================================================

pub struct LlmNarrator {
    llm: Arc<dyn LlmPort>,
}

impl LlmNarrator {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }

    fn build_request(request: &NarrationRequest) -> LlmRequest {
        let system = format!(
            "You narrate a turn-based battle. Write one short sentence about the turn \
             you are given. Tone: {}. Reply with JSON only: {{\"caption\": \"...\"}}",
            request.style.tone()
        );

        let mut turn = if request.damage == 0 {
            format!(
                "{} and {} trade moves but nobody is hurt.",
                request.actor, request.target
            )
        } else {
            format!(
                "{} strikes {} for {} damage.",
                request.actor, request.target, request.damage
            )
        };
        if request.critical {
            turn.push_str(" It is a critical hit.");
        }
        if request.battle_over {
            turn.push_str(&format!(" This blow ends the battle; {} wins.", request.actor));
        }

        // One worked example keeps small models on the JSON shape
        LlmRequest::new(vec![
            ChatMessage::user(EXAMPLE_TURN),
            ChatMessage::assistant(EXAMPLE_CAPTION),
            ChatMessage::user(turn),
        ])
            .with_system_prompt(system)
            .with_temperature(0.8)
            .with_max_tokens(Some(120))
            .expect_json()
    }
}

#[async_trait]
impl NarrationPort for LlmNarrator {
    async fn narrate(&self, request: &NarrationRequest) -> Result<String, NarrationError> {
        let response = self.llm.generate(Self::build_request(request)).await?;
        parse_caption(&response.content)
    }
}

#[derive(Debug, Deserialize)]
struct CaptionPayload {
    caption: String,
}

fn code_fence() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").ok())
        .as_ref()
}

/// Turn raw model output into a single caption string.
///
/// Code fences are stripped, then the text is read as a `{caption}` object.
/// Plain prose is accepted as the caption itself; anything that looks like
/// JSON but does not match the payload is rejected. Only `caption` is read.
pub fn parse_caption(raw: &str) -> Result<String, NarrationError> {
    let unfenced = match code_fence().and_then(|fence| fence.captures(raw)) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => raw,
    };
    let text = unfenced.trim();

    let caption = if text.starts_with('{') {
        serde_json::from_str::<CaptionPayload>(text)
            .map_err(|e| NarrationError::Malformed(e.to_string()))?
            .caption
    } else {
        text.trim_matches('"').to_string()
    };

    let caption = caption.split_whitespace().collect::<Vec<_>>().join(" ");
    if caption.is_empty() {
        return Err(NarrationError::Malformed("empty caption".to_string()));
    }

    Ok(truncate_chars(caption, MAX_CAPTION_CHARS))
}

fn truncate_chars(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text,
    }
}

// =============================================================================
// Template narrator
// =============================================================================

/// Offline captions, for local play and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateNarrator;

impl TemplateNarrator {
    fn compose(request: &NarrationRequest) -> String {
        let NarrationRequest {
            actor,
            target,
            damage,
            ..
        } = request;

        let mut caption = match (request.style, *damage) {
            (_, 0) => format!("{actor} and {target} circle each other. Nothing lands."),
            (NarrationStyle::Comic, _) => format!("BONK! {actor} bops {target} for {damage}!"),
            (NarrationStyle::Epic, _) => {
                format!("{actor} strikes true, and {target} reels from {damage} damage.")
            }
            (NarrationStyle::Grim, _) => {
                format!("{actor} draws blood. {target} loses {damage} more.")
            }
        };

        if request.critical {
            caption.push_str(" A critical blow!");
        }
        if request.battle_over {
            caption.push_str(&format!(" {target} falls."));
        }
        caption
    }
}

#[async_trait]
impl NarrationPort for TemplateNarrator {
    async fn narrate(&self, request: &NarrationRequest) -> Result<String, NarrationError> {
        Ok(Self::compose(request))
    }
}

// =============================================================================
// Disabled narrator
// =============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNarrator;

#[async_trait]
impl NarrationPort for DisabledNarrator {
    async fn narrate(&self, _request: &NarrationRequest) -> Result<String, NarrationError> {
        Err(NarrationError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        FinishReason, LlmError, LlmResponse, MessageRole, MockLlmPort,
    };

    fn request() -> NarrationRequest {
        NarrationRequest {
            actor: "Hero".into(),
            target: "Slime".into(),
            damage: 7,
            critical: false,
            battle_over: false,
            style: NarrationStyle::Comic,
        }
    }

    mod parse {
        use super::*;

        #[test]
        fn reads_caption_field() {
            assert_eq!(
                parse_caption(r#"{"caption": "Hero smacks Slime."}"#).unwrap(),
                "Hero smacks Slime."
            );
        }

        #[test]
        fn ignores_extra_fields() {
            let caption =
                parse_caption(r#"{"caption": "Thwack.", "mood": "happy", "damage": 9000}"#)
                    .unwrap();
            assert_eq!(caption, "Thwack.");
        }

        #[test]
        fn strips_code_fences() {
            let raw = "```json\n{\"caption\": \"Splat!\"}\n```";
            assert_eq!(parse_caption(raw).unwrap(), "Splat!");
        }

        #[test]
        fn accepts_plain_prose() {
            assert_eq!(
                parse_caption("  \"Hero lunges\n and misses.\"  ").unwrap(),
                "Hero lunges and misses."
            );
        }

        #[test]
        fn rejects_json_without_caption() {
            assert!(matches!(
                parse_caption(r#"{"text": "nope"}"#),
                Err(NarrationError::Malformed(_))
            ));
        }

        #[test]
        fn rejects_empty_output() {
            assert!(parse_caption("   ").is_err());
            assert!(parse_caption("```\n```").is_err());
            assert!(parse_caption(r#"{"caption": "  "}"#).is_err());
        }

        #[test]
        fn truncates_long_captions() {
            let long = "a".repeat(MAX_CAPTION_CHARS + 50);
            assert_eq!(
                parse_caption(&long).unwrap().chars().count(),
                MAX_CAPTION_CHARS
            );
        }
    }

    #[tokio::test]
    async fn llm_narrator_returns_sanitized_caption() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .withf(|req| {
                req.system_prompt
                    .as_deref()
                    .is_some_and(|s| s.contains("caption"))
                    && req.messages.last().is_some_and(|m| {
                        m.role == MessageRole::User
                            && m.content.contains("Hero strikes Slime for 7 damage")
                    })
            })
            .times(1)
            .returning(|_| {
                Ok(LlmResponse {
                    content: "```json\n{\"caption\":\"Whack!\"}\n```".into(),
                    finish_reason: FinishReason::Stop,
                })
            });

        let narrator = LlmNarrator::new(Arc::new(llm));
        assert_eq!(narrator.narrate(&request()).await.unwrap(), "Whack!");
    }

    #[tokio::test]
    async fn llm_failure_is_reported() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .returning(|_| Err(LlmError::RequestFailed("503".into())));

        let narrator = LlmNarrator::new(Arc::new(llm));
        assert!(matches!(
            narrator.narrate(&request()).await,
            Err(NarrationError::Llm(_))
        ));
    }

    #[test]
    fn final_blow_is_mentioned_in_prompt() {
        let mut req = request();
        req.battle_over = true;
        req.critical = true;
        let llm_request = LlmNarrator::build_request(&req);
        assert_eq!(llm_request.messages.len(), 3);
        assert_eq!(llm_request.messages[1].role, MessageRole::Assistant);
        assert!(parse_caption(&llm_request.messages[1].content).is_ok());
        let content = &llm_request.messages[2].content;
        assert!(content.contains("critical"));
        assert!(content.contains("ends the battle"));
    }

    #[tokio::test]
    async fn template_narrator_follows_style() {
        let narrator = TemplateNarrator;
        let mut req = request();
        assert!(narrator.narrate(&req).await.unwrap().starts_with("BONK!"));

        req.style = NarrationStyle::Grim;
        req.battle_over = true;
        let caption = narrator.narrate(&req).await.unwrap();
        assert!(caption.contains("draws blood"));
        assert!(caption.ends_with("Slime falls."));
    }

    #[tokio::test]
    async fn disabled_narrator_declines() {
        assert!(matches!(
            DisabledNarrator.narrate(&request()).await,
            Err(NarrationError::Disabled)
        ));
    }
}
