//! Prompt construction for both response modes.

use crate::credentials::PlatformCredentialSet;
use crate::intent::IntentClassifier;
use crate::platform::Platform;
use crate::session::{ConversationTurn, MessageContent};

/// Stand-in for structured turns when the history is replayed.
pub const STRUCTURED_PLACEHOLDER: &str = "[structured response]";

/// Which response shape the prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Four-field JSON object.
    Structured,
    /// Free-form answer.
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    pub text: String,
    pub mode: PromptMode,
}

impl BuiltPrompt {
    pub fn is_structured(&self) -> bool {
        self.mode == PromptMode::Structured
    }
}

/// Renders history as `ROLE: content` lines joined by newlines.
pub fn render_transcript(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|turn| {
            let content = match &turn.content {
                MessageContent::Text(text) => text.as_str(),
                MessageContent::Structured(_) => STRUCTURED_PLACEHOLDER,
            };
            format!("{}: {}", turn.role.transcript_label(), content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The clause telling the backend which platform credentials it may embed.
pub fn render_credentials_clause(platform: Platform, credentials: &PlatformCredentialSet) -> String {
    let known = credentials.for_platform(platform);
    if known.is_empty() {
        return "No explicit platform credentials provided.".to_string();
    }
    let list = known
        .iter()
        .map(|(field, value)| format!("{field}={value}"))
        .collect::<Vec<_>>()
        .join("; ");
    format!("Known platform credentials (use directly in code, do NOT fabricate): {list}")
}

/// Composes prompts; holds the classifier that picks the mode.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    classifier: IntentClassifier,
}

impl PromptBuilder {
    pub fn new(classifier: IntentClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// Builds the prompt for `user_text`.
    ///
    /// Structured mode is chosen when either the new text or the rendered
    /// transcript looks like an integration request.
    pub fn build(
        &self,
        user_text: &str,
        history: &[ConversationTurn],
        platform: Platform,
        credentials: &PlatformCredentialSet,
    ) -> BuiltPrompt {
        let transcript = render_transcript(history);
        let structured = self.classifier.is_integration_intent(user_text)
            || self.classifier.is_integration_intent(&transcript);

        if structured {
            BuiltPrompt {
                text: structured_prompt(user_text, &transcript, platform, credentials),
                mode: PromptMode::Structured,
            }
        } else {
            BuiltPrompt {
                text: format!("{transcript}\nUSER: {user_text}\nAssistant:"),
                mode: PromptMode::Plain,
            }
        }
    }
}

fn structured_prompt(
    user_text: &str,
    transcript: &str,
    platform: Platform,
    credentials: &PlatformCredentialSet,
) -> String {
    let credentials_clause = render_credentials_clause(platform, credentials);
    format!(
        "You are an expert in logistics API integrations. Generate a JSON object ONLY with keys:
pythonCode (string), nodeCode (string), sampleData (object), nextSteps (string).
Rules:
 - pythonCode: full runnable script using requests.
 - nodeCode: full runnable script using axios (CommonJS or ESM OK, prefer Node 18+ ESM).
 - If AI model key is provided do NOT leak it; instead only embed integration/platform credentials.
 - Provided integration/platform credentials: {credentials_clause}.
 - sampleData: realistic example response for {platform}.
 - nextSteps: markdown bullet list with setup instructions.
Return ONLY raw JSON. No markdown fences.
Conversation so far (for context):
{transcript}
USER_REQUEST: {user_text}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::StructuredResult;

    fn sample_result() -> StructuredResult {
        StructuredResult {
            python_code: "print('py')".into(),
            node_code: "console.log('js')".into(),
            sample_data: serde_json::json!({"orders": []}),
            next_steps: "- done".into(),
        }
    }

    #[test]
    fn test_transcript_renders_roles_and_placeholder() {
        let history = vec![
            ConversationTurn::user("hi"),
            ConversationTurn::assistant_text("hello"),
            ConversationTurn::assistant_structured(sample_result()),
        ];
        assert_eq!(
            render_transcript(&history),
            "USER: hi\nMODEL: hello\nMODEL: [structured response]"
        );
    }

    #[test]
    fn test_plain_prompt_for_small_talk() {
        let builder = PromptBuilder::default();
        let history = vec![ConversationTurn::user("hi"), ConversationTurn::assistant_text("hello")];
        let prompt = builder.build(
            "how are you",
            &history,
            Platform::Shopify,
            &PlatformCredentialSet::new(),
        );
        assert_eq!(prompt.mode, PromptMode::Plain);
        assert_eq!(prompt.text, "USER: hi\nMODEL: hello\nUSER: how are you\nAssistant:");
    }

    #[test]
    fn test_structured_prompt_embeds_platform_and_filtered_credentials() {
        let mut creds = PlatformCredentialSet::new();
        creds.set(Platform::Shopify, "storeDomain", "demo.myshopify.com");
        creds.set(Platform::Shopify, "apiVersion", "");
        creds.set(Platform::Stripe, "secretKey", "sk_live_other");

        let prompt = PromptBuilder::default().build(
            "generate code to list orders",
            &[],
            Platform::Shopify,
            &creds,
        );

        assert!(prompt.is_structured());
        assert!(prompt.text.contains("realistic example response for Shopify"));
        assert!(prompt.text.contains("storeDomain=demo.myshopify.com"));
        assert!(!prompt.text.contains("apiVersion="));
        assert!(!prompt.text.contains("sk_live_other"));
        assert!(prompt.text.contains("do NOT fabricate"));
        assert!(prompt.text.contains("Return ONLY raw JSON"));
        assert!(prompt.text.ends_with("USER_REQUEST: generate code to list orders"));
    }

    #[test]
    fn test_structured_prompt_without_credentials() {
        let prompt = PromptBuilder::default().build(
            "webhook for refunds",
            &[],
            Platform::Stripe,
            &PlatformCredentialSet::new(),
        );
        assert!(prompt.text.contains("No explicit platform credentials provided."));
    }

    #[test]
    fn test_history_intent_keeps_structured_mode() {
        let history = vec![
            ConversationTurn::user("I need Magento API code"),
            ConversationTurn::assistant_structured(sample_result()),
        ];
        let prompt = PromptBuilder::default().build(
            "now make it paginate",
            &history,
            Platform::Magento,
            &PlatformCredentialSet::new(),
        );
        assert_eq!(prompt.mode, PromptMode::Structured);
    }

    #[test]
    fn test_custom_classifier_controls_routing() {
        let builder = PromptBuilder::new(IntentClassifier::new(["shipment"]));
        let creds = PlatformCredentialSet::new();
        assert!(builder.build("track a shipment", &[], Platform::ShipStation, &creds).is_structured());
        assert!(!builder.build("api code", &[], Platform::ShipStation, &creds).is_structured());
    }
}
