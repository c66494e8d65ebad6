//! Summarizer: optional LLM rewrite of the ranked items into an HTML list.
//!
//! Every failure collapses into [`Summary::Unavailable`]; the resolver then
//! falls back to the deterministic fragment.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::llm::{CompletionRequest, LlmProvider};
use crate::pipeline::types::Item;

/// Instruction sent ahead of the item list.
const INSTRUCTION: &str = "Shrň následující UX/UI novinky do 3–6 bodů \
    (co se stalo, proč je to důležité, co s tím). Piš česky, stručně, bez marketingu. \
    Vrať HTML seznam <ul><li>…</li></ul> a u každé položky ponech zdrojový odkaz:";

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 700;

/// Why no summary was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// No API key configured.
    NoCredential,
    /// Nothing to summarize.
    NoItems,
    /// The provider call failed.
    CallFailed(String),
    /// The provider answered with nothing usable.
    EmptyResponse,
}

/// Outcome of a summarization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    Available(String),
    Unavailable(Unavailable),
}

/// Wraps an optional LLM provider.
pub struct Summarizer {
    llm: Option<Arc<dyn LlmProvider>>,
}

impl Summarizer {
    pub fn new(llm: Option<Arc<dyn LlmProvider>>) -> Self {
        Self { llm }
    }

    /// A summarizer that always reports [`Unavailable::NoCredential`].
    pub fn disabled() -> Self {
        Self { llm: None }
    }

    pub async fn summarize(&self, items: &[Item]) -> Summary {
        let Some(llm) = &self.llm else {
            debug!("No summarizer credential configured");
            return Summary::Unavailable(Unavailable::NoCredential);
        };
        if items.is_empty() {
            debug!("No ranked items to summarize");
            return Summary::Unavailable(Unavailable::NoItems);
        }

        let request = CompletionRequest::new(build_prompt(items))
            .with_temperature(TEMPERATURE)
            .with_max_tokens(MAX_TOKENS);

        match llm.complete(request).await {
            Ok(response) => {
                let fragment = strip_code_fence(&response.content);
                if fragment.is_empty() {
                    warn!(model = llm.model_name(), "LLM summary was empty");
                    Summary::Unavailable(Unavailable::EmptyResponse)
                } else {
                    info!(
                        model = llm.model_name(),
                        chars = fragment.len(),
                        "LLM summary ready"
                    );
                    Summary::Available(fragment)
                }
            }
            Err(e) => {
                warn!(model = llm.model_name(), error = %e, "LLM summary failed");
                Summary::Unavailable(Unavailable::CallFailed(e.to_string()))
            }
        }
    }
}

/// Instruction followed by one `- title – link` line per item.
pub fn build_prompt(items: &[Item]) -> String {
    let lines: Vec<String> = items
        .iter()
        .map(|item| format!("- {} – {}", item.title, item.link))
        .collect();
    format!("{INSTRUCTION}\n\n{}", lines.join("\n"))
}

/// Remove a surrounding markdown code fence (```` ```html ... ``` ````), if any.
fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    // Drop the info string (e.g. "html") on the opening line.
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => "",
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::LlmError;
    use crate::llm::CompletionResponse;
    use crate::pipeline::types::FeedEntry;

    /// Stub provider: replies with a fixed result and records prompts.
    struct StubLlm {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubLlm {
        fn replying(reply: Result<&str, &str>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string).map_err(str::to_string),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for StubLlm {
        fn model_name(&self) -> &str {
            "stub"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.prompts.lock().unwrap().push(request.prompt);
            match &self.reply {
                Ok(content) => Ok(CompletionResponse {
                    content: content.clone(),
                }),
                Err(reason) => Err(LlmError::RequestFailed {
                    provider: "stub".into(),
                    reason: reason.clone(),
                }),
            }
        }
    }

    fn items() -> Vec<Item> {
        vec![
            Item::from_entry(
                "ExampleBlog",
                &FeedEntry {
                    title: Some("UX at scale".into()),
                    link: Some("https://example.com/ux".into()),
                    summary: None,
                },
            )
            .unwrap(),
            Item::from_entry(
                "Figma Blog",
                &FeedEntry {
                    title: Some("Variables".into()),
                    link: Some("https://figma.com/variables".into()),
                    summary: None,
                },
            )
            .unwrap(),
        ]
    }

    #[tokio::test]
    async fn no_credential_is_unavailable() {
        let summary = Summarizer::disabled().summarize(&items()).await;
        assert_eq!(summary, Summary::Unavailable(Unavailable::NoCredential));
    }

    #[tokio::test]
    async fn provider_error_is_unavailable() {
        let llm = StubLlm::replying(Err("timeout"));
        let summary = Summarizer::new(Some(llm)).summarize(&items()).await;
        assert!(matches!(
            summary,
            Summary::Unavailable(Unavailable::CallFailed(ref r)) if r.contains("timeout")
        ));
    }

    #[tokio::test]
    async fn blank_reply_is_unavailable() {
        let llm = StubLlm::replying(Ok("  \n "));
        let summary = Summarizer::new(Some(llm)).summarize(&items()).await;
        assert_eq!(summary, Summary::Unavailable(Unavailable::EmptyResponse));
    }

    #[tokio::test]
    async fn empty_item_list_skips_the_call() {
        let llm = StubLlm::replying(Ok("<ul><li>x</li></ul>"));
        let summary = Summarizer::new(Some(llm.clone())).summarize(&[]).await;
        assert_eq!(summary, Summary::Unavailable(Unavailable::NoItems));
        assert!(llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reply_becomes_fragment() {
        let llm = StubLlm::replying(Ok("<ul><li>Shrnutí</li></ul>"));
        let summary = Summarizer::new(Some(llm.clone())).summarize(&items()).await;
        assert_eq!(
            summary,
            Summary::Available("<ul><li>Shrnutí</li></ul>".into())
        );

        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("Shrň následující"));
        assert!(prompts[0].contains("- UX at scale – https://example.com/ux"));
        assert!(prompts[0].contains("- Variables – https://figma.com/variables"));
    }

    #[test]
    fn strips_html_code_fence() {
        assert_eq!(
            strip_code_fence("```html\n<ul><li>a</li></ul>\n```"),
            "<ul><li>a</li></ul>"
        );
        assert_eq!(strip_code_fence("```\n<p>b</p>\n```\n"), "<p>b</p>");
        assert_eq!(strip_code_fence("  <p>plain</p> "), "<p>plain</p>");
        assert_eq!(strip_code_fence("```"), "");
    }
}
