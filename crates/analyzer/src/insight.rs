//! Generated profile analysis
//!
//! Builds a short recruiter-style prompt from an aggregate and sends it to a
//! text-generation backend. Backend failures surface as [`InsightError`].

use crate::stats::popular_repos;
use async_trait::async_trait;
use gitdash_collector::Aggregate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Languages and repositories quoted in the prompt
const PROMPT_ITEMS: usize = 5;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Text generation timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot reach text generation service at {0}")]
    Unreachable(String),

    #[error("Text generation service is rate limiting requests")]
    RateLimited,

    #[error("Text generation service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Text generation service returned an empty completion")]
    EmptyCompletion,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, InsightError>;

/// A backend that turns a prompt into prose
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Settings for the Ollama-compatible backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    pub ollama_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            ollama_url: std::env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            model: std::env::var("GITDASH_MODEL").unwrap_or_else(|_| "llama3.2:latest".to_string()),
            temperature: 0.7,
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// Text generator backed by Ollama's `/api/chat`
pub struct OllamaGenerator {
    config: InsightConfig,
    http_client: reqwest::Client,
}

impl OllamaGenerator {
    pub fn new(config: InsightConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        info!(model = config.model, url = config.ollama_url, "Configured text generator");
        Ok(Self { config, http_client })
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.config.ollama_url.trim_end_matches('/'));
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: ChatOptions {
                temperature: self.config.temperature,
            },
        };

        debug!(url = url, "Requesting profile insight");

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InsightError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    InsightError::Unreachable(self.config.ollama_url.clone())
                } else {
                    InsightError::Http(e)
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(InsightError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        completion_text(chat.message.content)
    }
}

fn completion_text(content: String) -> Result<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(InsightError::EmptyCompletion);
    }
    Ok(trimmed.to_string())
}

/// Build the analysis prompt for a profile
pub fn build_prompt(aggregate: &Aggregate) -> String {
    let user = &aggregate.user;

    let top_languages = aggregate
        .languages
        .iter()
        .take(PROMPT_ITEMS)
        .map(|l| l.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let repos = popular_repos(&aggregate.repos, PROMPT_ITEMS)
        .into_iter()
        .map(|r| {
            format!(
                "  - {}: {}",
                r.name,
                r.description.as_deref().unwrap_or("No description.")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an experienced tech recruiter who reviews GitHub profiles. \
Write a concise, encouraging analysis of the following developer.\n\
\n\
Developer:\n\
- Name: {name}\n\
- Bio: {bio}\n\
- Most used languages: {languages}\n\
- Popular repositories:\n\
{repos}\n\
\n\
Answer in 2-3 short paragraphs:\n\
1. Profile summary: the developer's main skills and focus areas, based on the data.\n\
2. Career or project suggestions: one or two specific directions that build on the \
technologies they use most.\n\
Keep a positive, professional tone.",
        name = user.display_name(),
        bio = user.bio.as_deref().unwrap_or("Not provided."),
        languages = if top_languages.is_empty() { "None found" } else { top_languages.as_str() },
        repos = if repos.is_empty() { "  - None" } else { repos.as_str() },
    )
}

/// Generate an analysis for `aggregate` with `generator`
pub async fn generate_insight(
    generator: &dyn TextGenerator,
    aggregate: &Aggregate,
) -> Result<String> {
    let prompt = build_prompt(aggregate);
    let text = generator.generate(&prompt).await?;
    info!(login = aggregate.user.login, chars = text.len(), "Generated profile insight");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gitdash_collector::{LanguageUsage, Profile, Repository};
    use std::sync::Mutex;

    struct RecordingGenerator {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            completion_text(self.reply.clone())
        }
    }

    fn aggregate() -> Aggregate {
        let repo = |name: &str, stars: u64, description: Option<&str>| Repository {
            id: stars,
            name: name.to_string(),
            full_name: format!("octocat/{}", name),
            html_url: String::new(),
            description: description.map(str::to_string),
            stargazers_count: stars,
            forks_count: 0,
            watchers_count: 0,
            language: None,
            topics: Vec::new(),
            private: false,
            fork: false,
            languages_url: String::new(),
        };

        Aggregate {
            user: Profile {
                login: "octocat".to_string(),
                name: None,
                bio: Some("Mascot".to_string()),
                avatar_url: String::new(),
                html_url: String::new(),
                followers: 0,
                following: 0,
                public_repos: 2,
                created_at: Utc::now(),
                location: None,
                email: None,
                twitter_username: None,
                blog: None,
            },
            repos: vec![
                repo("Spoon-Knife", 5, None),
                repo("Hello-World", 50, Some("My first repository")),
            ],
            events: Vec::new(),
            orgs: Vec::new(),
            languages: vec![
                LanguageUsage { name: "JavaScript".to_string(), bytes: 1000 },
                LanguageUsage { name: "HTML".to_string(), bytes: 500 },
            ],
            total_stars: 55,
            total_forks: 0,
        }
    }

    #[test]
    fn test_prompt_contains_profile_data() {
        let prompt = build_prompt(&aggregate());

        assert!(prompt.contains("- Name: octocat"));
        assert!(prompt.contains("- Bio: Mascot"));
        assert!(prompt.contains("- Most used languages: JavaScript, HTML"));

        let hello = prompt.find("Hello-World: My first repository").unwrap();
        let spoon = prompt.find("Spoon-Knife: No description.").unwrap();
        assert!(hello < spoon);
    }

    #[test]
    fn test_prompt_without_languages_or_repos() {
        let mut agg = aggregate();
        agg.languages.clear();
        agg.repos.clear();

        let prompt = build_prompt(&agg);
        assert!(prompt.contains("- Most used languages: None found"));
        assert!(prompt.contains("  - None"));
    }

    #[tokio::test]
    async fn test_generate_insight_returns_trimmed_completion() {
        let generator = RecordingGenerator {
            reply: "\n  Solid JavaScript developer.  \n".to_string(),
            prompts: Mutex::new(Vec::new()),
        };

        let text = generate_insight(&generator, &aggregate()).await.unwrap();

        assert_eq!(text, "Solid JavaScript developer.");
        assert_eq!(generator.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_completion_is_an_error() {
        let generator = RecordingGenerator {
            reply: "   ".to_string(),
            prompts: Mutex::new(Vec::new()),
        };

        let err = generate_insight(&generator, &aggregate()).await.unwrap_err();
        assert!(matches!(err, InsightError::EmptyCompletion));
    }

    #[test]
    fn test_chat_response_parsing() {
        let body = r#"{"model":"llama3.2","message":{"role":"assistant","content":"Hi"},"done":true}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.message.content, "Hi");
    }
}
