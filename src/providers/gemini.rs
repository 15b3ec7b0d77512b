//! Google Gemini provider over the Generative Language REST API.

use std::time::Duration;

use log::{debug, error, trace};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use super::{Provider, ProviderFailure, ProviderFuture};

/// Finish reasons that mean the output was withheld by a safety filter.
const BLOCKING_FINISH_REASONS: &[&str] = &[
  "SAFETY"
, "RECITATION"
, "BLOCKLIST"
, "PROHIBITED_CONTENT"
, "SPII"
, "IMAGE_SAFETY"
];

// ===== Wire Types =====

#[derive(Debug, Clone, Serialize)]
struct GenerateContentRequest<'a>
{   contents: Vec<Content<'a>>
}

#[derive(Debug, Clone, Serialize)]
struct Content<'a>
{   role: &'a str
  , parts: Vec<Part<'a>>
}

#[derive(Debug, Clone, Serialize)]
struct Part<'a>
{   text: &'a str
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse
{   #[serde(default)]
    pub candidates: Vec<Candidate>
  , #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate
{   #[serde(default)]
    pub content: Option<CandidateContent>
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent
{   #[serde(default)]
    pub parts: Vec<CandidatePart>
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidatePart
{   #[serde(default)]
    pub text: Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback
{   #[serde(default)]
    pub block_reason: Option<String>
}

impl GenerateContentResponse
{   /// Text of the first candidate, or the failure the response implies.
    pub fn into_text(self) -> Result<String, ProviderFailure>
    {   if let Some(reason) = self.prompt_feedback
          .and_then(|feedback| feedback.block_reason)
        {   return Err(ProviderFailure::new(
              format!("Prompt was blocked: {}", reason)
            ));
        }

        let candidate = self.candidates.into_iter().next()
          .ok_or_else(|| {
            ProviderFailure::new("No candidates in response")
          })?;

        let finish_reason = candidate.finish_reason.unwrap_or_default();
        if BLOCKING_FINISH_REASONS.contains(&finish_reason.as_str())
        {   return Err(ProviderFailure::new(format!(
              "Response was blocked: finish reason {}", finish_reason
            )));
        }

        let text: String = candidate.content
          .map(|content| {
            content.parts
              .into_iter()
              .filter_map(|part| part.text)
              .collect()
          })
          .unwrap_or_default();

        if text.is_empty()
          && !finish_reason.is_empty()
          && finish_reason != "STOP"
        {   return Err(ProviderFailure::new(format!(
              "Generation stopped early: finish reason {}", finish_reason
            )));
        }
        Ok(text)
    }
}

// ===== Provider =====

/// Gemini provider. Holds the API key for the process lifetime.
pub struct GeminiProvider
{   api_key: String
  , api_base: String
  , http_client: reqwest::Client
}

impl std::fmt::Debug for GeminiProvider
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.debug_struct("GeminiProvider")
          .field("api_key", &"[REDACTED]")
          .field("api_base", &self.api_base)
          .finish()
    }
}

impl GeminiProvider
{   pub fn new(
      api_key: impl Into<String>
    , api_base: impl Into<String>
    ) -> Result<Self, Error>
    {   let http_client = reqwest::Client::builder()
          .connect_timeout(Duration::from_secs(10))
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::Other(format!("HTTP client: {}", e))
          })?;
        GeminiProvider::with_http_client(api_key, api_base, http_client)
    }

    /// Provider over a caller-built HTTP client.
    pub fn with_http_client(
      api_key: impl Into<String>
    , api_base: impl Into<String>
    , http_client: reqwest::Client
    ) -> Result<Self, Error>
    {   let api_key = api_key.into();
        let api_base: String = api_base.into();
        if api_key.trim().is_empty()
        {   return Err(Error::MissingApiKey("Gemini".to_string()));
        }
        debug!("Creating GeminiProvider");
        Ok(GeminiProvider
        {   api_key
          , api_base: api_base.trim_end_matches('/').to_string()
          , http_client
        })
    }

    /// `{base}/models/{model}:generateContent`; `model` may already
    /// carry the `models/` prefix.
    pub fn endpoint(&self, model: &str) -> String
    {   let model = model.trim_start_matches('/');
        if model.starts_with("models/")
        {   format!("{}/{}:generateContent", self.api_base, model)
        } else
        {   format!("{}/models/{}:generateContent", self.api_base, model)
        }
    }

    async fn handle_generate(
      &self
    , model: &str
    , contents: &str
    ) -> Result<String, ProviderFailure>
    {   let request = GenerateContentRequest
        {   contents: vec![
              Content
              {   role: "user"
                , parts: vec![Part { text: contents }]
              }
            ]
        };
        let url = self.endpoint(model);
        debug!("Gemini request to {}", url);

        let response = self.http_client
          .post(&url)
          .header("x-goog-api-key", &self.api_key)
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            debug!("HTTP error: {}", e);
            ProviderFailure::new(e.to_string())
          })?;

        let status = response.status();
        trace!("Gemini response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            debug!("Gemini API error: {} {}", status, error_text);
            return Err(ProviderFailure::new(
              format!("HTTP {}: {}", status, error_text)
            ));
        }

        let parsed: GenerateContentResponse
          = response.json().await.map_err(|e| {
            debug!("Parse error: {}", e);
            ProviderFailure::new(format!("Failed to parse response: {}", e))
          })?;

        parsed.into_text()
    }
}

impl Provider for GeminiProvider
{   fn generate_content<'a>(
      &'a self
    , model: &'a str
    , contents: &'a str
    ) -> ProviderFuture<'a>
    {   Box::pin(self.handle_generate(model, contents))
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::error::{classify, ErrorKind};
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GenerateContentResponse
    {   serde_json::from_value(value).unwrap()
    }

    #[test]
    fn text_parts_are_concatenated_unmodified()
    {   let response = parse(json!({
          "candidates": [{
            "content": { "role": "model", "parts": [
              { "text": "  ls -la\n" }, { "text": "# list files" }
            ]},
            "finishReason": "STOP"
          }]
        }));
        assert_eq!(response.into_text().unwrap(), "  ls -la\n# list files");
    }

    #[test]
    fn prompt_block_reason_is_a_blocked_failure()
    {   let response = parse(json!({
          "promptFeedback": { "blockReason": "SAFETY" }
        }));
        let failure = response.into_text().unwrap_err();
        assert_eq!(failure.message, "Prompt was blocked: SAFETY");
        assert_eq!(classify(&failure.message), ErrorKind::ContentBlocked);
    }

    #[test]
    fn safety_finish_reason_is_a_blocked_failure()
    {   let response = parse(json!({
          "candidates": [{ "finishReason": "SAFETY" }]
        }));
        let failure = response.into_text().unwrap_err();
        assert_eq!(classify(&failure.message), ErrorKind::ContentBlocked);
    }

    #[test]
    fn max_tokens_without_text_is_a_stopped_failure()
    {   let response = parse(json!({
          "candidates": [{
            "content": { "parts": [] },
            "finishReason": "MAX_TOKENS"
          }]
        }));
        let failure = response.into_text().unwrap_err();
        assert_eq!(
          failure.message
        , "Generation stopped early: finish reason MAX_TOKENS"
        );
        assert_eq!(classify(&failure.message), ErrorKind::GenerationStopped);
    }

    #[test]
    fn max_tokens_with_text_returns_the_text()
    {   let response = parse(json!({
          "candidates": [{
            "content": { "parts": [{ "text": "git status" }] },
            "finishReason": "MAX_TOKENS"
          }]
        }));
        assert_eq!(response.into_text().unwrap(), "git status");
    }

    #[test]
    fn missing_candidates_is_a_provider_failure()
    {   let failure = parse(json!({})).into_text().unwrap_err();
        assert_eq!(classify(&failure.message), ErrorKind::ProviderError);
    }

    #[test]
    fn endpoint_accepts_both_model_spellings()
    {   let provider = GeminiProvider::new("key", "https://host/v1beta/")
          .unwrap();
        assert_eq!(
          provider.endpoint("models/gemini-2.0-flash")
        , "https://host/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(
          provider.endpoint("gemini-2.0-flash")
        , "https://host/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn empty_key_is_rejected()
    {   assert!(matches!(
          GeminiProvider::new("  ", "https://host")
        , Err(Error::MissingApiKey(_))
        ));
    }

    #[test]
    fn debug_redacts_key()
    {   let provider = GeminiProvider::new("secret-key", "https://host")
          .unwrap();
        let printed = format!("{:?}", provider);
        assert!(!printed.contains("secret-key"));
        assert!(printed.contains("[REDACTED]"));
    }

    // ===== Loopback HTTP server =====

    use crate::client::ClientHandle;
    use crate::retry::RetryPolicy;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    const OK_BODY: &str = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"ls"}]},"finishReason":"STOP"}]}"#;
    const RATE_LIMIT_BODY: &str = r#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED"}}"#;

    fn reason(code: u16) -> &'static str
    {   match code
        {   200 => "OK"
          , 429 => "Too Many Requests"
          , 500 => "Internal Server Error"
          , _ => "Unknown"
        }
    }

    /// Read one HTTP/1.1 request: head plus `content-length` body bytes.
    async fn read_request(stream: &mut TcpStream) -> String
    {   let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];
        loop
        {   let n = stream.read(&mut chunk).await.unwrap();
            if n == 0
            {   break;
            }
            raw.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&raw);
            if let Some(head_end) = text.find("\r\n\r\n")
            {   let length = text[..head_end]
                  .lines()
                  .filter_map(|line| line.split_once(':'))
                  .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                  .map(|(_, value)| value.trim().parse::<usize>().unwrap())
                  .unwrap_or(0);
                if raw.len() >= head_end + 4 + length
                {   break;
                }
            }
        }
        String::from_utf8(raw).unwrap()
    }

    /// Answer one connection per canned `(status, body)` and hand back the
    /// raw requests seen.
    async fn serve(
      responses: Vec<(u16, &'static str)>
    ) -> (String, JoinHandle<Vec<String>>)
    {   let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/v1beta", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
          let mut seen = Vec::new();
          for (code, body) in responses
          {   let (mut stream, _) = listener.accept().await.unwrap();
              seen.push(read_request(&mut stream).await);
              let reply = format!(
                "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}"
              , code
              , reason(code)
              , body.len()
              , body
              );
              stream.write_all(reply.as_bytes()).await.unwrap();
              stream.shutdown().await.unwrap();
          }
          seen
        });
        (base, handle)
    }

    fn local_provider(api_base: &str) -> GeminiProvider
    {   let http_client = reqwest::Client::builder()
          .no_proxy()
          .build()
          .unwrap();
        GeminiProvider::with_http_client("test-key", api_base, http_client)
          .unwrap()
    }

    fn request_body(raw: &str) -> serde_json::Value
    {   let (_, body) = raw.split_once("\r\n\r\n").unwrap();
        serde_json::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn success_sends_key_header_and_user_content()
    {   let (base, server) = serve(vec![(200, OK_BODY)]).await;
        let provider = local_provider(&base);

        let text = provider
          .generate_content("gemini-test", "list files")
          .await
          .unwrap();
        assert_eq!(text, "ls");

        let seen = server.await.unwrap();
        assert_eq!(seen.len(), 1);
        let raw = &seen[0];
        assert!(
          raw.starts_with("POST /v1beta/models/gemini-test:generateContent ")
        , "unexpected request line: {}", raw
        );
        assert!(raw.to_lowercase().contains("x-goog-api-key: test-key"));
        assert_eq!(
          request_body(raw)
        , json!({
            "contents": [{ "role": "user", "parts": [{ "text": "list files" }] }]
          })
        );
    }

    #[tokio::test]
    async fn server_error_keeps_status_and_body()
    {   let (base, server) = serve(vec![(500, "boom")]).await;
        let provider = local_provider(&base);

        let failure = provider
          .generate_content("models/gemini-test", "list files")
          .await
          .unwrap_err();
        assert_eq!(failure.message, "HTTP 500 Internal Server Error: boom");
        assert_eq!(classify(&failure.message), ErrorKind::ProviderError);

        let seen = server.await.unwrap();
        assert!(seen[0].starts_with(
          "POST /v1beta/models/gemini-test:generateContent "
        ));
    }

    #[tokio::test]
    async fn repeated_rate_limit_exhausts_retries()
    {   let (base, server) = serve(vec![
          (429, RATE_LIMIT_BODY)
        , (429, RATE_LIMIT_BODY)
        ]).await;
        let client = ClientHandle::new(local_provider(&base))
          .with_retry_policy(RetryPolicy::new(2, 2.0, 1));

        let err = client.generate("gemini-test", "list files").await.unwrap_err();
        assert_eq!(err, Error::RateLimitExceeded);
        assert_eq!(server.await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rate_limit_then_success_is_retried()
    {   let (base, server) = serve(vec![
          (429, RATE_LIMIT_BODY)
        , (200, OK_BODY)
        ]).await;
        let client = ClientHandle::new(local_provider(&base))
          .with_retry_policy(RetryPolicy::new(3, 2.0, 1));

        let text = client.generate("gemini-test", "list files").await.unwrap();
        assert_eq!(text, "ls");
        let seen = server.await.unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(request_body(&seen[0]), request_body(&seen[1]));
    }
}
