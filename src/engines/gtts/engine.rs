use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::{AudioClip, AudioFormat, SpeechSynthesizer};

/// Default Translate TTS endpoint host.
pub const DEFAULT_HOST: &str = "https://translate.google.com";

/// Maximum characters per TTS request. Longer text is split into parts and
/// the MP3 payloads are concatenated in order.
pub const MAX_CHARS_PER_REQUEST: usize = 200;

/// The endpoint rejects requests without a browser User-Agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(thiserror::Error, Debug)]
pub enum GttsError {
    #[error("request to the translate endpoint failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("translate endpoint returned HTTP {0}")]
    Status(StatusCode),
    #[error("translate endpoint returned an empty audio payload")]
    EmptyPayload,
    #[error("nothing to synthesize: text is empty")]
    EmptyText,
}

/// Parameters for configuring a [`GttsEngine`].
#[derive(Debug, Clone)]
pub struct GttsParams {
    /// Endpoint host, overridable for tests or regional mirrors.
    pub host: String,
    /// Request the slow speaking speed.
    pub slow: bool,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for GttsParams {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            slow: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Google Translate text-to-speech engine.
///
/// Stateless apart from its HTTP client; no model loading is involved.
/// Output is MP3.
pub struct GttsEngine {
    client: Client,
    params: GttsParams,
}

impl Default for GttsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GttsEngine {
    /// Create an engine with default parameters.
    pub fn new() -> Self {
        Self::with_params(GttsParams::default())
    }

    /// Create an engine with explicit parameters.
    pub fn with_params(params: GttsParams) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(params.timeout)
            .build()
            // Same failure contract as reqwest's own Client::new: only a
            // broken TLS backend can get here.
            .expect("failed to initialize HTTP client");
        Self { client, params }
    }

    /// Fetch the MP3 payload for one text part.
    fn fetch_part(&self, text: &str, lang: &str) -> Result<Vec<u8>, GttsError> {
        let url = format!("{}/translate_tts", self.params.host);
        let speed = if self.params.slow { "0.3" } else { "1" };
        let textlen = text.chars().count().to_string();
        log::debug!("tts request: {} chars, lang={lang}", textlen);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("ie", "UTF-8"),
                ("q", text),
                ("tl", lang),
                ("client", "tw-ob"),
                ("ttsspeed", speed),
                ("textlen", textlen.as_str()),
            ])
            .send()?;

        if !response.status().is_success() {
            return Err(GttsError::Status(response.status()));
        }
        let body = response.bytes()?;
        if body.is_empty() {
            return Err(GttsError::EmptyPayload);
        }
        Ok(body.to_vec())
    }
}

impl SpeechSynthesizer for GttsEngine {
    fn engine_name(&self) -> &str {
        "gTTS"
    }

    fn voice_name(&self, lang: &str) -> String {
        format!("gTTS-{lang}")
    }

    fn synthesize(
        &mut self,
        text: &str,
        lang: &str,
    ) -> Result<AudioClip, Box<dyn std::error::Error>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Box::new(GttsError::EmptyText));
        }

        let mut bytes = Vec::new();
        for part in split_text(trimmed, MAX_CHARS_PER_REQUEST) {
            bytes.extend(self.fetch_part(&part, lang)?);
        }
        Ok(AudioClip {
            bytes,
            format: AudioFormat::Mp3,
        })
    }
}

/// Split `text` into parts of at most `max_chars` characters.
///
/// Breaks on whitespace where possible. A single token longer than
/// `max_chars`, typical for unspaced CJK text, falls back to fixed
/// character windows.
fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        let word_chars = word.chars().count();
        if word_chars > max_chars {
            parts.extend(char_windows(word, max_chars));
            continue;
        }
        match parts.last_mut() {
            Some(last) if last.chars().count() + 1 + word_chars <= max_chars => {
                last.push(' ');
                last.push_str(word);
            }
            _ => parts.push(word.to_string()),
        }
    }
    parts
}

fn char_windows(word: &str, max_chars: usize) -> Vec<String> {
    let mut windows = Vec::new();
    let mut current = String::new();
    for (n, ch) in word.chars().enumerate() {
        if n > 0 && n % max_chars == 0 {
            windows.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        windows.push(current);
    }
    windows
}
