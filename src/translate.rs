//! Fallback lookup of translations from an online service.

use crate::error::{Result, VaultError};
use crate::models::{Definition, Translation};
use log::{debug, info};
use serde::Deserialize;
use std::future::Future;

/// Public endpoint of the Google translate web client.
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Something that can translate a single word.
pub trait Translator {
    fn translate(&self, word: &str) -> impl Future<Output = Result<Translation>> + Send;
}

/// Options for the HTTP translator.
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    /// Language of the saved words (ISO 639-1).
    pub source_lang: String,
    /// Language translations are shown in (ISO 639-1).
    pub target_lang: String,
    pub endpoint: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig {
            source_lang: "en".to_string(),
            target_lang: "ru".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// Translator backed by the Google translate web endpoint.
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    client: reqwest::Client,
    config: TranslatorConfig,
}

impl HttpTranslator {
    pub fn new(config: TranslatorConfig) -> Self {
        HttpTranslator {
            client: reqwest::Client::new(),
            config,
        }
    }
}

impl Translator for HttpTranslator {
    async fn translate(&self, word: &str) -> Result<Translation> {
        info!(
            "Requesting translation of '{}' ({} -> {})",
            word, self.config.source_lang, self.config.target_lang
        );
        let query = [
            ("client", "gtx"),
            ("sl", self.config.source_lang.as_str()),
            ("tl", self.config.target_lang.as_str()),
            ("hl", self.config.target_lang.as_str()),
            ("dj", "1"),
            ("dt", "t"),
            ("dt", "bd"),
            ("dt", "md"),
            ("dt", "ex"),
            ("dt", "rm"),
            ("q", word),
        ];
        let response: RawResponse = self
            .client
            .get(&self.config.endpoint)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!("Received translation response for '{}'", word);
        response.into_translation(word)
    }
}

// --- Service Response ---

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    sentences: Vec<RawSentence>,
    #[serde(default)]
    dict: Vec<RawDictGroup>,
    #[serde(default)]
    definitions: Vec<RawDefinitionGroup>,
    #[serde(default)]
    examples: Option<RawExamples>,
}

#[derive(Debug, Deserialize)]
struct RawSentence {
    trans: Option<String>,
    src_translit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDictGroup {
    #[serde(default)]
    pos: String,
    #[serde(default)]
    terms: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawDefinitionGroup {
    #[serde(default)]
    pos: String,
    #[serde(default)]
    entry: Vec<RawDefinition>,
}

#[derive(Debug, Deserialize)]
struct RawDefinition {
    gloss: String,
    example: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawExamples {
    #[serde(default)]
    example: Vec<RawExample>,
}

#[derive(Debug, Deserialize)]
struct RawExample {
    text: String,
}

impl RawResponse {
    fn into_translation(self, word: &str) -> Result<Translation> {
        let text: String = self
            .sentences
            .iter()
            .filter_map(|s| s.trans.as_deref())
            .collect();
        if text.trim().is_empty() {
            return Err(VaultError::Translation(format!(
                "no translation returned for '{}'",
                word
            )));
        }
        let phonetic = self
            .sentences
            .iter()
            .find_map(|s| s.src_translit.clone())
            .filter(|p| !p.is_empty());

        let mut translation = Translation {
            text: text.trim().to_string(),
            phonetic,
            ..Default::default()
        };
        for group in self.dict {
            translation
                .alternates
                .extend_label(Some(group.pos.as_str()), group.terms);
        }
        for group in self.definitions {
            translation.definitions.extend_label(
                Some(group.pos.as_str()),
                group.entry.into_iter().map(|d| Definition {
                    text: d.gloss,
                    example: d.example,
                }),
            );
        }
        translation.examples = self
            .examples
            .map(|e| e.example.into_iter().map(|x| strip_bold(&x.text)).collect())
            .unwrap_or_default();
        Ok(translation)
    }
}

fn strip_bold(text: &str) -> String {
    text.replace("<b>", "").replace("</b>", "")
}

/// Parses a raw service response body; exposed for offline use and tests.
pub fn parse_response(word: &str, body: &str) -> Result<Translation> {
    let raw: RawResponse = serde_json::from_str(body)?;
    raw.into_translation(word)
}
