// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Name-based file classification through the text oracle
//!
//! `classify` is total: transport failures and unrecognised answers both
//! collapse to [`Category::Other`] here and never reach the caller.

use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::categories::Category;
use crate::config::{AppConfig, CATEGORIES_PLACEHOLDER, FILE_NAME_PLACEHOLDER};
use crate::ollama::TextOracle;

/// Classifier client wrapping a text oracle
#[derive(Clone)]
pub struct Classifier {
    oracle: Arc<dyn TextOracle>,
    model: String,
    template: String,
}

impl Classifier {
    pub fn new(oracle: Arc<dyn TextOracle>, model: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            oracle,
            model: model.into(),
            template: template.into(),
        }
    }

    /// Build a classifier with the model and prompt from the configuration
    pub fn from_config(oracle: Arc<dyn TextOracle>, config: &AppConfig) -> Self {
        Self::new(oracle, config.ai_engine.model.clone(), config.prompts.classify.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Render the instruction prompt for one file name
    pub fn build_prompt(&self, file_name: &str) -> String {
        self.template
            .replace(CATEGORIES_PLACEHOLDER, &Category::joined_labels())
            .replace(FILE_NAME_PLACEHOLDER, file_name)
    }

    /// Classify a file by name. Never fails; falls back to `Other`.
    pub async fn classify(&self, file_name: &str) -> Category {
        let prompt = self.build_prompt(file_name);

        match self.oracle.generate(&self.model, &prompt).await {
            Ok(answer) => match parse_answer(&answer) {
                Some(category) => {
                    debug!("Classified {:?} as {}", file_name, category);
                    category
                }
                None => {
                    warn!(
                        "Oracle returned an unexpected category {:?} for {:?}, defaulting to Other",
                        answer.trim(),
                        file_name
                    );
                    Category::Other
                }
            },
            Err(e) => {
                error!("Error classifying {:?}: {}", file_name, e);
                Category::Other
            }
        }
    }
}

/// Whitespace-trimmed, case-sensitive match against the registry
pub fn parse_answer(answer: &str) -> Option<Category> {
    Category::parse_exact(answer.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Result, SortwiseError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Oracle that answers with a fixed reply and records prompts
    struct FixedOracle {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl FixedOracle {
        fn answering(reply: &str) -> Arc<Self> {
            Arc::new(Self { reply: Some(reply.to_string()), prompts: Mutex::new(Vec::new()) })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { reply: None, prompts: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl TextOracle for FixedOracle {
        async fn generate(&self, _model: &str, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .ok_or_else(|| SortwiseError::OracleUnavailable("401 Unauthorized".to_string()))
        }
    }

    fn classifier(oracle: Arc<FixedOracle>) -> Classifier {
        Classifier::from_config(oracle, &AppConfig::default())
    }

    #[tokio::test]
    async fn test_valid_answer_is_returned() {
        let c = classifier(FixedOracle::answering("Invoices"));
        assert_eq!(c.classify("invoice_march.pdf").await, Category::Invoices);
    }

    #[tokio::test]
    async fn test_padded_answer_is_trimmed() {
        let c = classifier(FixedOracle::answering("  Spreadsheets\n"));
        assert_eq!(c.classify("budget.xlsx").await, Category::Spreadsheets);
    }

    #[tokio::test]
    async fn test_garbage_falls_back_to_other() {
        for reply in ["Zzz", "", "images", "The category is Images", "Images."] {
            let c = classifier(FixedOracle::answering(reply));
            assert_eq!(c.classify("photo.png").await, Category::Other, "reply {:?}", reply);
        }
    }

    #[tokio::test]
    async fn test_oracle_error_falls_back_to_other() {
        let c = classifier(FixedOracle::failing());
        assert_eq!(c.classify("contract.docx").await, Category::Other);
    }

    /// Log sink shared with a scoped subscriber
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    async fn classify_logged(oracle: Arc<FixedOracle>, file_name: &str) -> (Category, String) {
        let logs = CapturedLogs::default();
        let sink = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let category = classifier(oracle).classify(file_name).await;
        (category, logs.text())
    }

    #[tokio::test]
    async fn test_unexpected_answer_is_logged() {
        let (category, logs) = classify_logged(FixedOracle::answering("Zzz"), "photo.png").await;
        assert_eq!(category, Category::Other);
        assert!(logs.contains("WARN"), "{}", logs);
        assert!(logs.contains("unexpected category \"Zzz\""), "{}", logs);
        assert!(logs.contains("photo.png"), "{}", logs);
    }

    #[tokio::test]
    async fn test_oracle_error_is_logged() {
        let (category, logs) = classify_logged(FixedOracle::failing(), "contract.docx").await;
        assert_eq!(category, Category::Other);
        assert!(logs.contains("ERROR"), "{}", logs);
        assert!(logs.contains("Error classifying \"contract.docx\""), "{}", logs);
        assert!(!logs.contains("unexpected category"), "{}", logs);
    }

    #[tokio::test]
    async fn test_prompt_embeds_categories_and_name() {
        let oracle = FixedOracle::answering("Code");
        let c = classifier(oracle.clone());
        c.classify("main.rs").await;

        let prompts = oracle.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("File name: \"main.rs\""));
        assert!(prompts[0].contains("Invoices, Receipts, Images, Documents, Code"));
        assert!(prompts[0].contains("classify it as \"Other\""));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let c = classifier(FixedOracle::answering("Code"));
        assert_eq!(c.build_prompt("a.txt"), c.build_prompt("a.txt"));
    }
}
