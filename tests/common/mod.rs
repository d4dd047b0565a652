// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Scripted oracle shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sortwise::classifier::Classifier;
use sortwise::ollama::TextOracle;
use sortwise::{AppConfig, Orchestrator, Result, SortwiseError};

/// How the oracle reacts to one file name
#[derive(Clone)]
pub enum Reply {
    Answer(&'static str),
    Error,
    Panic,
}

/// Oracle answering per file name; unknown names get "Other"
#[derive(Default)]
pub struct ScriptedOracle {
    replies: HashMap<String, Reply>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, file_name: &str, reply: Reply) -> Self {
        self.replies.insert(file_name.to_string(), reply);
        self
    }

    pub fn answer(self, file_name: &str, answer: &'static str) -> Self {
        self.on(file_name, Reply::Answer(answer))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextOracle for ScriptedOracle {
    async fn generate(&self, _model: &str, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let reply = self
            .replies
            .iter()
            .find(|(name, _)| prompt.contains(&format!("\"{}\"", name)))
            .map(|(_, reply)| reply.clone())
            .unwrap_or(Reply::Answer("Other"));

        match reply {
            Reply::Answer(text) => Ok(text.to_string()),
            Reply::Error => Err(SortwiseError::OracleUnavailable("scripted failure".to_string())),
            Reply::Panic => panic!("scripted panic"),
        }
    }
}

pub fn orchestrator(oracle: Arc<ScriptedOracle>) -> Orchestrator {
    Orchestrator::new(Classifier::from_config(oracle, &AppConfig::default()))
}
