//! Scripted agents and speech for session/orchestrator tests.

use async_trait::async_trait;
use dualchat_core::agent::{Agent, AgentReply};
use dualchat_core::error::{CompletionError, SynthesisError};
use dualchat_core::knowledge::Document;
use dualchat_core::message::{Audio, Message};
use dualchat_core::speech::TextToSpeech;
use std::sync::{Arc, Mutex};

/// Ordered record of calls across every mock sharing it.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

/// What a `MockAgent` saw on one call.
#[derive(Debug, Clone)]
pub struct SeenCall {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub history_len: usize,
}

/// An agent answering `"<name>: <prompt>"`, optionally with sources.
pub struct MockAgent {
    name: String,
    sources: Option<Vec<Document>>,
    answer: Option<String>,
    fail: bool,
    log: CallLog,
    seen: Mutex<Vec<SeenCall>>,
}

impl MockAgent {
    pub fn new(name: &str, log: CallLog) -> Self {
        Self {
            name: name.to_string(),
            sources: None,
            answer: None,
            fail: false,
            log,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_sources(mut self, sources: Vec<Document>) -> Self {
        self.sources = Some(sources);
        self
    }

    /// Answer with a fixed text instead of echoing the prompt.
    pub fn with_answer(mut self, answer: &str) -> Self {
        self.answer = Some(answer.to_string());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn seen(&self) -> Vec<SeenCall> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for MockAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn respond(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        history: &[Message],
    ) -> dualchat_core::Result<AgentReply> {
        self.log.push(format!("respond:{}", self.name));
        self.seen.lock().unwrap().push(SeenCall {
            prompt: prompt.to_string(),
            system_prompt: system_prompt.map(str::to_string),
            history_len: history.len(),
        });
        if self.fail {
            return Err(CompletionError::Network("connection reset".into()).into());
        }
        let answer = self
            .answer
            .clone()
            .unwrap_or_else(|| format!("{}: {prompt}", self.name));
        Ok(match &self.sources {
            Some(docs) => AgentReply::grounded(answer, docs.clone()),
            None => AgentReply::text(answer),
        })
    }
}

/// Speech that returns the text bytes as "audio".
pub struct MockSpeech {
    log: CallLog,
    fail: bool,
}

impl MockSpeech {
    pub fn new(log: CallLog) -> Self {
        Self { log, fail: false }
    }

    pub fn failing(log: CallLog) -> Self {
        Self { log, fail: true }
    }
}

#[async_trait]
impl TextToSpeech for MockSpeech {
    fn name(&self) -> &str {
        "mock_speech"
    }

    async fn synthesize(&self, text: &str) -> Result<Audio, SynthesisError> {
        self.log.push("synthesize");
        if self.fail {
            return Err(SynthesisError::Network("speech service down".into()));
        }
        Ok(Audio {
            bytes: text.as_bytes().to_vec(),
            mime_type: "audio/mpeg".into(),
        })
    }
}
