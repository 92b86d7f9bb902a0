//! Shared test doubles.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use advocate::providers::Credential;
use advocate::{AdvocateError, Result, TextProvider};

/// A reply carrying all four section headers.
pub const FULL_REPLY: &str = "YOUR RIGHTS:\nYou are entitled to a refund of the deposit.\n\n\
IMMEDIATE STEPS:\n1. Send a written demand.\n\n\
REQUIRED DOCUMENTS:\n- Rental agreement\n- Payment receipts\n\n\
FORMAL NOTICE FORMAT:\nTo the landlord, ...";

pub const FAST_MODELS: &[&str] = &["model-a", "model-b"];

type Script = dyn Fn(usize, &str) -> Result<String> + Send + Sync;

/// Provider whose outcome is a function of (credential position, model).
///
/// Records every attempt in call order.
pub struct ScriptedProvider {
    script: Box<Script>,
    calls: Mutex<Vec<(usize, String)>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(script: impl Fn(usize, &str) -> Result<String> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Always reply with [`FULL_REPLY`].
    pub fn answering() -> Arc<Self> {
        Self::new(|_, _| Ok(FULL_REPLY.to_string()))
    }

    /// Always fail with the given error constructor.
    pub fn failing(err: impl Fn() -> AdvocateError + Send + Sync + 'static) -> Arc<Self> {
        Self::new(move |_, _| Err(err()))
    }

    pub fn calls(&self) -> Vec<(usize, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn attempt(&self, prompt: &str, credential: &Credential, model: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.calls
            .lock()
            .unwrap()
            .push((credential.position(), model.to_string()));
        tokio::task::yield_now().await;
        (self.script)(credential.position(), model)
    }
}

pub fn quota() -> AdvocateError {
    AdvocateError::RateLimited { retry_after: None }
}

pub fn models() -> Vec<String> {
    FAST_MODELS.iter().map(|m| m.to_string()).collect()
}
