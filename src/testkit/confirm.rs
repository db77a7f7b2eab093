//! Confirmation gate with a fixed answer.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::port::Confirmer;

/// Answers every prompt the same way and remembers what was asked.
///
/// Clones share the prompt log, so a test can keep one handle while the
/// store owns another.
#[derive(Debug, Clone)]
pub struct ScriptedConfirmer {
    answer: bool,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConfirmer {
    pub fn always(answer: bool) -> Self {
        Self {
            answer,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().push(prompt.to_string());
        self.answer
    }
}
