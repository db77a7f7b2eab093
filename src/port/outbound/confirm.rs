//! Confirmation gate for destructive operations.

/// Blocking yes/no prompt shown before a destructive request is issued.
pub trait Confirmer: Send + Sync {
    /// Returns `true` when the user agrees to proceed.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirmer that agrees to everything (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}
