//! Interactive confirmation prompts.

use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use tracing::warn;

use crate::port::Confirmer;

/// Asks on the terminal. Defaults to "no".
///
/// A prompt that cannot be shown (no TTY, closed stdin) counts as a
/// refusal.
#[derive(Debug, Default)]
pub struct DialoguerConfirmer;

impl Confirmer for DialoguerConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        let theme = ColorfulTheme::default();
        match Confirm::with_theme(&theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
        {
            Ok(answer) => answer,
            Err(err) => {
                warn!(error = %err, "Confirmation prompt unavailable, treating as declined");
                false
            }
        }
    }
}
