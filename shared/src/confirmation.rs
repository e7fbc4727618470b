use crate::types::Result;
use dialoguer::{Confirm, Input};

/// Standardized confirmation prompt used across binaries.
pub fn ask_confirmation(prompt: &str, default_yes: bool) -> Result<bool> {
    let choice = Confirm::new()
        .with_prompt(prompt)
        .default(default_yes)
        .show_default(true)
        .interact()?;
    Ok(choice)
}

/// Reads a single non-empty line from the terminal.
pub fn ask_text(prompt: &str) -> Result<String> {
    let text: String = Input::new()
        .with_prompt(prompt)
        .validate_with(|input: &String| -> std::result::Result<(), &'static str> {
            if input.trim().is_empty() {
                Err("input cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    Ok(text.trim().to_string())
}
