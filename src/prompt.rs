//! Prompt module.
//! Thin seam over `dialoguer` so config setup and the event session can be driven
//! from a terminal in production and from scripted answers in tests.
//! Validation happens per submitted line; a rejected line re-prompts.

use anyhow::{Context, Result};
use dialoguer::Input;

/// Line validator: `Ok(())` accepts, `Err(message)` rejects and re-prompts.
pub type Validator<'a> = &'a dyn Fn(&str) -> Result<(), String>;

pub trait Prompter {
    /// Free-text prompt. Empty input is allowed.
    fn ask(&mut self, prompt: &str) -> Result<String>;

    /// Prompt that re-asks until `validate` accepts the line.
    fn ask_validated(&mut self, prompt: &str, validate: Validator<'_>) -> Result<String>;

    /// Prompt showing `default`; empty input selects it.
    fn ask_with_default(&mut self, prompt: &str, default: &str) -> Result<String> {
        let answer = self.ask(&format!("{prompt} (default: {default})"))?;
        if answer.trim().is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }
}

/// Interactive prompts on the controlling terminal.
#[derive(Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .with_context(|| format!("Failed to read input for '{}'", prompt))
    }

    fn ask_validated(&mut self, prompt: &str, validate: Validator<'_>) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .validate_with(|input: &String| validate(input))
            .interact_text()
            .with_context(|| format!("Failed to read input for '{}'", prompt))
    }
}


#[cfg(test)]
mod tests {
    use super::scripted::ScriptedPrompter;
    use super::*;

    #[test]
    fn test_ask_with_default_empty_selects_default() {
        let mut prompter = ScriptedPrompter::new(&["", "  "]);
        assert_eq!(prompter.ask_with_default("Enter out", "out/").unwrap(), "out/");
        assert_eq!(prompter.ask_with_default("Enter out", "out/").unwrap(), "out/");
        assert_eq!(prompter.prompts[0], "Enter out (default: out/)");
    }

    #[test]
    fn test_ask_validated_skips_rejected_lines() {
        let mut prompter = ScriptedPrompter::new(&["abc", "7"]);
        let only_digits = |s: &str| {
            if s.chars().all(|c| c.is_ascii_digit()) {
                Ok(())
            } else {
                Err("digits only".to_string())
            }
        };
        assert_eq!(prompter.ask_validated("n", &only_digits).unwrap(), "7");
        assert_eq!(prompter.remaining(), 0);
    }
}
