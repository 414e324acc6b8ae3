//! Prompt selection: picks one paragraph of a source text as the generation prompt.

use serde::Serialize;

use crate::errors::AppError;
use crate::layout::wrap::split_paragraphs;

/// The chosen prompt and how many candidates it was picked from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptSelection {
    pub prompt: String,
    pub paragraph_count: usize,
}

/// Picks a uniformly random non-empty paragraph from `source_text`.
pub fn select_prompt(source_text: &str) -> Result<PromptSelection, AppError> {
    select_prompt_with(source_text, random_index)
}

/// Same as `select_prompt` with an explicit index picker, `pick(len) < len`.
pub fn select_prompt_with<F>(source_text: &str, pick: F) -> Result<PromptSelection, AppError>
where
    F: FnOnce(usize) -> Result<usize, AppError>,
{
    let mut paragraphs = split_paragraphs(source_text);
    if paragraphs.is_empty() {
        return Err(AppError::Validation(
            "source text contains no valid paragraphs".to_string(),
        ));
    }
    let paragraph_count = paragraphs.len();
    let index = pick(paragraph_count)?.min(paragraph_count - 1);
    Ok(PromptSelection {
        prompt: paragraphs.swap_remove(index),
        paragraph_count,
    })
}

fn random_index(len: usize) -> Result<usize, AppError> {
    let mut buf = [0u8; 8];
    getrandom::getrandom(&mut buf)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("random source unavailable: {e}")))?;
    Ok((u64::from_le_bytes(buf) % len as u64) as usize)
}
