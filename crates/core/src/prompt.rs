//! Prompt validation and the expansion instruction template.

use crate::error::CoreError;

/// Validate and normalize a user prompt.
///
/// The prompt is trimmed and must be non-empty. `max_chars`, when set, caps
/// the trimmed length in characters; no content filtering is applied.
pub fn normalize_prompt(raw: &str, max_chars: Option<usize>) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Prompt must not be empty".into()));
    }
    if let Some(max) = max_chars {
        let len = trimmed.chars().count();
        if len > max {
            return Err(CoreError::Validation(format!(
                "Prompt is {len} characters long, maximum is {max}"
            )));
        }
    }
    Ok(trimmed.to_string())
}

/// Build the text-completion instruction that turns a song or artist name
/// into a descriptive image prompt.
pub fn expansion_instruction(prompt: &str) -> String {
    format!(
        "Create a vivid and detailed description for an image based on the following \
         song or artist: \"{prompt}\". The description should describe the song or artist \
         in vivid detail with specific references to the song or something distinctive \
         about the artist so an image can be generated from the description. If there is \
         an iconic logo or visual reference for the band, include that in the image."
    )
}
