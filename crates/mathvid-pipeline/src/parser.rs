//! Splits the model's raw response into scene code, narration and captions.
//!
//! Markers are literal substrings. A section runs from the end of its marker
//! to the nearest following marker (or the end of the text) and is trimmed.
//! A missing marker yields an empty field, never an error.

use mathvid_ai::{CAPTIONS_MARKER, NARRATION_MARKER, SCENE_MARKER};
use mathvid_models::GenerationResult;

const MARKERS: [&str; 3] = [SCENE_MARKER, NARRATION_MARKER, CAPTIONS_MARKER];

/// Fence openers stripped from scene code, longest first.
const FENCE_OPENERS: [&str; 3] = ["```python", "```py", "```"];
const FENCE_CLOSE: &str = "```";

/// Parse one raw response. Never fails.
pub fn parse_response(raw: &str) -> GenerationResult {
    GenerationResult {
        scene_code: section(raw, SCENE_MARKER)
            .map(strip_code_fence)
            .unwrap_or_default(),
        narration_script: section(raw, NARRATION_MARKER)
            .map(str::to_string)
            .unwrap_or_default(),
        caption_track: section(raw, CAPTIONS_MARKER)
            .map(str::to_string)
            .unwrap_or_default(),
    }
}

fn section<'a>(raw: &'a str, marker: &str) -> Option<&'a str> {
    let start = raw.find(marker)? + marker.len();
    let rest = &raw[start..];
    let end = MARKERS
        .iter()
        .filter_map(|m| rest.find(m))
        .min()
        .unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// Remove an optional opening fence and an optional closing fence.
///
/// Either may be absent; they are handled independently.
fn strip_code_fence(code: &str) -> String {
    let mut code = code.trim();

    if let Some(opener) = FENCE_OPENERS.iter().find(|f| code.starts_with(*f)) {
        code = &code[opener.len()..];
    }
    if let Some(stripped) = code.trim_end().strip_suffix(FENCE_CLOSE) {
        code = stripped;
    }

    code.trim().to_string()
}
