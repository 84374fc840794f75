//! Prompt construction for the scene/narration/caption request.

use mathvid_models::Level;

/// Section markers the response parser splits on.
pub const SCENE_MARKER: &str = "MANIM_CODE:";
pub const NARRATION_MARKER: &str = "VOICE_SCRIPT:";
pub const CAPTIONS_MARKER: &str = "SUBTITLES:";

/// Build the generation prompt for `topic` at `level`.
///
/// The scene class must be named `scene_name`; the renderer asks the engine
/// for exactly that class.
pub fn build_prompt(topic: &str, level: Level, scene_name: &str) -> String {
    let level_name = level.as_str();
    let level_description = level.description();

    format!(
        r#"Create an explanatory math video for the topic: "{topic}" at {level_name} level ({level_description}).

Generate THREE things:

1. A Manim Python script that creates an educational video scene:
- Start with: from manim import *
- Define exactly one class named {scene_name} that inherits from Scene
- Implement the construct method with educational animations and visualizations
- Use Manim objects such as Text, MathTex, Circle, Square and Arrow with colors and animations
- Build the explanation step by step for the {level_name} level
- Include a title, the main content and a short summary
- The code must be syntactically correct and runnable
- Never use images, SVG, PNG or any other external media
- Keep the total animation duration around 10-15 seconds

2. A voice script that will be spoken over the video:
- Clear, educational narration explaining the concept
- Follow the video's sections (introduction, explanation, conclusion)
- Use language suited to the {level_name} level
- Suitable for text-to-speech
- Start each segment with a timing marker in the format [MM:SS]
- The narration should last as long as the video (10-15 seconds)
- Example: [00:00] Welcome to this math explanation. [00:03] Let's start with the basics.

3. Subtitles in WebVTT format:
- Split the voice script into segments of 2-3 seconds each
- Give every segment start and end times that follow the timing markers

Format your response exactly as:
{SCENE_MARKER}
```python
[Python code here]
```

{NARRATION_MARKER}
[Voice script text here]

{CAPTIONS_MARKER}
[WebVTT subtitle content here]
"#
    )
}
