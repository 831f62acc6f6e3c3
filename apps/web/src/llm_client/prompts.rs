// Prompt constants for the outline request.
// The reply format here is what generation::outline knows how to parse.

/// Outline prompt template. Replace `{topic}` before sending.
pub const OUTLINE_PROMPT_TEMPLATE: &str = "Create a PowerPoint presentation on the topic: \"{topic}\".
Structure it into 5 slides. Each slide should have a title and 3–5 bullet points.
Return the response like this:
Slide 1: Title
- Bullet
- Bullet
Slide 2: Title
- Bullet
...";

pub fn outline_prompt(topic: &str) -> String {
    OUTLINE_PROMPT_TEMPLATE.replace("{topic}", topic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_prompt_embeds_topic() {
        let prompt = outline_prompt("Ocean currents");
        assert!(prompt.starts_with("Create a PowerPoint presentation on the topic: \"Ocean currents\"."));
        assert!(prompt.contains("Structure it into 5 slides."));
        assert!(!prompt.contains("{topic}"));
    }
}
