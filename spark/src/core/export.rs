//! Markdown export of a list of story starters.

use crate::core::types::StoryStarter;

/// Download name offered for exported markdown.
pub const EXPORT_FILE_NAME: &str = "emotioncraft-story-starters.md";

const SEPARATOR: &str = "\n\n---\n\n";

/// Render starters as markdown: one `## Story Starter N` block per starter,
/// blocks separated by horizontal rules.
///
/// Titled starters get a `### title` line above the story.
pub fn export_markdown(stories: &[StoryStarter]) -> String {
    stories
        .iter()
        .enumerate()
        .map(|(index, starter)| render_block(index + 1, starter))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

fn render_block(number: usize, starter: &StoryStarter) -> String {
    let title = starter.title.trim();
    if title.is_empty() {
        format!("## Story Starter {number}\n\n{}", starter.story)
    } else {
        format!("## Story Starter {number}\n\n### {title}\n\n{}", starter.story)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untitled_starters_render_exactly() {
        let stories = vec![StoryStarter::untitled("A"), StoryStarter::untitled("B")];
        assert_eq!(
            export_markdown(&stories),
            "## Story Starter 1\n\nA\n\n---\n\n## Story Starter 2\n\nB"
        );
    }

    #[test]
    fn titled_starters_include_title_heading() {
        let stories = vec![StoryStarter::new("The Door", "It was open.")];
        assert_eq!(
            export_markdown(&stories),
            "## Story Starter 1\n\n### The Door\n\nIt was open."
        );
    }

    #[test]
    fn empty_list_exports_empty_text() {
        assert_eq!(export_markdown(&[]), "");
    }
}
