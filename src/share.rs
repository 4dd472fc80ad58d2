use crate::note::Note;

pub const NO_TAGS_PLACEHOLDER: &str = "No tags";

/// Text handed to the platform share sheet for a note.
pub fn share_text(note: &Note) -> String {
    let tags = if note.tags.trim().is_empty() {
        NO_TAGS_PLACEHOLDER
    } else {
        note.tags.as_str()
    };
    format!(
        "Title: {}\nDate: {}\nTags: {}\n\nTranscript:\n{}",
        note.display_title(),
        note.created_at,
        tags,
        note.content
    )
}
