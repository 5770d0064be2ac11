/// Characters that may never appear in a title.
const INVALID_TITLE_CHARACTERS: &[char] = &[
    ':', '@', '/', '\\', '|', '^', '#', ';', '[', ']', '{', '}', '<', '>',
];

const MAX_TITLE_LENGTH: usize = 255;

/// Whether `title` could name a page, so a direct title lookup is worth trying.
pub fn is_valid_title(title: &str) -> bool {
    !title.trim().is_empty()
        && title.chars().count() <= MAX_TITLE_LENGTH
        && !title.starts_with('$')
        && !title.starts_with('~')
        && !title.starts_with("..")
        && !title.contains(INVALID_TITLE_CHARACTERS)
}
