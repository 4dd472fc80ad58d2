use crate::note::Note;

/// Case-insensitive substring match on title, content or tags.
/// A blank query matches nothing.
pub fn matches(note: &Note, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return false;
    }
    [&note.title, &note.content, &note.tags]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}

/// Sorts by `created_at` descending. The sort is stable, so notes sharing a
/// timestamp keep the order they were passed in.
pub fn sort_newest_first(notes: &mut [Note]) {
    notes.sort_by_key(|note| std::cmp::Reverse(note.created_at_sort_key()));
}

pub fn filter_and_sort<'a, I, F>(notes: I, mut keep: F) -> Vec<Note>
where
    I: IntoIterator<Item = &'a Note>,
    F: FnMut(&Note) -> bool,
{
    let mut selected: Vec<Note> = notes.into_iter().filter(|n| keep(n)).cloned().collect();
    sort_newest_first(&mut selected);
    selected
}
