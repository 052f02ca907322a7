use crate::notes::NoteRecord;

/// Seed entries shown on first launch. None of them has backing audio.
pub fn demo_notes() -> Vec<NoteRecord> {
    vec![
        NoteRecord::placeholder("1", "Morning Thoughts", "01:24", "Today"),
        NoteRecord::placeholder("2", "Meeting Notes", "03:10", "Yesterday"),
        NoteRecord::placeholder("3", "Daily Reflection", "02:45", "Jan 12"),
        NoteRecord::placeholder("4", "Ideas & Brainstorm", "04:02", "Jan 10"),
        NoteRecord::placeholder("5", "Project Planning", "05:18", "Jan 8"),
        NoteRecord::placeholder("6", "Creative Writing", "02:30", "Jan 5"),
    ]
}
