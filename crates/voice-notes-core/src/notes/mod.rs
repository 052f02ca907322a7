mod demo;
pub(crate) mod labels;
mod note;
mod store;

pub use {
    demo::demo_notes,
    note::{AudioRef, NoteId, NoteRecord},
    store::NoteStore,
};
