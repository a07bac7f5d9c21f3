mod book;
mod collection;
mod reading;

pub use book::{Book, NewBook, ValidBook};
pub use collection::{CollectionSort, GroupBy, ShelfFilter};
pub use reading::{
    CollectionEntry, NewNote, Note, ObjectiveRequest, ObjectiveType, ReadingRecord,
};
