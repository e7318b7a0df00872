pub mod directory_entry;
pub mod gallery_item;
pub mod selection;

pub use directory_entry::DirectoryEntry;
pub use gallery_item::GalleryItem;
pub use selection::{Selection, SelectionSet, TapAction};
