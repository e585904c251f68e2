/*!
 * Editing sessions.
 *
 * An [`EditSession`] owns one document, its undo/redo history, the file it came from
 * and whether it has unsaved changes. Hosts drive every edit through it.
 */

pub mod manager;

// Re-export main types
pub use manager::EditSession;
