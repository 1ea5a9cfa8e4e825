pub mod debounce;
pub mod extract;
pub mod index_writer;
pub mod pipeline;
pub mod questions;
pub mod synchronizer;

/// Files the synchronizer and the question pass never look at: dotfiles and
/// the Windows thumbnail cache.
pub(crate) fn is_ignored_file(name: &str) -> bool {
    name.starts_with('.') || name == "Thumbs.db"
}
