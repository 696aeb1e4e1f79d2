pub(crate) mod fs;
pub(crate) mod terminal;

pub use fs::{remove_vcs_dirs, shorten_path, to_slash_path};
pub use terminal::{finished_title, progress_title, set_terminal_title, write_title};
