pub mod files;
pub mod store;

pub use files::{backup_file, default_list_path};
pub use store::{load_list, save_list};
