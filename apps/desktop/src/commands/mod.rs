//! Operations exposed to the user interface.
//!
//! Every command that changes the store or the settings saves the document
//! before returning.

pub mod cards;
pub mod folders;
pub mod settings;
pub mod stats;
pub mod study;

pub use cards::{
    add_card, delete_all_cards, delete_card, edit_card, import_file, import_markdown, move_card,
    reset_cards, AddCardRequest, ImportResult,
};
pub use folders::{
    create_folder, delete_folder, list_folder_groups, list_folders, rename_folder,
    set_active_folders, FolderSummary,
};
pub use settings::{
    get_sampling_settings, mirror_status, reset_sampling_settings, save_now, save_sampling_settings,
    SaveResponse,
};
pub use stats::get_stats;
pub use study::{current_card, next_card, report_outcome, OutcomeResponse};
