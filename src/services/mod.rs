pub mod cover_image;
pub mod delete_guard;
pub mod join_code;
pub mod maintenance;
pub mod profile_service;
pub mod seed;
pub mod slug;

pub use delete_guard::{can_delete, delete_guarded, DeletionCheck, EntityKind};
pub use profile_service::ProfileService;
