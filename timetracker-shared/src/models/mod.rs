/// Database models for the time tracker
///
/// Each model owns its SQL as associated async functions taking a
/// `&PgPool`. Repositories in [`crate::repository`] wrap these and convert
/// missing rows and driver failures into [`crate::error::AppError`].
///
/// - `user`: accounts and the closed [`user::Role`] set
/// - `friend`: directed subscribe edges
/// - `entry`: logged time spans
/// - `tag`: tags and the `tag_entry` link table
/// - `goal`: hour targets
/// - `project`: projects
/// - `session`: session tokens (`cookie` table)

pub mod entry;
pub mod friend;
pub mod goal;
pub mod project;
pub mod session;
pub mod tag;
pub mod user;
