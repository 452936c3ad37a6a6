mod identity;
mod models;
mod module;
mod tag;

pub use identity::{Caller, Role};
pub use models::*;
pub use module::{ModuleKind, ModuleRef};
pub use tag::{Tag, TagSnapshot, TagStatus};
