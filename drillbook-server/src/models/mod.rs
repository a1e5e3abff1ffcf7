//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod text;
pub mod tag;
pub mod drill;

pub use validation::{ValidationError, Violation, Violations};
pub use text::{Description, EntityName, Step, VideoId};
pub use tag::{CategoryKind, SubCategoryKind, TagDraft, TagKind};
pub use drill::{Drill, Instruction};
