//! Categories and sub-categories
//!
//! Both are "tags": a unique name plus a description, attached to drills
//! many-to-many. They share one implementation parameterized by [`TagKind`].

use std::fmt::Debug;

use super::{Description, EntityName, Violations};

/// Describes one family of named, described, uniquely-keyed entities.
pub trait TagKind: Debug + Clone + Copy + Send + Sync + Unpin + 'static {
    /// Backing table
    const TABLE: &'static str;

    /// Singular resource name used in errors and logs
    const RESOURCE: &'static str;

    /// Collection endpoint, e.g. `/category`
    const ENDPOINT: &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryKind;

impl TagKind for CategoryKind {
    const TABLE: &'static str = "categories";
    const RESOURCE: &'static str = "category";
    const ENDPOINT: &'static str = "/category";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubCategoryKind;

impl TagKind for SubCategoryKind {
    const TABLE: &'static str = "sub_categories";
    const RESOURCE: &'static str = "sub-category";
    const ENDPOINT: &'static str = "/sub_category";
}

/// Validated tag ready to be saved. `id: None` inserts, `Some` updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDraft {
    pub id: Option<i64>,
    pub name: EntityName,
    pub description: Description,
}

impl TagDraft {
    /// Validate raw fields, collecting every failure.
    pub fn parse(id: Option<i64>, name: &str, description: &str) -> Result<Self, Violations> {
        let mut v = Violations::new();
        let name = v.check(EntityName::new(name));
        let description = v.check(Description::new(description));

        match (name, description) {
            (Some(name), Some(description)) => Ok(Self {
                id,
                name,
                description,
            }),
            _ => Err(v),
        }
    }

    /// Same draft targeting `id`.
    pub fn with_id(self, id: i64) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }
}
