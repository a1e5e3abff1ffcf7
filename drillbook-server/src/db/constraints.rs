//! Named constraints of the schema and their user-facing messages
//!
//! Every name here must match a constraint or unique index created in
//! [`super::schema`]. [`super::schema::verify_constraints`] checks this at
//! startup.

/// A constraint or unique index the store can report as violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    DrillsPk,
    DrillName,
    CategoriesPk,
    CategoryName,
    SubCategoriesPk,
    SubCategoryName,
    InstructionsPk,
    InstructionDrill,
    DrillCategoriesPk,
    DrillCategoriesDrill,
    DrillCategoriesCategory,
    DrillSubCategoriesPk,
    DrillSubCategoriesDrill,
    DrillSubCategoriesSubCategory,
    RelatedDrillsPk,
    RelatedDrillsDrill,
    RelatedDrillsRelated,
}

impl Constraint {
    pub const ALL: [Constraint; 17] = [
        Self::DrillsPk,
        Self::DrillName,
        Self::CategoriesPk,
        Self::CategoryName,
        Self::SubCategoriesPk,
        Self::SubCategoryName,
        Self::InstructionsPk,
        Self::InstructionDrill,
        Self::DrillCategoriesPk,
        Self::DrillCategoriesDrill,
        Self::DrillCategoriesCategory,
        Self::DrillSubCategoriesPk,
        Self::DrillSubCategoriesDrill,
        Self::DrillSubCategoriesSubCategory,
        Self::RelatedDrillsPk,
        Self::RelatedDrillsDrill,
        Self::RelatedDrillsRelated,
    ];

    /// Name as declared in the schema.
    pub const fn name(self) -> &'static str {
        match self {
            Self::DrillsPk => "pk_drills",
            Self::DrillName => "uk_drills_name",
            Self::CategoriesPk => "pk_categories",
            Self::CategoryName => "uk_categories_name",
            Self::SubCategoriesPk => "pk_sub_categories",
            Self::SubCategoryName => "uk_sub_categories_name",
            Self::InstructionsPk => "pk_instructions",
            Self::InstructionDrill => "fk_instructions_drill",
            Self::DrillCategoriesPk => "pk_drill_categories",
            Self::DrillCategoriesDrill => "fk_drill_categories_drill",
            Self::DrillCategoriesCategory => "fk_drill_categories_category",
            Self::DrillSubCategoriesPk => "pk_drill_sub_categories",
            Self::DrillSubCategoriesDrill => "fk_drill_sub_categories_drill",
            Self::DrillSubCategoriesSubCategory => "fk_drill_sub_categories_sub_category",
            Self::RelatedDrillsPk => "pk_drill_related_drills",
            Self::RelatedDrillsDrill => "fk_drill_related_drills_drill",
            Self::RelatedDrillsRelated => "fk_drill_related_drills_related",
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::DrillName | Self::CategoryName | Self::SubCategoryName => "Name already exists.",
            Self::DrillsPk | Self::CategoriesPk | Self::SubCategoriesPk => "Id already exists.",
            Self::InstructionsPk => "Instruction number already exists.",
            Self::InstructionDrill
            | Self::DrillCategoriesDrill
            | Self::DrillSubCategoriesDrill
            | Self::RelatedDrillsDrill => "Drill does not exist.",
            Self::DrillCategoriesCategory => "Category does not exist.",
            Self::DrillCategoriesPk => "Category is already linked.",
            Self::DrillSubCategoriesSubCategory => "Sub-category does not exist.",
            Self::DrillSubCategoriesPk => "Sub-category is already linked.",
            Self::RelatedDrillsRelated => "Related drill does not exist.",
            Self::RelatedDrillsPk => "Related drill is already linked.",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = Constraint::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), Constraint::ALL.len());
    }

    #[test]
    fn lookup_round_trips() {
        for c in Constraint::ALL {
            assert_eq!(Constraint::from_name(c.name()), Some(c));
        }
        assert_eq!(Constraint::from_name("drills_name_key"), None);
    }

    #[test]
    fn messages() {
        assert_eq!(Constraint::DrillName.message(), "Name already exists.");
        assert_eq!(
            Constraint::DrillCategoriesCategory.message(),
            "Category does not exist."
        );
    }
}
