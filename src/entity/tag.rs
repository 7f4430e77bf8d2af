//! Tag entity. Names are unique and case-sensitive.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::test_case_tag::Entity")]
    TestCaseTag,
}

impl Related<super::test_case_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestCaseTag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
