//! TestSuite entity: a named execution of a fixed set of test cases.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "test_suites")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub created_by: Option<i32>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::test_run_entry::Entity")]
    RunEntry,
}

impl Related<super::test_run_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RunEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
