//! Frozen copy of a test case step plus its execution outcome.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "test_run_step_results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub test_run_entry_id: i32,
    pub step_number: i32,
    pub action: String,
    pub expected_result: Option<String>,
    pub actual_result: Option<String>,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_run_entry::Entity",
        from = "Column::TestRunEntryId",
        to = "super::test_run_entry::Column::Id",
        on_delete = "Cascade"
    )]
    RunEntry,
}

impl Related<super::test_run_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RunEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
