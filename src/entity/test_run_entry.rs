//! Execution record of one test case within one suite.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "test_run_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub test_suite_id: i32,
    /// Live reference to the source test case; nulled when the case is deleted.
    pub test_case_id: Option<i32>,
    /// Title of the source test case at snapshot time.
    pub test_case_title: String,
    pub status: String,
    pub actual_result: Option<String>,
    pub assigned_to: Option<i32>,
    pub executed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_suite::Entity",
        from = "Column::TestSuiteId",
        to = "super::test_suite::Column::Id",
        on_delete = "Cascade"
    )]
    TestSuite,
    #[sea_orm(
        belongs_to = "super::test_case::Entity",
        from = "Column::TestCaseId",
        to = "super::test_case::Column::Id",
        on_delete = "SetNull"
    )]
    TestCase,
    #[sea_orm(has_many = "super::test_run_step_result::Entity")]
    StepResult,
}

impl Related<super::test_suite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestSuite.def()
    }
}

impl Related<super::test_run_step_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StepResult.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
