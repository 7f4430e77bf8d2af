//! Create test_suites, test_run_entries and test_run_step_results tables.
//!
//! Run entries keep the source test case title so they remain readable after
//! the test case is deleted (the reference is set to NULL).

use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_users::Users;
use super::m20260301_000003_create_test_cases::TestCases;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestSuites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestSuites::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestSuites::Title).string().not_null())
                    .col(ColumnDef::new(TestSuites::Description).text())
                    .col(
                        ColumnDef::new(TestSuites::Status)
                            .string()
                            .not_null()
                            .default("In Progress"),
                    )
                    .col(ColumnDef::new(TestSuites::CreatedBy).integer())
                    .col(
                        ColumnDef::new(TestSuites::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestSuites::Table, TestSuites::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TestRunEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestRunEntries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestRunEntries::TestSuiteId).integer().not_null())
                    .col(ColumnDef::new(TestRunEntries::TestCaseId).integer())
                    .col(ColumnDef::new(TestRunEntries::TestCaseTitle).string().not_null())
                    .col(
                        ColumnDef::new(TestRunEntries::Status)
                            .string_len(20)
                            .not_null()
                            .default("Not Run"),
                    )
                    .col(ColumnDef::new(TestRunEntries::ActualResult).text())
                    .col(ColumnDef::new(TestRunEntries::AssignedTo).integer())
                    .col(ColumnDef::new(TestRunEntries::ExecutedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestRunEntries::Table, TestRunEntries::TestSuiteId)
                            .to(TestSuites::Table, TestSuites::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestRunEntries::Table, TestRunEntries::TestCaseId)
                            .to(TestCases::Table, TestCases::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestRunEntries::Table, TestRunEntries::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_run_entries_suite_id")
                    .table(TestRunEntries::Table)
                    .col(TestRunEntries::TestSuiteId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_run_entries_executed_at")
                    .table(TestRunEntries::Table)
                    .col(TestRunEntries::ExecutedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TestRunStepResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestRunStepResults::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TestRunStepResults::TestRunEntryId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TestRunStepResults::StepNumber).integer().not_null())
                    .col(ColumnDef::new(TestRunStepResults::Action).text().not_null())
                    .col(ColumnDef::new(TestRunStepResults::ExpectedResult).text())
                    .col(ColumnDef::new(TestRunStepResults::ActualResult).text())
                    .col(
                        ColumnDef::new(TestRunStepResults::Status)
                            .string_len(20)
                            .not_null()
                            .default("Not Run"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestRunStepResults::Table, TestRunStepResults::TestRunEntryId)
                            .to(TestRunEntries::Table, TestRunEntries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_run_step_results_entry_id")
                    .table(TestRunStepResults::Table)
                    .col(TestRunStepResults::TestRunEntryId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestRunStepResults::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TestRunEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TestSuites::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestSuites {
    Table,
    Id,
    Title,
    Description,
    Status,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum TestRunEntries {
    Table,
    Id,
    TestSuiteId,
    TestCaseId,
    TestCaseTitle,
    Status,
    ActualResult,
    AssignedTo,
    ExecutedAt,
}

#[derive(DeriveIden)]
pub enum TestRunStepResults {
    Table,
    Id,
    TestRunEntryId,
    StepNumber,
    Action,
    ExpectedResult,
    ActualResult,
    Status,
}
