//! Create test_cases and test_case_steps tables.

use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_users::Users;
use super::m20260301_000002_create_folders::Folders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestCases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestCases::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestCases::Title).string().not_null())
                    .col(ColumnDef::new(TestCases::Description).text())
                    .col(ColumnDef::new(TestCases::PreConditions).text())
                    .col(
                        ColumnDef::new(TestCases::Priority)
                            .string_len(10)
                            .not_null()
                            .default("Medium"),
                    )
                    .col(
                        ColumnDef::new(TestCases::Status)
                            .string()
                            .not_null()
                            .default("Draft"),
                    )
                    .col(
                        ColumnDef::new(TestCases::IsAutomated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(TestCases::FolderId).integer())
                    .col(ColumnDef::new(TestCases::AuthorId).integer())
                    .col(
                        ColumnDef::new(TestCases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TestCases::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCases::Table, TestCases::FolderId)
                            .to(Folders::Table, Folders::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCases::Table, TestCases::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_cases_folder_id")
                    .table(TestCases::Table)
                    .col(TestCases::FolderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TestCaseSteps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestCaseSteps::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestCaseSteps::TestCaseId).integer().not_null())
                    .col(ColumnDef::new(TestCaseSteps::StepNumber).integer().not_null())
                    .col(ColumnDef::new(TestCaseSteps::Action).text().not_null())
                    .col(ColumnDef::new(TestCaseSteps::ExpectedResult).text())
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCaseSteps::Table, TestCaseSteps::TestCaseId)
                            .to(TestCases::Table, TestCases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_case_steps_test_case_id")
                    .table(TestCaseSteps::Table)
                    .col(TestCaseSteps::TestCaseId)
                    .col(TestCaseSteps::StepNumber)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestCaseSteps::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TestCases::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestCases {
    Table,
    Id,
    Title,
    Description,
    PreConditions,
    Priority,
    Status,
    IsAutomated,
    FolderId,
    AuthorId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum TestCaseSteps {
    Table,
    Id,
    TestCaseId,
    StepNumber,
    Action,
    ExpectedResult,
}
