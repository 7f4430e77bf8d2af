//! Create tags and test_case_tags tables.
//!
//! The unique index on tag name backs the insert-or-ignore find-or-create.

use sea_orm_migration::prelude::*;

use super::m20260301_000003_create_test_cases::TestCases;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tags::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tags::Name).string().not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TestCaseTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TestCaseTags::TestCaseId).integer().not_null())
                    .col(ColumnDef::new(TestCaseTags::TagId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(TestCaseTags::TestCaseId)
                            .col(TestCaseTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCaseTags::Table, TestCaseTags::TestCaseId)
                            .to(TestCases::Table, TestCases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCaseTags::Table, TestCaseTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestCaseTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Tags {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
pub enum TestCaseTags {
    Table,
    TestCaseId,
    TagId,
}
