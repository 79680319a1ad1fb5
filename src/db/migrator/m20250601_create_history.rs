use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(History::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(History::EngineId).string().not_null())
                    .col(ColumnDef::new(History::Query).string().not_null())
                    .col(ColumnDef::new(History::Time).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(History::EngineId)
                            .col(History::Query),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_history_time")
                    .table(History::Table)
                    .col(History::Time)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(History::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum History {
    Table,
    EngineId,
    Query,
    Time,
}
