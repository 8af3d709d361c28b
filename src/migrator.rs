use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_catalog_tables::Migration),
            Box::new(m20240601_000002_create_parts_table::Migration),
            Box::new(m20240601_000003_create_stock_movements_table::Migration),
            Box::new(m20240601_000004_create_clients_and_vehicles_tables::Migration),
            Box::new(m20240601_000005_create_work_orders_table::Migration),
            Box::new(m20240601_000006_create_sequences_table::Migration),
        ]
    }
}

mod m20240601_000001_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PartTypes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(PartTypes::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(PartTypes::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(PartTypes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Suppliers::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Suppliers::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Suppliers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PartTypes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum PartTypes {
        Table,
        Id,
        Name,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Suppliers {
        Table,
        Id,
        Name,
        CreatedAt,
    }
}

mod m20240601_000002_create_parts_table {
    use super::m20240601_000001_create_catalog_tables::{PartTypes, Suppliers};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_parts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Parts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Parts::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Parts::Code).string().not_null().unique_key())
                        .col(ColumnDef::new(Parts::PartTypeId).uuid().not_null())
                        .col(ColumnDef::new(Parts::SupplierId).uuid().not_null())
                        .col(ColumnDef::new(Parts::Notes).text().not_null().default(""))
                        .col(
                            ColumnDef::new(Parts::StockQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Parts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Parts::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_parts_part_type_id")
                                .from(Parts::Table, Parts::PartTypeId)
                                .to(PartTypes::Table, PartTypes::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_parts_supplier_id")
                                .from(Parts::Table, Parts::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_parts_part_type_id")
                        .table(Parts::Table)
                        .col(Parts::PartTypeId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_parts_supplier_id")
                        .table(Parts::Table)
                        .col(Parts::SupplierId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Parts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Parts {
        Table,
        Id,
        Code,
        PartTypeId,
        SupplierId,
        Notes,
        StockQuantity,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000003_create_stock_movements_table {
    use super::m20240601_000002_create_parts_table::Parts;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_stock_movements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockMovements::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::PartId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockMovements::MovementType)
                                .string_len(8)
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(StockMovements::BalanceAfter)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_movements_part_id")
                                .from(StockMovements::Table, StockMovements::PartId)
                                .to(Parts::Table, Parts::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_movements_part_id_created_at")
                        .table(StockMovements::Table)
                        .col(StockMovements::PartId)
                        .col(StockMovements::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockMovements::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum StockMovements {
        Table,
        Id,
        PartId,
        MovementType,
        Quantity,
        BalanceAfter,
        CreatedAt,
    }
}

mod m20240601_000004_create_clients_and_vehicles_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_clients_and_vehicles_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Clients::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Clients::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Clients::Name).string().not_null())
                        .col(ColumnDef::new(Clients::Phone).string().not_null().unique_key())
                        .col(ColumnDef::new(Clients::Email).string().not_null().default(""))
                        .col(ColumnDef::new(Clients::Address).string().not_null().default(""))
                        .col(
                            ColumnDef::new(Clients::CompanyName)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Clients::TaxNumber)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Clients::Notes).text().not_null().default(""))
                        .col(
                            ColumnDef::new(Clients::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Clients::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Vehicles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Vehicles::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Vehicles::ClientId).uuid().not_null())
                        .col(ColumnDef::new(Vehicles::Make).string().not_null())
                        .col(ColumnDef::new(Vehicles::Model).string().not_null())
                        .col(ColumnDef::new(Vehicles::Year).integer().null())
                        .col(
                            ColumnDef::new(Vehicles::LicensePlate)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Vehicles::Vin).string().not_null().default(""))
                        .col(
                            ColumnDef::new(Vehicles::EngineCode)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Vehicles::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_vehicles_client_id")
                                .from(Vehicles::Table, Vehicles::ClientId)
                                .to(Clients::Table, Clients::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_vehicles_client_id")
                        .table(Vehicles::Table)
                        .col(Vehicles::ClientId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Vehicles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Clients::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Clients {
        Table,
        Id,
        Name,
        Phone,
        Email,
        Address,
        CompanyName,
        TaxNumber,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Vehicles {
        Table,
        Id,
        ClientId,
        Make,
        Model,
        Year,
        LicensePlate,
        Vin,
        EngineCode,
        CreatedAt,
    }
}

mod m20240601_000005_create_work_orders_table {
    use super::m20240601_000004_create_clients_and_vehicles_tables::{Clients, Vehicles};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000005_create_work_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let price = |column: WorkOrders| {
                ColumnDef::new(column)
                    .decimal_len(12, 2)
                    .not_null()
                    .default(0)
                    .to_owned()
            };
            let flag = |column: WorkOrders| {
                ColumnDef::new(column)
                    .boolean()
                    .not_null()
                    .default(false)
                    .to_owned()
            };

            manager
                .create_table(
                    Table::create()
                        .table(WorkOrders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(WorkOrders::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(WorkOrders::WorkNumber)
                                .string_len(32)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(WorkOrders::ClientId).uuid().not_null())
                        .col(ColumnDef::new(WorkOrders::VehicleId).uuid().null())
                        .col(ColumnDef::new(WorkOrders::TurboCode).string().not_null())
                        .col(ColumnDef::new(WorkOrders::ReceivedDate).date().not_null())
                        .col(ColumnDef::new(WorkOrders::Parts).json().not_null())
                        .col(flag(WorkOrders::StatusPassed))
                        .col(flag(WorkOrders::StatusRefused))
                        .col(price(WorkOrders::CleaningPrice))
                        .col(price(WorkOrders::ReconditioningPrice))
                        .col(price(WorkOrders::TurboPrice))
                        .col(
                            ColumnDef::new(WorkOrders::Status)
                                .string_len(32)
                                .not_null()
                                .default("RECEIVED"),
                        )
                        .col(flag(WorkOrders::QuoteSent))
                        .col(flag(WorkOrders::QuoteAccepted))
                        .col(ColumnDef::new(WorkOrders::EstimatedCompletion).date().null())
                        .col(flag(WorkOrders::Finalized))
                        .col(flag(WorkOrders::ClientNotified))
                        .col(
                            ColumnDef::new(WorkOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_work_orders_client_id")
                                .from(WorkOrders::Table, WorkOrders::ClientId)
                                .to(Clients::Table, Clients::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_work_orders_vehicle_id")
                                .from(WorkOrders::Table, WorkOrders::VehicleId)
                                .to(Vehicles::Table, Vehicles::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_work_orders_client_id")
                        .table(WorkOrders::Table)
                        .col(WorkOrders::ClientId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_work_orders_status")
                        .table(WorkOrders::Table)
                        .col(WorkOrders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_work_orders_created_at")
                        .table(WorkOrders::Table)
                        .col(WorkOrders::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WorkOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum WorkOrders {
        Table,
        Id,
        WorkNumber,
        ClientId,
        VehicleId,
        TurboCode,
        ReceivedDate,
        Parts,
        StatusPassed,
        StatusRefused,
        CleaningPrice,
        ReconditioningPrice,
        TurboPrice,
        Status,
        QuoteSent,
        QuoteAccepted,
        EstimatedCompletion,
        Finalized,
        ClientNotified,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000006_create_sequences_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000006_create_sequences_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // One row per named counter; the work-number row is seeded lazily
            manager
                .create_table(
                    Table::create()
                        .table(Sequences::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Sequences::Name)
                                .string_len(64)
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Sequences::Value).big_integer().not_null())
                        .col(
                            ColumnDef::new(Sequences::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Sequences::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Sequences {
        Table,
        Name,
        Value,
        UpdatedAt,
    }
}
