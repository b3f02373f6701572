#![allow(dead_code)]

use axum::Router;
use axum::routing::get;
use chrono::{DateTime, Utc};
use listcrate::list_handler;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Set};
use sea_orm_migration::prelude::*;

pub mod order_entity;
pub mod product_entity;

/// Log to the test writer, filtered by `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Database with the product and order fixtures loaded.
pub async fn setup_seeded_db() -> Result<DatabaseConnection, DbErr> {
    let db = setup_test_db().await?;
    seed_labels(&db).await?;
    seed_products(&db).await?;
    seed_orders(&db).await?;
    Ok(db)
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    let api = Router::new()
        .route("/products", get(list_handler::<product_entity::Products>))
        .route("/orders", get(list_handler::<order_entity::Orders>))
        .with_state(db);

    Router::new().nest("/api/v1", api)
}

fn created_at(minute: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_704_067_200 + minute * 60, 0).unwrap_or_default()
}

/// Labels shared by products and orders: l1 Sale, l2 New, l3 Clearance, ol1 Priority.
pub async fn seed_labels(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut insert = Query::insert();
    insert
        .into_table(Labels::Table)
        .columns([Labels::Id, Labels::Name]);
    for (id, name) in [("l1", "Sale"), ("l2", "New"), ("l3", "Clearance"), ("ol1", "Priority")] {
        insert.values_panic([id.into(), name.into()]);
    }
    db.execute(db.get_database_backend().build(&insert)).await?;
    Ok(())
}

/// Fifteen products:
///
/// | id        | name             | code      | status   | price    | description                  |
/// |-----------|------------------|-----------|----------|----------|------------------------------|
/// | p01..p11  | Phone 1..11      | PH-01..11 | active   | i * 100  | smart phone black/white      |
/// | p12       | Charger          | PHONE-ACC | active   | 1200     | fast charger for phone       |
/// | p13       | Laptop Pro       | LP-01     | archived | 2500     | laptop with black keyboard   |
/// | p14       | Laptop Air       | LP-02     | active   | 1800     | light laptop                 |
/// | p15       | Desk Lamp        | DL-01     | archived | 50       | (null)                       |
///
/// Odd phones are black, even phones white. `created_at` increases with the id.
/// Only the charger (p12) and the laptop air (p14) are featured.
/// Labels: p01 -> l1, p02 -> l2, p03 -> l1 + l2, p13 -> l3.
pub async fn seed_products(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut products = Vec::new();
    for i in 1..=11 {
        let colour = if i % 2 == 1 { "black" } else { "white" };
        products.push(product(
            i,
            &format!("Phone {i}"),
            &format!("PH-{i:02}"),
            "active",
            <i32 as TryFrom<i64>>::try_from(i * 100).unwrap_or_default(),
            Some(&format!("smart phone {colour}")),
        ));
    }
    products.extend([
        product(12, "Charger", "PHONE-ACC", "active", 1200, Some("fast charger for phone")),
        product(13, "Laptop Pro", "LP-01", "archived", 2500, Some("laptop with black keyboard")),
        product(14, "Laptop Air", "LP-02", "active", 1800, Some("light laptop")),
        product(15, "Desk Lamp", "DL-01", "archived", 50, None),
    ]);

    product_entity::Entity::insert_many(products)
        .exec_without_returning(db)
        .await?;

    link(
        db,
        "products_labels",
        "product_id",
        &[("p01", "l1"), ("p02", "l2"), ("p03", "l1"), ("p03", "l2"), ("p13", "l3")],
    )
    .await
}

fn product(
    i: i64,
    name: &str,
    code: &str,
    status: &str,
    price: i32,
    description: Option<&str>,
) -> product_entity::ActiveModel {
    product_entity::ActiveModel {
        id: Set(format!("p{i:02}")),
        name: Set(name.to_string()),
        product_code: Set(code.to_string()),
        status: Set(status.to_string()),
        sell_price: Set(price),
        is_featured: Set(i == 12 || i == 14),
        description: Set(description.map(str::to_string)),
        created_at: Set(created_at(i)),
    }
}

/// Orders o1..o4: draft, completed, completed, canceled. o2 carries label ol1.
pub async fn seed_orders(db: &DatabaseConnection) -> Result<(), DbErr> {
    let orders = [
        ("o1", "Morning order", "ORD-001", "draft", 120),
        ("o2", "Office supplies", "ORD-002", "completed", 560),
        ("o3", "Phone repair", "ORD-003", "completed", 90),
        ("o4", "Returned lamp", "ORD-004", "canceled", 45),
    ]
    .into_iter()
    .enumerate()
    .map(|(minute, (id, name, code, status, amount))| order_entity::ActiveModel {
        id: Set(id.to_string()),
        name: Set(name.to_string()),
        order_code: Set(code.to_string()),
        status: Set(status.to_string()),
        amount_payable: Set(amount),
        created_at: Set(created_at(<i64 as TryFrom<usize>>::try_from(minute).unwrap_or_default())),
    });

    order_entity::Entity::insert_many(orders)
        .exec_without_returning(db)
        .await?;

    link(db, "orders_labels", "order_id", &[("o2", "ol1")]).await
}

async fn link(
    db: &DatabaseConnection,
    table: &str,
    local_key: &str,
    pairs: &[(&str, &str)],
) -> Result<(), DbErr> {
    let mut insert = Query::insert();
    insert
        .into_table(Alias::new(table))
        .columns([Alias::new(local_key), Alias::new("label_id")]);
    for (local, label) in pairs {
        insert.values_panic([(*local).into(), (*label).into()]);
    }
    db.execute(db.get_database_backend().build(&insert)).await?;
    Ok(())
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(CreateLabelTable),
            Box::new(CreateProductTables),
            Box::new(CreateOrderTables),
        ]
    }
}

pub struct CreateLabelTable;

impl MigrationName for CreateLabelTable {
    fn name(&self) -> &'static str {
        "m20240101_000000_create_label_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateLabelTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Labels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Labels::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Labels::Name).string().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Labels::Table).to_owned())
            .await
    }
}

pub struct CreateProductTables;

impl MigrationName for CreateProductTables {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_product_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateProductTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::ProductCode).string().not_null())
                    .col(ColumnDef::new(Products::Status).string().not_null())
                    .col(ColumnDef::new(Products::SellPrice).integer().not_null())
                    .col(ColumnDef::new(Products::IsFeatured).boolean().not_null())
                    .col(ColumnDef::new(Products::Description).text().null())
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductsLabels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProductsLabels::ProductId).string().not_null())
                    .col(ColumnDef::new(ProductsLabels::LabelId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(ProductsLabels::ProductId)
                            .col(ProductsLabels::LabelId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductsLabels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

pub struct CreateOrderTables;

impl MigrationName for CreateOrderTables {
    fn name(&self) -> &'static str {
        "m20240101_000002_create_order_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateOrderTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Orders::Name).string().not_null())
                    .col(ColumnDef::new(Orders::OrderCode).string().not_null())
                    .col(ColumnDef::new(Orders::Status).string().not_null())
                    .col(ColumnDef::new(Orders::AmountPayable).big_integer().not_null())
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrdersLabels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OrdersLabels::OrderId).string().not_null())
                    .col(ColumnDef::new(OrdersLabels::LabelId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(OrdersLabels::OrderId)
                            .col(OrdersLabels::LabelId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrdersLabels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Labels {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    ProductCode,
    Status,
    SellPrice,
    IsFeatured,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ProductsLabels {
    Table,
    ProductId,
    LabelId,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    Name,
    OrderCode,
    Status,
    AmountPayable,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OrdersLabels {
    Table,
    OrderId,
    LabelId,
}
