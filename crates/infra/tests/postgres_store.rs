//! Engine contract against a live Postgres.
//!
//! Skipped unless `DATABASE_URL` points at a disposable database: the test
//! truncates the `inventory` and `product` tables.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use warehouse_core::{Deadline, ErrorKind};
use warehouse_infra::{InventoryFacade, PostgresInventoryStore};
use warehouse_inventory::NewArticle;
use warehouse_products::{NewComponent, NewProduct};

fn soon() -> Deadline {
    Deadline::after(Duration::from_secs(10))
}

async fn connect() -> Option<PostgresInventoryStore> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping postgres store tests");
        return None;
    };
    let pool = PgPoolOptions::new()
        .max_connections(16)
        .connect(&url)
        .await
        .expect("connect to DATABASE_URL");
    let store = PostgresInventoryStore::new(pool.clone());
    store.migrate().await.expect("apply schema");
    sqlx::query("TRUNCATE product, inventory")
        .execute(&pool)
        .await
        .expect("truncate tables");
    Some(store)
}

fn article(id: &str, name: &str, stock: u64) -> NewArticle {
    NewArticle {
        art_id: id.to_string(),
        name: name.to_string(),
        stock: stock.to_string(),
    }
}

fn product(name: &str, parts: &[(&str, u64)]) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        components: parts
            .iter()
            .map(|(id, q)| NewComponent {
                art_id: id.to_string(),
                amount_required: q.to_string(),
            })
            .collect(),
    }
}

// One test function: every step shares the same two tables.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn postgres_store_honours_the_engine_contract() {
    let Some(store) = connect().await else {
        return;
    };
    let facade = Arc::new(InventoryFacade::new(store));

    facade.ping(soon()).await.unwrap();

    // Products referencing unknown articles are rejected by the foreign key.
    let err = facade
        .upload_products(vec![product("Table", &[("A1", 4)])], soon())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PersistenceError);

    // A duplicate inside one batch rolls the whole batch back.
    let err = facade
        .upload_articles(vec![article("A1", "leg", 8), article("A1", "leg", 9)], soon())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PersistenceError);
    assert!(facade.list_articles(soon()).await.unwrap().is_empty());

    let inserted = facade
        .upload_articles(
            vec![article("A2", "top", 2), article("A1", "leg", 8), article("B1", "bulb", 5)],
            soon(),
        )
        .await
        .unwrap();
    assert_eq!(inserted, 3);
    let inserted = facade
        .upload_products(
            vec![product("Table", &[("A1", 4), ("A2", 1)]), product("Lamp", &[("B1", 1)])],
            soon(),
        )
        .await
        .unwrap();
    assert_eq!(inserted, 2);

    let ids: Vec<String> = facade
        .list_articles(soon())
        .await
        .unwrap()
        .iter()
        .map(|a| a.art_id().to_string())
        .collect();
    assert_eq!(ids, ["A1", "A2", "B1"]);

    let err = facade
        .upload_products(vec![product("Lamp", &[("A1", 1)])], soon())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PersistenceError);

    // Two tables are assemblable; hammer it and make sure only two sell.
    let attempts: Vec<_> = (0..12)
        .map(|_| {
            let facade = facade.clone();
            tokio::spawn(async move { facade.sell("Table", soon()).await })
        })
        .collect();
    let mut sold = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(()) => sold += 1,
            Err(err) => assert!(matches!(
                err.kind(),
                ErrorKind::OutOfStock | ErrorKind::Conflict
            )),
        }
    }
    assert_eq!(sold, 2);

    let stock: Vec<u64> = facade
        .list_articles(soon())
        .await
        .unwrap()
        .iter()
        .map(|a| a.stock())
        .collect();
    assert_eq!(stock, vec![0, 0, 5]);

    let err = facade.sell("Sofa", soon()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let listing = facade.list_available_products(soon()).await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].name.as_str(), "Lamp");
    assert_eq!(listing[0].available, 5);
}
