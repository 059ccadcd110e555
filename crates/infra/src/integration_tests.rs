//! Engine-level tests over the in-memory store.
//!
//! Verifies:
//! - The leg/top table scenario end to end
//! - Rejected uploads leave no trace
//! - No overselling under concurrent sales
//! - Sales of disjoint products do not wait on each other
//! - A timed-out sale leaves stock untouched

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use warehouse_core::{Deadline, ErrorKind};
    use warehouse_inventory::NewArticle;
    use warehouse_products::{NewComponent, NewProduct, ProductAvailability};

    use crate::facade::InventoryFacade;
    use crate::store::{InMemoryInventoryStore, InventoryStore, StockTransaction, TxMode};

    fn soon() -> Deadline {
        Deadline::after(Duration::from_secs(10))
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

    async fn setup(
        articles: Vec<NewArticle>,
        products: Vec<NewProduct>,
    ) -> (InMemoryInventoryStore, InventoryFacade<InMemoryInventoryStore>) {
        let store = InMemoryInventoryStore::new();
        let facade = InventoryFacade::new(store.clone());
        facade.upload_articles(articles, soon()).await.unwrap();
        facade.upload_products(products, soon()).await.unwrap();
        (store, facade)
    }

    async fn stock_levels(facade: &InventoryFacade<InMemoryInventoryStore>) -> Vec<(String, u64)> {
        facade
            .list_articles(soon())
            .await
            .unwrap()
            .into_iter()
            .map(|a| (a.art_id().to_string(), a.stock()))
            .collect()
    }

    async fn availability(facade: &InventoryFacade<InMemoryInventoryStore>, name: &str) -> u64 {
        facade
            .list_available_products(soon())
            .await
            .unwrap()
            .into_iter()
            .find(|p| p.name.as_str() == name)
            .map_or(0, |p| p.available)
    }

    #[tokio::test]
    async fn table_scenario_sells_until_out_of_stock() {
        let (_, facade) = setup(
            vec![article("A1", "leg", 8), article("A2", "top", 2)],
            vec![product("Table", &[("A1", 4), ("A2", 1)])],
        )
        .await;
        assert_eq!(availability(&facade, "Table").await, 2);

        facade.sell("Table", soon()).await.unwrap();
        assert_eq!(
            stock_levels(&facade).await,
            vec![("A1".to_string(), 4), ("A2".to_string(), 1)]
        );
        assert_eq!(availability(&facade, "Table").await, 1);

        facade.sell("Table", soon()).await.unwrap();
        assert_eq!(
            stock_levels(&facade).await,
            vec![("A1".to_string(), 0), ("A2".to_string(), 0)]
        );
        assert!(facade.list_available_products(soon()).await.unwrap().is_empty());

        let err = facade.sell("Table", soon()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfStock);
        assert_eq!(err.to_string(), "this product is not in stock, cannot be sold");
    }

    #[tokio::test]
    async fn sells_exactly_the_available_units() {
        let (_, facade) = setup(
            vec![article("1", "leg", 12), article("2", "screw", 17)],
            vec![product("Dining Chair", &[("1", 4), ("2", 8)])],
        )
        .await;
        // min(12/4, 17/8) = min(3, 2)
        assert_eq!(availability(&facade, "Dining Chair").await, 2);

        for _ in 0..2 {
            facade.sell("Dining Chair", soon()).await.unwrap();
        }
        let err = facade.sell("Dining Chair", soon()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfStock);
        assert_eq!(
            stock_levels(&facade).await,
            vec![("1".to_string(), 4), ("2".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn unknown_product_is_not_found_and_mutates_nothing() {
        let (_, facade) = setup(
            vec![article("A1", "leg", 8)],
            vec![product("Stool", &[("A1", 3)])],
        )
        .await;
        let err = facade.sell("Sofa", soon()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(stock_levels(&facade).await, vec![("A1".to_string(), 8)]);
    }

    #[tokio::test]
    async fn product_upload_before_articles_is_rejected() {
        let (_, facade) = setup(vec![], vec![]).await;
        let err = facade
            .upload_products(vec![product("Table", &[("A1", 4)])], soon())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceError);
        assert!(facade.list_available_products(soon()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn uploaded_articles_round_trip_in_order() {
        let (_, facade) = setup(
            vec![
                article("4", "shelf", 1),
                article("1", "leg", 12),
                article("3", "board", 0),
            ],
            vec![],
        )
        .await;
        let ids: Vec<String> = stock_levels(&facade).await.into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["1", "3", "4"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sales_never_oversell() {
        let (_, facade) = setup(
            vec![article("1", "leg", 40), article("2", "top", 7)],
            vec![
                product("Table", &[("1", 4), ("2", 1)]),
                product("Stool", &[("1", 3)]),
            ],
        )
        .await;
        let facade = Arc::new(facade);

        let mut handles = Vec::new();
        for i in 0..64 {
            let facade = facade.clone();
            let name = if i % 2 == 0 { "Table" } else { "Stool" };
            handles.push(tokio::spawn(async move {
                (name, facade.sell(name, soon()).await)
            }));
        }

        let mut tables = 0u64;
        let mut stools = 0u64;
        for handle in handles {
            let (name, result) = handle.await.unwrap();
            match result {
                Ok(()) if name == "Table" => tables += 1,
                Ok(()) => stools += 1,
                Err(err) => assert!(
                    matches!(err.kind(), ErrorKind::OutOfStock | ErrorKind::Conflict),
                    "unexpected failure: {err}"
                ),
            }
        }

        let levels = stock_levels(&facade).await;
        assert_eq!(levels[0], ("1".to_string(), 40 - 4 * tables - 3 * stools));
        assert_eq!(levels[1], ("2".to_string(), 7 - tables));
        assert!(tables <= 7);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn last_unit_is_sold_exactly_once() {
        let (_, facade) = setup(
            vec![article("A1", "leg", 4), article("A2", "top", 1)],
            vec![product("Table", &[("A1", 4), ("A2", 1)])],
        )
        .await;
        let facade = Arc::new(facade);

        let attempts: Vec<_> = (0..8)
            .map(|_| {
                let facade = facade.clone();
                tokio::spawn(async move { facade.sell("Table", soon()).await })
            })
            .collect();

        let mut sold = 0;
        for attempt in attempts {
            if attempt.await.unwrap().is_ok() {
                sold += 1;
            }
        }
        assert_eq!(sold, 1);
        assert_eq!(availability(&facade, "Table").await, 0);
    }

    #[tokio::test]
    async fn disjoint_sales_do_not_block_each_other() {
        let (store, facade) = setup(
            vec![article("1", "leg", 8), article("2", "lamp", 3)],
            vec![product("Table", &[("1", 4)]), product("Lamp", &[("2", 1)])],
        )
        .await;

        // Hold the leg row as an in-flight sale would.
        let mut tx = store.begin(TxMode::ReadWrite).await.unwrap();
        let legs = [warehouse_core::ArticleId::new("1").unwrap()];
        tx.read_stock(&legs).await.unwrap();

        let lamp = tokio::time::timeout(Duration::from_secs(1), facade.sell("Lamp", soon())).await;
        assert!(matches!(lamp, Ok(Ok(()))));

        let table =
            tokio::time::timeout(Duration::from_millis(50), facade.sell("Table", soon())).await;
        assert!(table.is_err(), "sale sharing a locked row must wait");

        drop(tx);
        facade.sell("Table", soon()).await.unwrap();
    }

    #[tokio::test]
    async fn timed_out_sale_leaves_stock_untouched() {
        let (store, facade) = setup(
            vec![article("A1", "leg", 8), article("A2", "top", 2)],
            vec![product("Table", &[("A1", 4), ("A2", 1)])],
        )
        .await;

        let mut blocker = store.begin(TxMode::ReadWrite).await.unwrap();
        let top = [warehouse_core::ArticleId::new("A2").unwrap()];
        blocker.read_stock(&top).await.unwrap();

        let err = facade
            .sell("Table", Deadline::after(Duration::from_millis(30)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);

        drop(blocker);
        assert_eq!(
            stock_levels(&facade).await,
            vec![("A1".to_string(), 8), ("A2".to_string(), 2)]
        );
        assert_eq!(
            facade.list_available_products(soon()).await.unwrap(),
            vec![ProductAvailability {
                name: warehouse_core::ProductName::new("Table").unwrap(),
                available: 2,
            }]
        );
    }
}
