mod common;

use common::{planet, seed, store};
use kv_model::{Error, Model};

#[tokio::test]
async fn batched_push_then_batched_delete() {
    let store = store().await;
    let pushed = seed(&store, 5).await;
    assert_eq!(store.get().count().await.unwrap(), 5);
    assert!(pushed.iter().all(|p| p.is_persisted()));

    let removed = store
        .delete_batched()
        .ids(pushed.iter().filter_map(|p| p.id()))
        .run()
        .await
        .unwrap();
    assert_eq!(removed.len(), 5);
    assert_eq!(store.get().count().await.unwrap(), 0);
}

#[tokio::test]
async fn ids_are_assigned_when_items_are_added() {
    let store = store().await;
    let batch = store
        .push_batched()
        .item(planet("a", 0))
        .item(planet("b", 1));

    let ids: Vec<String> = batch.ids().into_iter().map(str::to_string).collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    assert_eq!(store.get().count().await.unwrap(), 0);

    let pushed = batch.run().await.unwrap();
    let pushed_ids: Vec<&str> = pushed.iter().filter_map(|p| p.id()).collect();
    assert_eq!(pushed_ids, ids);

    // running again overwrites the same ids
    batch.run().await.unwrap();
    assert_eq!(store.get().count().await.unwrap(), 2);
}

#[tokio::test]
async fn batched_delete_skips_missing_ids() {
    let store = store().await;
    let pushed = seed(&store, 3).await;

    let removed = store
        .delete_batched()
        .item(&pushed[0])
        .id("missing")
        .item(&pushed[2])
        .item(&pushed[0])
        .run()
        .await
        .unwrap();
    assert_eq!(
        removed.iter().map(|p| p.index).collect::<Vec<_>>(),
        vec![0, 2]
    );
    assert_eq!(store.get().count().await.unwrap(), 1);
}

#[tokio::test]
async fn batched_delete_rejects_unpersisted_items() {
    let store = store().await;
    let pushed = seed(&store, 2).await;

    let result = store
        .delete_batched()
        .items(&pushed)
        .item(&planet("ghost", 9))
        .run()
        .await;
    assert!(matches!(result, Err(Error::UnpersistedItem)));
    assert_eq!(store.get().count().await.unwrap(), 2);
}

#[tokio::test]
async fn empty_batches_are_no_ops() {
    let store = store().await;
    assert!(store.push_batched().run().await.unwrap().is_empty());
    assert!(store.delete_batched().run().await.unwrap().is_empty());
    assert!(store.push_items(Vec::new()).await.unwrap().is_empty());
}
