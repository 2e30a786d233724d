#![allow(dead_code)]

use kv_model::{Datastore, MemoryAdapter, Metadata};

#[derive(Clone, PartialEq, ::prost::Message, kv_model::Model)]
#[model(collection = "planets")]
pub struct Planet {
    #[meta]
    #[prost(message, optional, tag = "1")]
    pub meta: Option<Metadata>,

    #[prost(string, tag = "2")]
    pub name: String,

    #[prost(uint32, tag = "3")]
    pub index: u32,

    #[prost(uint32, tag = "4")]
    pub moons: u32,
}

pub type Store = Datastore<Planet, MemoryAdapter>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn planet(name: &str, index: u32) -> Planet {
    Planet {
        meta: None,
        name: name.to_string(),
        index,
        moons: 0,
    }
}

pub async fn store() -> Store {
    init_logger();
    Datastore::open(MemoryAdapter::new())
        .await
        .expect("memory adapter opens")
}

/// Pushes planets named `p0..p{n-1}` with `index` 0..n in one batch.
pub async fn seed(store: &Store, n: u32) -> Vec<Planet> {
    store
        .push_batched()
        .items((0..n).map(|i| planet(&format!("p{}", i), i)))
        .run()
        .await
        .expect("seed batch")
}

pub fn indexes(planets: &[Planet]) -> Vec<u32> {
    planets.iter().map(|p| p.index).collect()
}
