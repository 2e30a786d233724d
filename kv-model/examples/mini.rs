use kv_model::{Datastore, Error, FilterExpr, MemoryAdapter, Metadata, Model, Sort};

#[derive(kv_model::Model, Clone, PartialEq, ::prost::Message)]
pub struct UserInfo {
    #[meta]
    #[prost(message, optional, tag = "1")]
    pub meta: Option<Metadata>,

    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,

    #[prost(int32, tag = "3")]
    pub age: i32,

    #[prost(string, tag = "4")]
    pub email: ::prost::alloc::string::String,
}

fn user(name: &str, age: i32) -> UserInfo {
    UserInfo {
        meta: None,
        name: name.to_string(),
        age,
        email: format!("{}@example.com", name.to_lowercase()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let db = Datastore::<UserInfo, _>::open(MemoryAdapter::new()).await?;
    db.on_push(|u| println!("pushed {} ({:?})", u.name, u.id()));

    let alice = db.push().item(user("Alice", 25)).run().await?;
    db.push_batched()
        .item(user("Bob", 31))
        .item(user("Carol", 25))
        .run()
        .await?;

    let a = db.get().filter(|u| u.name == "Alice").one().await?;
    println!("{:?}", a);

    let by_age = db
        .get()
        .matching(FilterExpr::lte("age", 30))
        .sort(Sort::new().desc("age").asc("name"))
        .run()
        .await?;
    println!("{:?}", by_age.iter().map(|u| &u.name).collect::<Vec<_>>());

    let older = db
        .edit()
        .item(&alice)
        .with(UserInfoPatch::new().age(26))
        .run()
        .await?;
    println!("{} is now {}", older.name, older.age);

    db.delete().item(&older).run().await?;
    println!("{} users left", db.get().count().await?);

    db.close().await?;
    Ok(())
}
