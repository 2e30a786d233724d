use chrono::Utc;
use uuid::Uuid;

/// Identity and timestamps of a stored record.
///
/// Timestamps are Unix milliseconds. The block is persisted inline with the
/// record; on read the key's id wins over whatever id was encoded.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Metadata {
    #[prost(string, optional, tag = "1")]
    pub id: Option<String>,

    #[prost(int64, optional, tag = "2")]
    pub created: Option<i64>,

    #[prost(int64, optional, tag = "3")]
    pub updated: Option<i64>,
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Fresh identity: a random 128-bit id (122 bits of entropy, hex) and
/// `created == updated == now`.
pub fn new_metadata() -> Metadata {
    let now = now_millis();
    Metadata {
        id: Some(Uuid::new_v4().simple().to_string()),
        created: Some(now),
        updated: Some(now),
    }
}

/// Moves `updated` to now. Never goes backwards and always advances at least
/// one millisecond, so two touches within the same tick stay ordered.
pub fn touch_updated(metadata: &mut Metadata) {
    let now = now_millis();
    metadata.updated = Some(match metadata.updated {
        Some(previous) if previous >= now => previous + 1,
        _ => now,
    });
}

pub fn is_persisted(metadata: &Metadata) -> bool {
    metadata.id.is_some() && metadata.created.is_some() && metadata.updated.is_some()
}
