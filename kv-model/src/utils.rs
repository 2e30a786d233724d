use crate::Error;

/// Smallest key strictly greater than `key`; resumes a paged scan after the
/// last key of a page.
#[cfg_attr(not(feature = "tikv"), allow(dead_code))]
pub(crate) fn key_successor(key: &[u8]) -> Vec<u8> {
    let mut next = Vec::with_capacity(key.len() + 1);
    next.extend_from_slice(key);
    next.push(0);
    next
}

/// Exclusive upper bound of all keys starting with `prefix`.
#[cfg_attr(not(feature = "tikv"), allow(dead_code))]
pub(crate) fn prefix_end(prefix: &[u8]) -> Vec<u8> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < 0xff {
            end.push(last + 1);
            return end;
        }
    }
    end
}

pub(crate) fn document_prefix(collection: &str) -> String {
    format!("document/{}/", collection)
}

pub(crate) fn document_path(collection: &str, id: &str) -> String {
    format!("document/{}/{}", collection, id)
}

// id 只能占键路径的一段
pub(crate) fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && !id.contains('/')
}

pub(crate) fn key_to_string(key: Vec<u8>) -> Result<String, Error> {
    String::from_utf8(key).map_err(Error::InvalidUtf8)
}

pub(crate) fn id_from_key(prefix: &str, key: Vec<u8>) -> Result<String, Error> {
    let key = key_to_string(key)?;
    match key.strip_prefix(prefix) {
        Some(id) => Ok(id.to_string()),
        None => Err(Error::CorruptRecord(format!(
            "key {} outside of {}",
            key, prefix
        ))),
    }
}
