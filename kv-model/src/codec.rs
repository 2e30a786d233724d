//! Stored value layout: one schema-version byte followed by the prost
//! encoding of the whole record, metadata block included.

use prost::Message;

use crate::{Error, Model};

pub const RECORD_VERSION: u8 = 1;

pub fn encode_record<T: Model>(item: &T) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::with_capacity(1 + item.encoded_len());
    buf.push(RECORD_VERSION);
    item.encode(&mut buf).map_err(Error::SerializationError)?;
    Ok(buf)
}

/// Decodes a stored value and stamps the key's id into the metadata.
pub fn decode_record<T: Model>(id: &str, bytes: &[u8]) -> Result<T, Error> {
    let Some((&version, body)) = bytes.split_first() else {
        return Err(Error::CorruptRecord(format!("empty value for {}", id)));
    };
    if version != RECORD_VERSION {
        return Err(Error::UnsupportedRecordVersion(version));
    }
    let mut item = T::decode(body).map_err(Error::DeserializationError)?;
    item.metadata_mut().id = Some(id.to_string());
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Metadata, new_metadata};

    #[derive(Clone, PartialEq, ::prost::Message, crate::Model)]
    #[model(collection = "notes")]
    struct Note {
        #[meta]
        #[prost(message, optional, tag = "1")]
        meta: Option<Metadata>,

        #[prost(string, tag = "2")]
        text: String,
    }

    #[test]
    fn metadata_is_stored_inline() {
        let note = Note {
            meta: Some(new_metadata()),
            text: "hello".to_string(),
        };
        let bytes = encode_record(&note).unwrap();
        assert_eq!(bytes[0], RECORD_VERSION);

        let id = note.id().unwrap().to_string();
        let decoded: Note = decode_record(&id, &bytes).unwrap();
        assert_eq!(decoded, note);
    }

    #[test]
    fn key_id_wins_over_encoded_id() {
        let note = Note {
            meta: Some(new_metadata()),
            text: "hello".to_string(),
        };
        let bytes = encode_record(&note).unwrap();
        let decoded: Note = decode_record("other", &bytes).unwrap();
        assert_eq!(decoded.id(), Some("other"));
        assert_eq!(decoded.meta.unwrap().created, note.meta.unwrap().created);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut bytes = encode_record(&Note::default()).unwrap();
        bytes[0] = 9;
        assert!(matches!(
            decode_record::<Note>("x", &bytes),
            Err(Error::UnsupportedRecordVersion(9))
        ));
        assert!(matches!(
            decode_record::<Note>("x", &[]),
            Err(Error::CorruptRecord(_))
        ));
    }
}
