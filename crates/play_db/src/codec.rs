//! BSON encoding shared by the filter builder and the in-memory collection.
//!
//! Values go through the same binary serializer the MongoDB driver uses for
//! inserts, so a `Uuid` in a filter encodes exactly like the `Uuid` stored in
//! the document.

use crate::error::DbError;
use mongodb::bson::{self, Bson, Document};
use serde::Serialize;

/// Encode a serializable value as a BSON document.
pub(crate) fn to_document<S: Serialize>(value: &S) -> Result<Document, DbError> {
    let bytes = bson::to_vec(value)?;
    Ok(Document::from_reader(bytes.as_slice())?)
}

/// Encode a single serializable value as a BSON value.
pub(crate) fn to_value<S: Serialize>(value: &S) -> Result<Bson, DbError> {
    #[derive(Serialize)]
    struct Wrapped<'a, S> {
        v: &'a S,
    }

    let mut document = to_document(&Wrapped { v: value })?;
    document
        .remove("v")
        .ok_or_else(|| DbError::CollectionError("value did not encode to BSON".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_uuid_encodes_like_a_document_field() {
        #[derive(Serialize)]
        struct Holder {
            #[serde(rename = "_id")]
            id: Uuid,
        }

        let id = Uuid::new_v4();
        let document = to_document(&Holder { id }).expect("document");
        let value = to_value(&id).expect("value");

        assert_eq!(document.get("_id"), Some(&value));
    }

    #[test]
    fn test_scalars_keep_their_bson_type() {
        assert_eq!(to_value(&42i32).expect("i32"), Bson::Int32(42));
        assert_eq!(to_value(&"x").expect("str"), Bson::String("x".to_string()));
        assert_eq!(to_value(&true).expect("bool"), Bson::Boolean(true));
    }
}
