//! The identity contract shared by every stored entity

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use uuid::Uuid;

/// A record type that can be stored in an item collection.
///
/// The only structural requirement is a unique identifier. The identifier
/// must be serialized under [`Entity::ID_FIELD`], which for MongoDB means
/// renaming the field to `_id`:
///
/// ```rust
/// use play_db::Entity;
/// use serde::{Deserialize, Serialize};
/// use uuid::Uuid;
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// struct CatalogItem {
///     #[serde(rename = "_id")]
///     id: Uuid,
///     name: String,
///     price: f64,
/// }
///
/// impl Entity for CatalogItem {
///     fn id(&self) -> Uuid {
///         self.id
///     }
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned + Clone + Debug + Unpin + Send + Sync + 'static {
    /// Document field holding the identifier
    const ID_FIELD: &'static str = "_id";

    /// The entity's unique identifier
    fn id(&self) -> Uuid;
}

/// Rejects the nil identifier, which is never a valid key.
pub(crate) fn require_id(id: Uuid, argument: &'static str) -> Result<Uuid, crate::DbError> {
    if id.is_nil() {
        return Err(crate::DbError::InvalidArgument(argument));
    }
    Ok(id)
}
