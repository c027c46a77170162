//! Document and collection paths.
//!
//! Layout: `users/{uid}`, `users/{uid}/children/{childId}`,
//! `users/{uid}/children/{childId}/kafalas/{kafalaId}`.

use std::fmt;

pub const USERS: &str = "users";
pub const CHILDREN: &str = "children";
pub const KAFALAS: &str = "kafalas";

/// Path of a collection, e.g. `users/u1/children`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath {
    segments: Vec<String>,
}

/// Path of a single document, e.g. `users/u1/children/c1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: String,
}

impl CollectionPath {
    /// A top-level collection
    pub fn root(name: &str) -> Self {
        Self {
            segments: vec![name.to_string()],
        }
    }

    pub fn users() -> Self {
        Self::root(USERS)
    }

    pub fn children(uid: &str) -> Self {
        DocumentPath::user(uid).collection_under(CHILDREN)
    }

    pub fn kafalas(uid: &str, child_id: &str) -> Self {
        DocumentPath::child(uid, child_id).collection_under(KAFALAS)
    }

    pub fn document(&self, id: &str) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            id: id.to_string(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl DocumentPath {
    pub fn user(uid: &str) -> Self {
        CollectionPath::users().document(uid)
    }

    pub fn child(uid: &str, child_id: &str) -> Self {
        CollectionPath::children(uid).document(child_id)
    }

    pub fn kafala(uid: &str, child_id: &str, kafala_id: &str) -> Self {
        CollectionPath::kafalas(uid, child_id).document(kafala_id)
    }

    /// A sub-collection owned by this document
    pub fn collection_under(&self, name: &str) -> CollectionPath {
        let mut segments = self.collection.segments.clone();
        segments.push(self.id.clone());
        segments.push(name.to_string());
        CollectionPath { segments }
    }

    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}
