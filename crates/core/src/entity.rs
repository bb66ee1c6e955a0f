//! Entities: records identified by a typed id rather than by their fields.

/// Payments, credit notes and the like: two records with equal fields are
/// still different if their ids differ.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> &Self::Id;

    /// Key this entity is stored under in a document store.
    fn store_key(&self) -> String {
        self.id().to_string()
    }
}
