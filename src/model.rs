//! Persistence-layer contract used by binding.
//!
//! The dispatch core does not load or store records. It only needs to know
//! which fields of a value may be written from request data: for records
//! that is the field list the persistence layer describes, for plain values
//! it is every serialized field.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// One persisted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescription {
    pub name: String,
    pub primary_key: bool,
}

impl FieldDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
}

/// Field metadata of a record type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelDescription {
    fields: Vec<FieldDescription>,
}

impl ModelDescription {
    pub fn new(fields: impl IntoIterator<Item = FieldDescription>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn fields(&self) -> &[FieldDescription] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

/// A record type described by the persistence layer.
pub trait Model {
    fn description() -> ModelDescription;
}

/// A value the default binder can write request data onto.
///
/// Binding goes through the value's serde form, so state that does not
/// serialize (`#[serde(skip)]` fields) comes back as its `Default`. Types
/// carrying such state implement [`Bindable::restore`] to move it over from
/// the value as it was before binding.
pub trait Bindable: Serialize + DeserializeOwned + Send + 'static {
    /// Names of the fields request data may set. `None` means every field
    /// the value serializes.
    fn bindable_fields() -> Option<Vec<String>> {
        None
    }

    /// Take back non-serialized state from `original` after binding.
    fn restore(&mut self, original: Self) {
        let _ = original;
    }
}

/// `Bindable::bindable_fields` for record types.
pub fn model_fields<T: Model>() -> Option<Vec<String>> {
    Some(T::description().field_names())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Post;

    impl Model for Post {
        fn description() -> ModelDescription {
            ModelDescription::new([
                FieldDescription::new("id").primary_key(),
                FieldDescription::new("title"),
            ])
        }
    }

    #[test]
    fn test_model_fields() {
        assert_eq!(model_fields::<Post>(), Some(vec!["id".to_string(), "title".to_string()]));
        assert!(Post::description().fields()[0].primary_key);
    }
}
