//! Default model binder.
//!
//! Writes request data onto the fields of a value, in increasing precedence:
//! routed parameters, then the query string, then posted data. Only fields in
//! the value's bindable field set are touched; every other field keeps the
//! value it was constructed with.
//!
//! The value travels through its serde form: serialized to a JSON object,
//! patched, deserialized back, then handed the original to restore state
//! that does not serialize. Incoming strings are coerced by the JSON type
//! the field currently holds; a `null` field takes the first reading
//! (number, boolean, string) the target type accepts.

use serde_json::{Number, Value};

use crate::binding::registry::{BindContext, BindError, BindTarget, ModelBinder};
use crate::container::Instance;
use crate::model::Bindable;
use crate::routing::{ParamValue, Parameters};

/// Writes parameter sources onto a type-erased `Bindable` instance.
pub type Overlay = fn(Instance, &[&Parameters]) -> Result<Instance, BindError>;

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultModelBinder;

impl ModelBinder for DefaultModelBinder {
    fn bind(
        &self,
        target: BindTarget<'_>,
        parameter: &str,
        context: &BindContext<'_>,
    ) -> Result<Instance, BindError> {
        let Some(overlay) = target.ty.overlay() else {
            // No bindable fields: the instance is the argument.
            return Ok(target.instance);
        };

        tracing::trace!(
            parameter,
            ty = target.ty.name(),
            "Binding request data onto model"
        );
        overlay(
            target.instance,
            &[
                context.spec.parameters(),
                context.request.query(),
                context.request.form(),
            ],
        )
    }
}

/// Overlay `sources` onto a boxed `T`.
pub fn overlay<T: Bindable>(instance: Instance, sources: &[&Parameters]) -> Result<Instance, BindError> {
    let value = instance
        .downcast::<T>()
        .map_err(|_| BindError::NotBindable {
            type_name: std::any::type_name::<T>(),
        })?;
    Ok(Box::new(overlay_value(*value, sources)?))
}

/// Overlay `sources` onto `value`, later sources winning.
pub fn overlay_value<T: Bindable>(value: T, sources: &[&Parameters]) -> Result<T, BindError> {
    let Value::Object(mut fields) = serde_json::to_value(&value)? else {
        return Err(BindError::NotBindable {
            type_name: std::any::type_name::<T>(),
        });
    };
    let bindable = T::bindable_fields()
        .unwrap_or_else(|| fields.keys().cloned().collect());

    // Fields holding `null` (typically `Option`s) give no type to coerce by.
    let mut untyped = Parameters::new();
    let mut touched = false;
    for source in sources {
        for (key, incoming) in source.iter() {
            if !bindable.iter().any(|field| field == key) {
                continue;
            }
            touched = true;
            match fields.get(key) {
                None | Some(Value::Null) => {
                    untyped.insert(key.clone(), incoming.clone());
                }
                current => {
                    let coerced = coerce(key, incoming, current)?;
                    fields.insert(key.clone(), coerced);
                    untyped.remove(key);
                }
            }
        }
    }

    for (key, incoming) in &untyped {
        let chosen = candidates(incoming).into_iter().find(|candidate| {
            let mut trial = fields.clone();
            trial.insert(key.clone(), candidate.clone());
            serde_json::from_value::<T>(Value::Object(trial)).is_ok()
        });
        let chosen = chosen.ok_or_else(|| BindError::InvalidValue {
            field: key.clone(),
            value: incoming.to_string(),
            expected: "a value of the field's type",
        })?;
        fields.insert(key.clone(), chosen);
    }

    if !touched {
        return Ok(value);
    }
    let mut bound: T = serde_json::from_value(Value::Object(fields))?;
    bound.restore(value);
    Ok(bound)
}

fn coerce(field: &str, incoming: &ParamValue, current: Option<&Value>) -> Result<Value, BindError> {
    let invalid = |expected: &'static str| BindError::InvalidValue {
        field: field.to_string(),
        value: incoming.to_string(),
        expected,
    };

    match (current, incoming) {
        (Some(Value::Number(n)), ParamValue::Str(raw)) => {
            let raw = raw.trim();
            let number = if n.is_f64() {
                parse_float(raw)
            } else {
                parse_number(raw)
            };
            number.ok_or_else(|| invalid("a number"))
        }
        (Some(Value::Number(_)), ParamValue::List(_)) => Err(invalid("a number")),
        (Some(Value::Bool(_)), ParamValue::Str(raw)) => {
            parse_bool(raw).ok_or_else(|| invalid("a boolean"))
        }
        (Some(Value::Bool(_)), ParamValue::List(_)) => Err(invalid("a boolean")),
        (Some(Value::Array(_)), ParamValue::Str(raw)) => Ok(strings([raw.clone()])),
        (_, ParamValue::List(items)) => Ok(strings(items.iter().cloned())),
        (_, ParamValue::Str(raw)) => Ok(Value::String(raw.clone())),
    }
}

/// Readings of a value for a field of unknown type, most specific first.
fn candidates(incoming: &ParamValue) -> Vec<Value> {
    match incoming {
        ParamValue::Str(raw) => {
            let trimmed = raw.trim();
            let mut values: Vec<Value> = [parse_number(trimmed), parse_bool(trimmed)]
                .into_iter()
                .flatten()
                .collect();
            values.push(Value::String(raw.clone()));
            if trimmed.is_empty() {
                values.push(Value::Null);
            }
            values
        }
        ParamValue::List(items) => vec![strings(items.iter().cloned())],
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    raw.parse::<i64>()
        .map(Number::from)
        .ok()
        .or_else(|| raw.parse::<u64>().map(Number::from).ok())
        .map(Value::Number)
        .or_else(|| parse_float(raw))
}

fn parse_float(raw: &str) -> Option<Value> {
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn parse_bool(raw: &str) -> Option<Value> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(Value::Bool(true)),
        "false" | "0" | "off" | "no" | "" => Some(Value::Bool(false)),
        _ => None,
    }
}

fn strings(items: impl IntoIterator<Item = String>) -> Value {
    Value::Array(items.into_iter().map(Value::String).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::defaults;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Post {
        id: u64,
        title: String,
        body: String,
        published: bool,
        rating: f64,
        tags: Vec<String>,
    }

    impl Bindable for Post {}

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Account {
        name: String,
        role: String,
    }

    impl Bindable for Account {
        fn bindable_fields() -> Option<Vec<String>> {
            Some(vec!["name".to_string()])
        }
    }

    #[test]
    fn test_later_sources_win() {
        let route = defaults([("controller", "posts"), ("id", "1"), ("title", "from route")]);
        let query = defaults([("title", "from query"), ("body", "query body")]);
        let form = defaults([("title", "from form")]);

        let post = overlay_value(Post::default(), &[&route, &query, &form]).unwrap();
        assert_eq!(post.id, 1);
        assert_eq!(post.title, "from form");
        assert_eq!(post.body, "query body");
    }

    #[test]
    fn test_absent_fields_keep_their_value() {
        let post = Post {
            title: "kept".into(),
            rating: 2.5,
            ..Post::default()
        };
        let form = defaults([("body", "new")]);
        let post = overlay_value(post, &[&form]).unwrap();
        assert_eq!(post.title, "kept");
        assert_eq!(post.rating, 2.5);
        assert_eq!(post.body, "new");
    }

    #[test]
    fn test_coercion_by_field_type() {
        let mut form = defaults([("published", "on"), ("rating", "4.5"), ("id", "9")]);
        form.insert("tags".into(), ParamValue::List(vec!["a".into(), "b".into()]));

        let post = overlay_value(Post::default(), &[&form]).unwrap();
        assert!(post.published);
        assert_eq!(post.rating, 4.5);
        assert_eq!(post.id, 9);
        assert_eq!(post.tags, vec!["a", "b"]);

        let single = overlay_value(Post::default(), &[&defaults([("tags", "solo")])]).unwrap();
        assert_eq!(single.tags, vec!["solo"]);
    }

    #[test]
    fn test_invalid_number() {
        let err = overlay_value(Post::default(), &[&defaults([("id", "abc")])]).unwrap_err();
        assert!(matches!(err, BindError::InvalidValue { ref field, .. } if field == "id"));
    }

    #[test]
    fn test_declared_field_set_limits_binding() {
        let form = defaults([("name", "ada"), ("role", "admin")]);
        let account = overlay_value(Account::default(), &[&form]).unwrap();
        assert_eq!(account.name, "ada");
        assert_eq!(account.role, "");
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Draft {
        id: Option<u64>,
        pinned: Option<bool>,
        note: Option<String>,
        title: String,
        #[serde(skip)]
        owner: String,
    }

    impl Bindable for Draft {
        fn restore(&mut self, original: Self) {
            self.owner = original.owner;
        }
    }

    #[test]
    fn test_optional_fields_take_the_accepted_reading() {
        let form = defaults([("id", "5"), ("pinned", "on"), ("note", "12"), ("title", "t")]);
        let draft = overlay_value(Draft::default(), &[&form]).unwrap();
        assert_eq!(draft.id, Some(5));
        assert_eq!(draft.pinned, Some(true));
        assert_eq!(draft.note.as_deref(), Some("12"));

        let cleared = overlay_value(
            Draft { id: Some(3), ..Draft::default() },
            &[&defaults([("id", "")])],
        );
        assert!(matches!(cleared, Err(BindError::InvalidValue { ref field, .. }) if field == "id"));

        let empty = overlay_value(Draft::default(), &[&defaults([("id", "")])]).unwrap();
        assert_eq!(empty.id, None);

        let err = overlay_value(Draft::default(), &[&defaults([("id", "five")])]).unwrap_err();
        assert!(matches!(err, BindError::InvalidValue { ref field, .. } if field == "id"));
    }

    #[test]
    fn test_unserialized_state_survives_binding() {
        let draft = Draft {
            title: "a".into(),
            owner: "alice".into(),
            ..Draft::default()
        };
        let draft = overlay_value(draft, &[&defaults([("title", "b"), ("owner", "mallory")])]).unwrap();
        assert_eq!(draft.title, "b");
        assert_eq!(draft.owner, "alice");
    }

    #[test]
    fn test_type_erased_overlay() {
        let bound = overlay::<Account>(Box::new(Account::default()), &[&defaults([("name", "x")])]).unwrap();
        assert_eq!(bound.downcast_ref::<Account>().unwrap().name, "x");

        let err = overlay::<Account>(Box::new(5_u8), &[]).unwrap_err();
        assert!(matches!(err, BindError::NotBindable { .. }));
    }
}
