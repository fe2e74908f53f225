//! Read side of the path engine.

use tracing::{debug, trace};

use pathguard_types::Path;

use crate::error::{Access, StoreError, StoreResult};
use crate::store::Store;
use crate::traversal::Traversal;
use crate::value::{Deferred, Value};

/// What the walk through one store's namespace ended on.
enum Step<'p> {
    /// The path was fully resolved inside this store.
    Done(Value),
    /// A nested store owns the remaining segments.
    Delegate(Store, &'p [String]),
    /// A producer must run before the walk can continue.
    Invoke {
        producer: Deferred,
        segment: &'p str,
        rest: &'p [String],
    },
}

/// Resolve `segments` against `store`.
///
/// Only the first segment is checked against `store`'s registry. Plain
/// structures below it are walked without further checks until a nested
/// store takes over, at which point the loop continues on that store.
pub(crate) fn read_segments(store: &Store, segments: &[String]) -> StoreResult<Value> {
    let mut traversal = Traversal::new(store.max_depth());
    let mut store = store.clone();
    let mut segments = segments;

    loop {
        let Some((head, tail)) = segments.split_first() else {
            return Ok(Value::Missing);
        };

        if !store.allowed_to_read(head) {
            debug!(field = %head, "read denied");
            return Err(StoreError::denied(head.as_str(), Access::Read));
        }

        let step = {
            let state = store.state();
            walk(state.fields.get(head.as_str()), head, tail, state.max_depth)?
        };

        let (nested, rest) = match step {
            Step::Done(value) => return Ok(value),
            Step::Delegate(nested, rest) => {
                trace!(path = %Path::join(rest), "read delegated to nested store");
                (nested, rest)
            }
            Step::Invoke {
                producer,
                segment,
                rest,
            } => {
                let produced = producer.invoke();
                if rest.is_empty() {
                    return Ok(produced);
                }
                match produced {
                    Value::Store(nested) => {
                        trace!(path = %Path::join(rest), "read delegated to produced store");
                        (nested, rest)
                    }
                    other => {
                        debug!(segment, kind = other.kind(), "deferred value is not a store");
                        return Err(StoreError::DeferredNotStore {
                            segment: segment.to_string(),
                        });
                    }
                }
            }
        };

        traversal.cross(head)?;
        store = nested;
        segments = rest;
    }
}

/// Walk plain structures starting at `node`, the value found at `segment`.
///
/// Stops at the end of the path, at a nested store or at a deferred value.
/// Borrowed values never escape: the caller releases the store before
/// delegating or invoking a producer.
fn walk<'p>(
    mut node: Option<&Value>,
    mut segment: &'p str,
    mut rest: &'p [String],
    max_depth: usize,
) -> StoreResult<Step<'p>> {
    let mut depth = 0;
    loop {
        match (node, rest.split_first()) {
            (Some(Value::Deferred(producer)), _) => {
                return Ok(Step::Invoke {
                    producer: producer.clone(),
                    segment,
                    rest,
                });
            }
            (Some(Value::Store(nested)), Some(_)) => {
                return Ok(Step::Delegate(nested.clone(), rest));
            }
            (_, None) => return Ok(Step::Done(node.cloned().unwrap_or_default())),
            (_, Some((next, remaining))) => {
                if depth >= max_depth {
                    debug!(limit = max_depth, segment, "read depth limit exceeded");
                    return Err(StoreError::DepthLimitExceeded { limit: max_depth });
                }
                depth += 1;
                node = node.and_then(|value| value.child(next));
                segment = next.as_str();
                rest = remaining;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use pathguard_types::AccessLevel;
    use serde_json::json;

    use super::*;

    /// Helper: a store with a nested plain structure and a hidden field.
    fn sample_store() -> Store {
        Store::builder()
            .permission("secret", AccessLevel::None)
            .field("name", "Ann")
            .field("secret", "hunter2")
            .field("address", Value::from(json!({"city": "Paris", "geo": {"lat": 48.8}})))
            .field("tags", Value::from(json!(["x", "y"])))
            .build()
    }

    #[test]
    fn reads_direct_field() {
        assert_eq!(sample_store().read("name").unwrap(), Value::from("Ann"));
    }

    #[test]
    fn denied_field_names_head() {
        let err = sample_store().read("secret").unwrap_err();
        assert!(matches!(
            err,
            StoreError::PermissionDenied { ref field, access: Access::Read } if field == "secret"
        ));
    }

    #[test]
    fn denied_head_blocks_nested_paths() {
        let err = sample_store().read("secret:anything:deeper").unwrap_err();
        assert!(err.is_permission_denied());
    }

    #[test]
    fn absent_field_is_missing() {
        let store = sample_store();
        assert!(store.read("nickname").unwrap().is_missing());
        assert!(store.read("nickname:first").unwrap().is_missing());
    }

    #[test]
    fn reads_nested_plain_values() {
        let store = sample_store();
        assert_eq!(store.read("address:city").unwrap(), Value::from("Paris"));
        assert_eq!(store.read("address:geo:lat").unwrap().as_f64(), Some(48.8));
        assert_eq!(store.read("tags:1").unwrap(), Value::from("y"));
        assert!(store.read("tags:7").unwrap().is_missing());
    }

    #[test]
    fn reading_through_a_scalar_is_missing() {
        assert!(sample_store().read("name:length").unwrap().is_missing());
    }

    #[test]
    fn whole_structure_is_returned() {
        let value = sample_store().read("address").unwrap();
        assert_eq!(value.to_json(), json!({"city": "Paris", "geo": {"lat": 48.8}}));
    }

    #[test]
    fn empty_segments_are_literal_names() {
        let store = sample_store();
        assert!(store.read("").unwrap().is_missing());
        assert!(store.read("address:").unwrap().is_missing());
        store.write("", "blank").unwrap();
        assert_eq!(store.read("").unwrap(), Value::from("blank"));
    }

    #[test]
    fn terminal_deferred_is_invoked() {
        let store = Store::builder()
            .field("compute", Value::deferred(|| Value::from(42i64)))
            .build();
        assert_eq!(store.read("compute").unwrap(), Value::from(42i64));
    }

    #[test]
    fn deferred_is_invoked_on_every_read() {
        let calls = Rc::new(Cell::new(0i64));
        let counter = calls.clone();
        let store = Store::builder()
            .field(
                "tick",
                Value::deferred(move || {
                    counter.set(counter.get() + 1);
                    Value::from(counter.get())
                }),
            )
            .build();
        assert_eq!(store.read("tick").unwrap(), Value::from(1i64));
        assert_eq!(store.read("tick").unwrap(), Value::from(2i64));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn nested_store_enforces_its_own_registry() {
        let inner = Store::builder()
            .default_policy(AccessLevel::Read)
            .permission("email", AccessLevel::None)
            .field("handle", "@ann")
            .field("email", "ann@example.com")
            .build();
        let outer = Store::builder().field("profile", inner).build();

        assert_eq!(outer.read("profile:handle").unwrap(), Value::from("@ann"));
        let err = outer.read("profile:email").unwrap_err();
        assert!(matches!(err, StoreError::PermissionDenied { ref field, .. } if field == "email"));
    }

    #[test]
    fn outer_denial_blocks_nested_store() {
        let inner = Store::builder().field("open", 1i64).build();
        let outer = Store::builder()
            .permission("vault", AccessLevel::None)
            .field("vault", inner)
            .build();
        let err = outer.read("vault:open").unwrap_err();
        assert!(matches!(err, StoreError::PermissionDenied { ref field, .. } if field == "vault"));
    }

    #[test]
    fn store_inside_plain_structure_is_a_boundary() {
        let inner = Store::builder()
            .permission("pin", AccessLevel::Write)
            .field("pin", "1234")
            .field("label", "card")
            .build();
        let mut wallet = crate::value::Fields::new();
        wallet.insert("card".into(), Value::Store(inner));
        let outer = Store::builder().field("wallet", Value::Object(wallet)).build();

        assert_eq!(outer.read("wallet:card:label").unwrap(), Value::from("card"));
        assert!(outer.read("wallet:card:pin").unwrap_err().is_permission_denied());
    }

    #[test]
    fn deferred_store_is_delegated_to() {
        let inner = Store::builder()
            .permission("hidden", AccessLevel::None)
            .field("shown", true)
            .build();
        let handle = inner.clone();
        let outer = Store::builder()
            .field("lazy", Value::deferred(move || Value::Store(handle.clone())))
            .build();

        assert_eq!(outer.read("lazy:shown").unwrap(), Value::from(true));
        assert!(outer.read("lazy:hidden").unwrap_err().is_permission_denied());
        assert!(outer.read("lazy").unwrap().as_store().unwrap().ptr_eq(&inner));
    }

    #[test]
    fn deferred_non_store_mid_path_fails() {
        let store = Store::builder()
            .field("lazy", Value::deferred(|| Value::from(json!({"a": 1}))))
            .build();
        let err = store.read("lazy:a").unwrap_err();
        assert!(matches!(err, StoreError::DeferredNotStore { ref segment } if segment == "lazy"));
    }

    #[test]
    fn depth_limit_bounds_plain_descent() {
        let store = Store::builder()
            .max_depth(3)
            .field("a", Value::from(json!({"b": {"c": {"d": {"e": 1}}}})))
            .build();
        assert!(store.read("a:b:c:d").unwrap().is_container());
        let err = store.read("a:b:c:d:e").unwrap_err();
        assert!(matches!(err, StoreError::DepthLimitExceeded { limit: 3 }));
    }

    #[test]
    fn depth_limit_applies_to_missing_paths() {
        let store = Store::builder().max_depth(2).build();
        assert!(store.read("x:y:z").unwrap().is_missing());
        assert!(matches!(
            store.read("x:y:z:w").unwrap_err(),
            StoreError::DepthLimitExceeded { .. }
        ));
    }

    #[test]
    fn store_boundary_resets_depth() {
        let inner = Store::builder()
            .max_depth(2)
            .field("p", Value::from(json!({"q": {"r": 5}})))
            .build();
        let outer = Store::builder()
            .max_depth(2)
            .field("o", Value::from(json!({"n": null})))
            .build();
        outer.write("o:n", inner).unwrap();
        assert_eq!(outer.read("o:n:p:q:r").unwrap(), Value::from(5i64));
    }

    #[test]
    fn self_referencing_store_terminates() {
        let store = Store::builder().field("name", "loop").build();
        store.write("me", store.clone()).unwrap();
        assert_eq!(store.read("me:me:me:name").unwrap(), Value::from("loop"));
    }

    #[test]
    fn store_cycle_longer_than_limit_is_refused() {
        let store = Store::builder().max_depth(10).field("name", "loop").build();
        store.write("me", store.clone()).unwrap();

        let within = "me:".repeat(10) + "name";
        assert_eq!(store.read(&within).unwrap(), Value::from("loop"));

        let beyond = "me:".repeat(11) + "name";
        let err = store.read(&beyond).unwrap_err();
        assert!(matches!(err, StoreError::DepthLimitExceeded { limit: 10 }));

        let long = "me:".repeat(5_000) + "name";
        let err = store.read(&long).unwrap_err();
        assert!(matches!(err, StoreError::DepthLimitExceeded { .. }));
    }

    #[test]
    fn deferred_cycle_longer_than_limit_is_refused() {
        let store = Store::builder().field("name", "loop").build();
        let handle = store.clone();
        store
            .write("again", Value::deferred(move || Value::Store(handle.clone())))
            .unwrap();
        assert_eq!(store.read("again:again:name").unwrap(), Value::from("loop"));

        let long = "again:".repeat(5_000) + "name";
        let err = store.read(&long).unwrap_err();
        assert!(matches!(
            err,
            StoreError::DepthLimitExceeded { limit: crate::DEFAULT_MAX_DEPTH }
        ));
    }
}
