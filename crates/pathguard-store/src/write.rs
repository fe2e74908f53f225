//! Write side of the path engine.
//!
//! A write is planned against an immutable view of the store first and
//! applied with a single assignment afterwards, so a refused or failing
//! write never leaves placeholder objects behind.

use tracing::{debug, trace};

use pathguard_types::Path;

use crate::error::{Access, StoreError, StoreResult};
use crate::store::Store;
use crate::traversal::Traversal;
use crate::value::{Deferred, Fields, Value};

enum Plan<'p> {
    /// Every segment before `parent` resolved to a plain container; set the
    /// last segment on it.
    Assign { parent: usize },
    /// Nothing exists at segment `from`; build the rest of the path there.
    Materialize { from: usize },
    /// The nested store at the named segment owns the remaining segments.
    Delegate(Store, &'p str, &'p [String]),
    /// A producer must run before the walk can continue.
    Invoke {
        producer: Deferred,
        segment: &'p str,
        rest: &'p [String],
    },
}

/// Container that receives the final assignment.
enum Target<'a> {
    Root(&'a mut Fields),
    Node(&'a mut Value),
}

impl Target<'_> {
    fn set(self, segment: &str, value: Value) -> StoreResult<()> {
        match self {
            Self::Root(fields) => {
                fields.insert(segment.to_string(), value);
                Ok(())
            }
            Self::Node(node) => node.set_child(segment, value),
        }
    }
}

/// Write `value` at `segments` below `store`.
///
/// The terminal segment is checked with the owning store's
/// `allowed_to_write`, however many plain levels deep it sits. Crossing into
/// a nested store continues the write on that store.
pub(crate) fn write_segments(store: &Store, segments: &[String], value: Value) -> StoreResult<Value> {
    let mut traversal = Traversal::new(store.max_depth());
    let mut store = store.clone();
    let mut segments = segments;

    loop {
        // Paths always carry a segment; an empty slice has nothing to address.
        let Some(field) = segments.last() else {
            return Ok(Value::Missing);
        };

        let plan = {
            let state = store.state();
            plan(&state.fields, segments, state.max_depth)?
        };

        let (nested, crossed, rest) = match plan {
            Plan::Delegate(nested, segment, rest) => {
                trace!(path = %Path::join(rest), "write delegated to nested store");
                (nested, segment, rest)
            }
            Plan::Invoke {
                producer,
                segment,
                rest,
            } => match producer.invoke() {
                Value::Store(nested) => {
                    trace!(path = %Path::join(rest), "write delegated to produced store");
                    (nested, segment, rest)
                }
                other => {
                    debug!(segment, kind = other.kind(), "deferred value is not a store");
                    return Err(StoreError::DeferredNotStore {
                        segment: segment.to_string(),
                    });
                }
            },
            Plan::Assign { parent } => {
                ensure_writable(&store, field)?;
                let mut state = store.state_mut();
                container_at(&mut state.fields, &segments[..parent])?.set(field, value.clone())?;
                return Ok(value);
            }
            Plan::Materialize { from } => {
                ensure_writable(&store, field)?;
                trace!(
                    at = %Path::join(&segments[..=from]),
                    "materializing missing structure"
                );
                let mut built = value.clone();
                for segment in segments[from + 1..].iter().rev() {
                    let mut object = Fields::new();
                    object.insert(segment.clone(), built);
                    built = Value::Object(object);
                }
                let mut state = store.state_mut();
                container_at(&mut state.fields, &segments[..from])?.set(&segments[from], built)?;
                return Ok(value);
            }
        };

        traversal.cross(crossed)?;
        store = nested;
        segments = rest;
    }
}

fn ensure_writable(store: &Store, field: &str) -> StoreResult<()> {
    if store.allowed_to_write(field) {
        Ok(())
    } else {
        debug!(field, "write denied");
        Err(StoreError::denied(field, Access::Write))
    }
}

/// Decide how to apply a write without mutating anything.
fn plan<'p>(fields: &Fields, segments: &'p [String], max_depth: usize) -> StoreResult<Plan<'p>> {
    let last = segments.len() - 1;
    let mut node: Option<&Value> = None;

    for (index, segment) in segments.iter().enumerate() {
        if index == last {
            break;
        }
        let child = match node {
            None => fields.get(segment.as_str()),
            Some(parent) => parent.child(segment),
        };
        let rest = &segments[index + 1..];

        match child {
            Some(Value::Store(nested)) => return Ok(Plan::Delegate(nested.clone(), segment, rest)),
            Some(Value::Deferred(producer)) => {
                return Ok(Plan::Invoke {
                    producer: producer.clone(),
                    segment,
                    rest,
                })
            }
            None | Some(Value::Missing) => {
                if last > max_depth {
                    debug!(limit = max_depth, segment = %segment, "write depth limit exceeded");
                    return Err(StoreError::DepthLimitExceeded { limit: max_depth });
                }
                return Ok(Plan::Materialize { from: index });
            }
            Some(container) if container.is_container() => {
                if index + 1 > max_depth {
                    debug!(limit = max_depth, segment = %segment, "write depth limit exceeded");
                    return Err(StoreError::DepthLimitExceeded { limit: max_depth });
                }
                node = Some(container);
            }
            Some(_) => {
                return Err(StoreError::NotAContainer {
                    segment: segment.clone(),
                })
            }
        }
    }

    Ok(Plan::Assign { parent: last })
}

/// Follow `prefix` to the container it names.
fn container_at<'a>(fields: &'a mut Fields, prefix: &[String]) -> StoreResult<Target<'a>> {
    let Some((first, rest)) = prefix.split_first() else {
        return Ok(Target::Root(fields));
    };
    let mut node = fields
        .get_mut(first.as_str())
        .ok_or_else(|| StoreError::NotAContainer {
            segment: first.clone(),
        })?;
    for segment in rest {
        node = node
            .child_mut(segment)
            .ok_or_else(|| StoreError::NotAContainer {
                segment: segment.clone(),
            })?;
    }
    Ok(Target::Node(node))
}
