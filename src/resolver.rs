use crate::schema::SchemaDocument;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Follows `$ref` pointers within one schema document.
///
/// Schema generators disagree on how pointers are spelled, so several forms
/// are accepted:
///
/// - `#/$defs/<name>` and `#/definitions/<name>` look `<name>` up in the
///   document's definitions map.
/// - `#/<path>` walks from the root.
/// - `<digits>/<path>` drops the leading numeric segment and walks from the root.
/// - anything else is walked from the root as-is.
///
/// A pointer that cannot be followed, or that lands on something other than
/// an object, leaves the node untouched. Successful lookups are cached by
/// pointer string for the lifetime of the resolver.
pub struct RefResolver<'a> {
    document: &'a SchemaDocument,
    cache: HashMap<String, &'a Value>,
}

impl<'a> RefResolver<'a> {
    pub fn new(document: &'a SchemaDocument) -> Self {
        Self {
            document,
            cache: HashMap::new(),
        }
    }

    /// Returns the target of `node`'s `$ref`, or `node` itself when it has no
    /// `$ref` or the pointer does not resolve.
    pub fn resolve<'n>(&mut self, node: &'n Value) -> &'n Value
    where
        'a: 'n,
    {
        let Some(reference) = node.get("$ref").and_then(Value::as_str) else {
            return node;
        };

        if let Some(&target) = self.cache.get(reference) {
            return target;
        }

        match self.lookup(reference) {
            Some(target) => {
                debug!(reference, "resolved $ref");
                self.cache.insert(reference.to_string(), target);
                target
            }
            None => {
                warn!(reference, "unresolved $ref, treating it as untyped");
                node
            }
        }
    }

    fn lookup(&self, reference: &str) -> Option<&'a Value> {
        let root = self.document.root();

        let target = if let Some(rest) = reference
            .strip_prefix("#/$defs/")
            .or_else(|| reference.strip_prefix("#/definitions/"))
        {
            let mut segments = segments(rest);
            let name = segments.next()?;
            let definition = self.document.definitions().get(&*name)?;
            navigate(definition, segments)
        } else if reference == "#" {
            Some(root)
        } else if let Some(rest) = reference.strip_prefix("#/") {
            navigate(root, segments(rest))
        } else if let Some(rest) = strip_numeric_prefix(reference) {
            navigate(root, segments(rest))
        } else {
            navigate(root, segments(reference))
        }?;

        target.is_object().then_some(target)
    }
}

/// `"4/directReports/items"` -> `"directReports/items"`
fn strip_numeric_prefix(reference: &str) -> Option<&str> {
    let (head, rest) = reference.split_once('/')?;
    (!head.is_empty() && head.bytes().all(|b| b.is_ascii_digit())).then_some(rest)
}

fn segments(path: &str) -> impl Iterator<Item = Cow<'_, str>> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(decode_segment)
}

/// Undoes JSON-Pointer escaping (`~1` is `/`, `~0` is `~`).
fn decode_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Walks `path` from `start`.
///
/// On objects each segment is tried as a property name first, so
/// `a/b` reaches `properties.a.properties.b` without spelling out the
/// `properties` hops; `items` and `properties` also step into those keywords,
/// and any other key is looked up directly. On arrays the segment must be an
/// in-bounds index.
fn navigate<'v, S: AsRef<str>>(
    start: &'v Value,
    path: impl IntoIterator<Item = S>,
) -> Option<&'v Value> {
    let mut current = start;

    for segment in path {
        let segment = segment.as_ref();
        current = match current {
            Value::Object(map) => map
                .get("properties")
                .and_then(|properties| properties.get(segment))
                .or_else(|| match segment {
                    "items" | "properties" => map.get(segment),
                    _ => None,
                })
                .or_else(|| map.get(segment))?,
            Value::Array(items) => {
                if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                items.get(segment.parse::<usize>().ok()?)?
            }
            _ => return None,
        };
    }

    Some(current)
}
