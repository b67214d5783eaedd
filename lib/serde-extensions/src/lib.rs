use serde_json::{Map, Value};

/// Deep merge another value into self
///
/// Mappings are merged key by key, recursively. Anything that is not a mapping on both
/// sides (scalars, sequences, null) is replaced outright by the incoming value.
pub trait Merge {
    fn merge(&mut self, other: Self);
}

impl Merge for Value {
    fn merge(&mut self, other: Value) {
        match (self, other) {
            (Value::Object(target), Value::Object(source)) => target.merge(source),
            (target, source) => *target = source,
        }
    }
}

impl Merge for Map<String, Value> {
    fn merge(&mut self, other: Map<String, Value>) {
        for (key, value) in other {
            match self.get_mut(&key) {
                Some(existing) => existing.merge(value),
                None => {
                    self.insert(key, value);
                }
            }
        }
    }
}

/// Lookup of nested values using a dotted path (`footer.links.0.href`)
pub trait DottedPath {
    fn dotted(&self, path: &str) -> Option<&Value>;
}

impl DottedPath for Value {
    fn dotted(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return None;
        }
        path.split('.').try_fold(self, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

impl DottedPath for Map<String, Value> {
    fn dotted(&self, path: &str) -> Option<&Value> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let value = self.get(head)?;
        match rest {
            Some(rest) => value.dotted(rest),
            None => Some(value),
        }
    }
}
