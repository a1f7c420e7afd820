//! Dynamic value model the checker operates on.
//!
//! Values mirror what a dynamically-typed host exposes at a call boundary:
//! nil, booleans, numbers (with integer and float subtypes), strings,
//! reference-counted tables, host functions, and I/O handles. Tables may
//! carry a metatable whose entries grant explicit capabilities: `__call`
//! makes a table invocable (a functable), `__len` overrides its reported
//! length, `__tostring` overrides its rendering, and a `_type` string tag
//! turns a plain table into an object with its own apparent type.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Host function signature: receives evaluated arguments, returns the
/// list of result values or a host-level error message.
pub type HostFn = Rc<dyn Fn(&[Value]) -> Result<Vec<Value>, String>>;

/// A table key. Keys have a total order (integers first, then strings,
/// then booleans) so element iteration and error attribution are
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Str(String),
    Bool(bool),
}

impl Key {
    fn rank(&self) -> u8 {
        match self {
            Key::Int(_) => 0,
            Key::Str(_) => 1,
            Key::Bool(_) => 2,
        }
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Key::Int(a), Key::Int(b)) => a.cmp(b),
            (Key::Str(a), Key::Str(b)) => a.cmp(b),
            (Key::Bool(a), Key::Bool(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{n}"),
            Key::Str(s) => write!(f, "{s}"),
            Key::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A mutable key/value container with an optional metatable.
///
/// The metatable is a second table holding capability entries; it is
/// queried explicitly through the accessors below, never via implicit
/// dispatch.
#[derive(Debug, Default)]
pub struct Table {
    entries: HashMap<Key, Value>,
    meta: Option<Rc<RefCell<Table>>>,
}

impl Table {
    pub fn new() -> Self {
        Table::default()
    }

    pub fn insert(&mut self, key: Key, value: Value) {
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Number of entries, honouring an integer `__len` metatable override.
    pub fn len(&self) -> usize {
        match self.length_override() {
            Some(n) if n >= 0 => n as usize,
            _ => self.entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the keys are exactly the contiguous integer range
    /// `1..=n` where n is the entry count. The empty table qualifies.
    pub fn is_sequence(&self) -> bool {
        let n = self.entries.len() as i64;
        (1..=n).all(|i| self.entries.contains_key(&Key::Int(i)))
    }

    /// Entries in key order: integers ascending, then strings, then booleans.
    pub fn sorted_entries(&self) -> Vec<(Key, Value)> {
        let mut entries: Vec<(Key, Value)> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries
    }

    pub fn set_meta(&mut self, meta: Rc<RefCell<Table>>) {
        self.meta = Some(meta);
    }

    pub fn meta(&self) -> Option<Rc<RefCell<Table>>> {
        self.meta.clone()
    }

    fn meta_entry(&self, name: &str) -> Option<Value> {
        let meta = self.meta.as_ref()?;
        meta.borrow().get(&Key::Str(name.to_string())).cloned()
    }

    /// The `__call` capability, if any. A table carrying one is invocable
    /// like a function (a functable).
    pub fn call_capability(&self) -> Option<Value> {
        match self.meta_entry("__call") {
            Some(v @ Value::Function(_)) => Some(v),
            _ => None,
        }
    }

    /// Integer `__len` override. Consulted before the entry count and
    /// before any display capability.
    pub fn length_override(&self) -> Option<i64> {
        match self.meta_entry("__len") {
            Some(Value::Int(n)) => Some(n),
            _ => None,
        }
    }

    /// String `__tostring` override used when rendering the table.
    pub fn display_override(&self) -> Option<String> {
        match self.meta_entry("__tostring") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// The `_type` tag. A tagged table's apparent type is the tag itself,
    /// which is what makes it an object rather than a plain table.
    pub fn type_tag(&self) -> Option<String> {
        match self.meta_entry("_type") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

/// Platform I/O handle abstraction. The checker only ever asks whether
/// the handle is still open; no I/O happens here.
#[derive(Debug)]
pub struct FileHandle {
    name: String,
    open: Cell<bool>,
}

impl FileHandle {
    pub fn open(name: impl Into<String>) -> Self {
        FileHandle {
            name: name.into(),
            open: Cell::new(true),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn close(&self) {
        self.open.set(false);
    }
}

/// A dynamically-typed runtime value.
#[derive(Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Table(Rc<RefCell<Table>>),
    Function(HostFn),
    File(Rc<FileHandle>),
}

impl Value {
    /// Fresh empty table value.
    pub fn table() -> Value {
        Value::Table(Rc::new(RefCell::new(Table::new())))
    }

    /// Table keyed `1..=n` from a list of elements.
    pub fn list(elements: Vec<Value>) -> Value {
        let mut table = Table::new();
        for (i, v) in elements.into_iter().enumerate() {
            table.insert(Key::Int(i as i64 + 1), v);
        }
        Value::Table(Rc::new(RefCell::new(table)))
    }

    pub fn function(f: impl Fn(&[Value]) -> Result<Vec<Value>, String> + 'static) -> Value {
        Value::Function(Rc::new(f))
    }

    /// The value's fundamental kind name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Table(_) => "table",
            Value::Function(_) => "function",
            Value::File(_) => "file",
        }
    }

    /// Numeric subtype name, preserved for error messages only.
    pub fn number_subtype(&self) -> Option<&'static str> {
        match self {
            Value::Int(_) => Some("integer"),
            Value::Float(_) => Some("float"),
            _ => None,
        }
    }

    /// Exact integer representation of a numeric value, if one exists.
    /// Floats qualify when their fractional part is zero and they fit
    /// an `i64`, mirroring `math.tointeger`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) => {
                // i64::MAX as f64 rounds up to 2^63, which does not fit
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Rc<RefCell<Table>>> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Table(t) => f.debug_tuple("Table").field(&t.borrow().entries).finish(),
            Value::Function(_) => write!(f, "Function(..)"),
            Value::File(h) => f.debug_tuple("File").field(h).finish(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => {
                // Compare by reference first, then by entries
                Rc::ptr_eq(a, b) || a.borrow().entries == b.borrow().entries
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::File(a), Value::File(b)) => Rc::ptr_eq(a, b),
            // Numbers compare across subtypes: 1 == 1.0
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => {
                if x.fract() == 0.0 && x.is_finite() {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{x}")
                }
            }
            Value::String(s) => write!(f, "{s}"),
            Value::Table(t) => {
                let table = t.borrow();
                if let Some(s) = table.display_override() {
                    return write!(f, "{s}");
                }
                if table.is_sequence() {
                    write!(f, "[")?;
                    for (i, (_, v)) in table.sorted_entries().iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{v}")?;
                    }
                    write!(f, "]")
                } else {
                    write!(f, "{{")?;
                    for (i, (k, v)) in table.sorted_entries().iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{k} = {v}")?;
                    }
                    write!(f, "}}")
                }
            }
            Value::Function(_) => write!(f, "<function>"),
            Value::File(h) => {
                if h.is_open() {
                    write!(f, "<file {}>", h.name())
                } else {
                    write!(f, "<closed file {}>", h.name())
                }
            }
        }
    }
}

impl Serialize for Value {
    /// Serialize to the obvious interchange shape: sequences as arrays,
    /// other tables as string-keyed maps. Functions and file handles
    /// have no data representation and serialize as their display form.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::String(s) => serializer.serialize_str(s),
            Value::Table(t) => {
                let table = t.borrow();
                if table.is_sequence() {
                    let entries = table.sorted_entries();
                    let mut seq = serializer.serialize_seq(Some(entries.len()))?;
                    for (_, v) in &entries {
                        seq.serialize_element(v)?;
                    }
                    seq.end()
                } else {
                    let entries = table.sorted_entries();
                    let mut map = serializer.serialize_map(Some(entries.len()))?;
                    for (k, v) in &entries {
                        map.serialize_entry(&k.to_string(), v)?;
                    }
                    map.end()
                }
            }
            Value::Function(_) | Value::File(_) => {
                serializer.serialize_str(&self.to_string())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Value {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::String(s)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Value {
        match v {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::list(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                let mut table = Table::new();
                for (k, v) in map {
                    table.insert(Key::Str(k), Value::from(v));
                }
                Value::Table(Rc::new(RefCell::new(table)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_detection() {
        let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
        assert!(list.as_table().unwrap().borrow().is_sequence());

        let mut table = Table::new();
        table.insert(Key::Int(1), Value::Int(1));
        table.insert(Key::Int(3), Value::Int(3));
        assert!(!table.is_sequence());

        assert!(Table::new().is_sequence());
    }

    #[test]
    fn test_key_ordering_is_total() {
        let mut keys = vec![
            Key::Str("b".to_string()),
            Key::Bool(true),
            Key::Int(2),
            Key::Str("a".to_string()),
            Key::Int(1),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                Key::Int(1),
                Key::Int(2),
                Key::Str("a".to_string()),
                Key::Str("b".to_string()),
                Key::Bool(true),
            ]
        );
    }

    #[test]
    fn test_number_equality_across_subtypes() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Int(1), Value::Float(1.5));
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(Value::Int(7).as_integer(), Some(7));
        assert_eq!(Value::Float(1.0).as_integer(), Some(1));
        assert_eq!(Value::Float(1.5).as_integer(), None);
        assert_eq!(Value::Float(1e300).as_integer(), None);
        assert_eq!(Value::String("1".to_string()).as_integer(), None);
    }

    #[test]
    fn test_call_capability_via_meta() {
        let meta = Rc::new(RefCell::new(Table::new()));
        meta.borrow_mut().insert(
            Key::Str("__call".to_string()),
            Value::function(|_| Ok(vec![])),
        );

        let mut table = Table::new();
        table.set_meta(meta);
        assert!(table.call_capability().is_some());
        assert!(Table::new().call_capability().is_none());
    }

    #[test]
    fn test_length_override() {
        let meta = Rc::new(RefCell::new(Table::new()));
        meta.borrow_mut()
            .insert(Key::Str("__len".to_string()), Value::Int(5));

        let mut table = Table::new();
        table.set_meta(meta);
        assert_eq!(table.len(), 5);
        assert!(table.is_empty());
    }

    #[test]
    fn test_display_sequence_and_table() {
        let list = Value::list(vec![Value::Int(1), Value::String("x".to_string())]);
        assert_eq!(list.to_string(), "[1, x]");

        let mut table = Table::new();
        table.insert(Key::Str("a".to_string()), Value::Boolean(true));
        let value = Value::Table(Rc::new(RefCell::new(table)));
        assert_eq!(value.to_string(), "{a = true}");
    }

    #[test]
    fn test_file_handle_open_close() {
        let handle = FileHandle::open("data.txt");
        assert!(handle.is_open());
        handle.close();
        assert!(!handle.is_open());
    }

    #[test]
    fn test_serialize_round_trips_through_json() {
        let value = Value::list(vec![Value::Int(1), Value::from("x"), Value::Nil]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"[1,"x",null]"#);

        let mut table = Table::new();
        table.insert(Key::Str("a".to_string()), Value::Boolean(true));
        let value = Value::Table(Rc::new(RefCell::new(table)));
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"a":true}"#);
    }

    #[test]
    fn test_from_json() {
        let json: serde_json::Value = serde_json::from_str(r#"[1, 2.5, "x", null]"#).unwrap();
        let value = Value::from(json);
        let table = value.as_table().unwrap().borrow();
        assert!(table.is_sequence());
        assert_eq!(table.get(&Key::Int(1)), Some(&Value::Int(1)));
        assert_eq!(table.get(&Key::Int(2)), Some(&Value::Float(2.5)));
        assert_eq!(table.get(&Key::Int(4)), Some(&Value::Nil));

        let json: serde_json::Value = serde_json::from_str(r#"{"a": 1}"#).unwrap();
        let value = Value::from(json);
        let table = value.as_table().unwrap().borrow();
        assert!(!table.is_sequence());
        assert_eq!(table.get(&Key::Str("a".to_string())), Some(&Value::Int(1)));
    }
}
