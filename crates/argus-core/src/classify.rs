//! Type-name classification of live values.
//!
//! `classify` is the leaf predicate everything else builds on: does one
//! concrete value satisfy one type token? It is pure and deterministic;
//! the absent value (a position past the end of an argument list) is
//! `None`.

use crate::value::{Table, Value};

/// Check a single value against a single type token.
///
/// Tokens are the primitive kind names plus the special vocabulary:
/// `any`, `callable`/`functable`, `file`, `int`/`integer`, `list`,
/// `#list`, `#table`, `object`, exact string literals (`:name`), and
/// container composites (`table of int`). Unknown tokens match nothing.
pub fn classify(token: &str, value: Option<&Value>) -> bool {
    if token.starts_with(':') {
        return matches!(value, Some(Value::String(s)) if s == token);
    }
    if let Some((container, element)) = split_composite(token) {
        return classify_container(container, element, value);
    }

    let v = match value {
        Some(v) => v,
        None => return token == "nil",
    };

    match token {
        "nil" => matches!(v, Value::Nil),
        "any" => !matches!(v, Value::Nil),
        "boolean" | "bool" => matches!(v, Value::Boolean(_)),
        "number" => matches!(v, Value::Int(_) | Value::Float(_)),
        "string" => matches!(v, Value::String(_)),
        "table" => matches!(v, Value::Table(_)),
        "function" | "func" => matches!(v, Value::Function(_)),
        "int" | "integer" => v.as_integer().is_some(),
        "file" => matches!(v, Value::File(h) if h.is_open()),
        "callable" | "functable" => is_callable(v),
        "list" => with_table(v, Table::is_sequence),
        "#list" => with_table(v, |t| t.is_sequence() && !t.is_empty()),
        "#table" => with_table(v, |t| !t.is_empty()),
        "object" => with_table(v, |t| t.type_tag().is_some()),
        _ => false,
    }
}

/// Split a composite token at its first ` of `, yielding the container
/// and element tokens. The element may itself be composite.
pub(crate) fn split_composite(token: &str) -> Option<(&str, &str)> {
    token.split_once(" of ")
}

/// A function, or a table carrying the `__call` capability.
fn is_callable(v: &Value) -> bool {
    match v {
        Value::Function(_) => true,
        Value::Table(t) => t.borrow().call_capability().is_some(),
        _ => false,
    }
}

fn with_table(v: &Value, pred: impl FnOnce(&Table) -> bool) -> bool {
    match v {
        Value::Table(t) => pred(&t.borrow()),
        _ => false,
    }
}

/// The container token must classify the value itself; every element
/// (in sorted key order) must then classify as the element token.
fn classify_container(container: &str, element: &str, value: Option<&Value>) -> bool {
    if !classify(container, value) {
        return false;
    }
    match value {
        Some(Value::Table(t)) => t
            .borrow()
            .sorted_entries()
            .iter()
            .all(|(_, v)| classify(element, Some(v))),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{FileHandle, Key};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn table_with(entries: Vec<(Key, Value)>) -> Value {
        let value = Value::table();
        {
            let t = value.as_table().unwrap();
            let mut t = t.borrow_mut();
            for (k, v) in entries {
                t.insert(k, v);
            }
        }
        value
    }

    fn functable() -> Value {
        let meta = Rc::new(RefCell::new(Table::default()));
        meta.borrow_mut().insert(
            Key::Str("__call".to_string()),
            Value::function(|_| Ok(vec![])),
        );
        let value = Value::table();
        value.as_table().unwrap().borrow_mut().set_meta(meta);
        value
    }

    fn tagged(tag: &str) -> Value {
        let meta = Rc::new(RefCell::new(Table::default()));
        meta.borrow_mut()
            .insert(Key::Str("_type".to_string()), Value::from(tag));
        let value = Value::table();
        value.as_table().unwrap().borrow_mut().set_meta(meta);
        value
    }

    #[test]
    fn test_primitives() {
        assert!(classify("string", Some(&Value::from("x"))));
        assert!(classify("number", Some(&Value::Int(1))));
        assert!(classify("number", Some(&Value::Float(1.5))));
        assert!(classify("boolean", Some(&Value::Boolean(true))));
        assert!(classify("bool", Some(&Value::Boolean(true))));
        assert!(classify("function", Some(&Value::function(|_| Ok(vec![])))));
        assert!(classify("func", Some(&Value::function(|_| Ok(vec![])))));
        assert!(!classify("string", Some(&Value::Int(1))));
    }

    #[test]
    fn test_nil_and_absent() {
        assert!(classify("nil", Some(&Value::Nil)));
        assert!(classify("nil", None));
        assert!(!classify("nil", Some(&Value::Int(0))));
    }

    #[test]
    fn test_any_excludes_nil_and_absent() {
        assert!(classify("any", Some(&Value::Boolean(false))));
        assert!(classify("any", Some(&Value::Int(0))));
        assert!(!classify("any", Some(&Value::Nil)));
        assert!(!classify("any", None));
    }

    #[test]
    fn test_integer_accepts_whole_floats() {
        assert!(classify("int", Some(&Value::Int(3))));
        assert!(classify("int", Some(&Value::Float(1.0))));
        assert!(!classify("int", Some(&Value::Float(1.5))));
        assert!(classify("integer", Some(&Value::Float(-2.0))));
        assert!(!classify("integer", Some(&Value::String("1".to_string()))));
    }

    #[test]
    fn test_exact_literal() {
        assert!(classify(":quiet", Some(&Value::from(":quiet"))));
        assert!(!classify(":quiet", Some(&Value::from("quiet"))));
        assert!(!classify(":quiet", Some(&Value::from(":loud"))));
        assert!(!classify(":quiet", Some(&Value::Int(1))));
    }

    #[test]
    fn test_table_and_nonempty_table() {
        let empty = Value::table();
        let full = table_with(vec![(Key::Str("a".to_string()), Value::Int(1))]);
        assert!(classify("table", Some(&empty)));
        assert!(!classify("#table", Some(&empty)));
        assert!(classify("#table", Some(&full)));
    }

    #[test]
    fn test_list_and_nonempty_list() {
        let empty = Value::table();
        let one = Value::list(vec![Value::Int(1)]);
        let holey = table_with(vec![
            (Key::Int(1), Value::Int(1)),
            (Key::Int(3), Value::Int(3)),
        ]);
        assert!(classify("list", Some(&empty)));
        assert!(!classify("#list", Some(&empty)));
        assert!(classify("list", Some(&one)));
        assert!(classify("#list", Some(&one)));
        assert!(!classify("list", Some(&holey)));
    }

    #[test]
    fn test_callable_and_functable() {
        let f = Value::function(|_| Ok(vec![]));
        assert!(classify("callable", Some(&f)));
        assert!(classify("functable", Some(&f)));
        assert!(classify("callable", Some(&functable())));
        assert!(classify("functable", Some(&functable())));
        assert!(!classify("callable", Some(&Value::table())));
        assert!(!classify("function", Some(&functable())));
    }

    #[test]
    fn test_object_requires_tag() {
        assert!(classify("object", Some(&tagged("Point"))));
        assert!(!classify("object", Some(&Value::table())));
        // A tagged table is still a table
        assert!(classify("table", Some(&tagged("Point"))));
    }

    #[test]
    fn test_file_matches_only_open_handles() {
        let handle = Rc::new(FileHandle::open("data.txt"));
        let file = Value::File(handle.clone());
        assert!(classify("file", Some(&file)));
        handle.close();
        assert!(!classify("file", Some(&file)));
    }

    #[test]
    fn test_container_of_element() {
        let ints = Value::list(vec![Value::Int(1), Value::Int(2)]);
        let mixed = Value::list(vec![Value::Int(1), Value::from("x")]);
        assert!(classify("table of int", Some(&ints)));
        assert!(classify("list of int", Some(&ints)));
        assert!(!classify("table of int", Some(&mixed)));
        assert!(!classify("list of int", Some(&Value::Int(1))));
        // Empty containers satisfy any element type
        assert!(classify("table of string", Some(&Value::table())));
    }

    #[test]
    fn test_classify_is_deterministic() {
        let mixed = Value::list(vec![Value::Int(1), Value::from("x")]);
        for _ in 0..3 {
            assert!(!classify("table of int", Some(&mixed)));
            assert!(classify("table of any", Some(&mixed)));
        }
    }

    #[test]
    fn test_unknown_token_matches_nothing() {
        assert!(!classify("gadget", Some(&Value::Int(1))));
        assert!(!classify("gadget", None));
    }
}
