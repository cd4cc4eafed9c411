use std::cmp::Ordering;
use std::fmt;

/// Declared column types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ColType {
    Int,
    Float,
    Str,
    Bool,
}

impl fmt::Display for ColType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColType::Int => write!(f, "INT"),
            ColType::Float => write!(f, "FLOAT"),
            ColType::Str => write!(f, "STRING"),
            ColType::Bool => write!(f, "BOOL"),
        }
    }
}

/// Runtime literal values carried in predicates and INSERT lists.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Value {
    pub fn col_type(&self) -> ColType {
        match self {
            Value::Int(_) => ColType::Int,
            Value::Float(_) => ColType::Float,
            Value::Str(_) => ColType::Str,
            Value::Bool(_) => ColType::Bool,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Compare two values of compatible types. `Int` and `Float` are
    /// mutually comparable; every other cross-type pairing is not.
    pub fn cmp_compatible(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn eq_compatible(&self, other: &Value) -> Option<bool> {
        self.cmp_compatible(other).map(|ord| ord == Ordering::Equal)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "'{v}'"),
            Value::Bool(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cmp::Ordering::{Equal, Greater, Less};

    #[test]
    fn cmp_compatible_same_type() {
        assert_eq!(Value::Int(1).cmp_compatible(&Value::Int(2)), Some(Less));
        assert_eq!(
            Value::Str("a".into()).cmp_compatible(&Value::Str("a".into())),
            Some(Equal)
        );
        assert_eq!(
            Value::Bool(true).cmp_compatible(&Value::Bool(false)),
            Some(Greater)
        );
    }

    #[test]
    fn numerics_compare_across_int_and_float() {
        assert_eq!(Value::Int(1).cmp_compatible(&Value::Float(1.5)), Some(Less));
        assert_eq!(
            Value::Float(2.0).cmp_compatible(&Value::Int(2)),
            Some(Equal)
        );
    }

    #[test]
    fn non_numeric_cross_type_rejected() {
        assert_eq!(Value::Int(1).cmp_compatible(&Value::Str("1".into())), None);
        assert_eq!(Value::Bool(true).cmp_compatible(&Value::Int(1)), None);
        assert_eq!(
            Value::Str("true".into()).eq_compatible(&Value::Bool(true)),
            None
        );
    }

    #[test]
    fn truthiness_is_strict() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(1).as_bool(), None);
        assert_eq!(Value::Str("true".into()).as_bool(), None);
    }

    #[test]
    fn display_renders_sql_literals() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Str("ada".into()).to_string(), "'ada'");
        assert_eq!(Value::Bool(false).to_string(), "false");
    }

    #[test]
    fn serde_round_trip_stability() {
        let vals = vec![
            Value::Int(-42),
            Value::Float(2.5),
            Value::Str("Ada".into()),
            Value::Bool(true),
        ];

        let json = serde_json::to_string(&vals).unwrap();
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();

        assert_eq!(vals, back);
    }

    proptest! {
        // Order symmetry: if a < b, then b > a
        #[test]
        fn order_is_antisymmetric(i in any::<i64>(), j in any::<i64>()) {
            let a = Value::Int(i);
            let b = Value::Int(j);
            let ord1 = a.cmp_compatible(&b);
            let ord2 = b.cmp_compatible(&a);
            match (ord1, ord2) {
                (Some(o1), Some(o2)) => prop_assert_eq!(o1, o2.reverse()),
                _ => prop_assert!(false, "int comparison must be total"),
            }
        }

        // Reflexivity: every value equals itself
        #[test]
        fn eq_reflexive(val in any::<i64>()) {
            let v = Value::Int(val);
            prop_assert_eq!(v.eq_compatible(&v), Some(true));
        }

        // Text comparisons align with standard String ordering
        #[test]
        fn text_cmp_matches_std(a in ".*", b in ".*") {
            let va = Value::Str(a.clone());
            let vb = Value::Str(b.clone());
            prop_assert_eq!(va.cmp_compatible(&vb), Some(a.cmp(&b)));
        }
    }
}
