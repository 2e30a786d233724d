use std::cmp::Ordering;

use crate::Model;

/// A field value lifted out of a record for sorting and field filters.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// Total order used by sorting. `Null` sorts before everything, numbers
    /// compare across variants, floats use `total_cmp` (NaN after +inf) and
    /// mixed kinds fall back to a fixed kind rank.
    pub fn compare(&self, other: &Self) -> Ordering {
        use FieldValue::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (UInt(a), UInt(b)) => a.cmp(b),
            (Int(a), UInt(b)) => (*a as i128).cmp(&(*b as i128)),
            (UInt(a), Int(b)) => (*a as i128).cmp(&(*b as i128)),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Float(a), UInt(b)) => a.total_cmp(&(*b as f64)),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (UInt(a), Float(b)) => (*a as f64).total_cmp(b),
            (Str(a), Str(b)) => a.cmp(b),
            (Bytes(a), Bytes(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Bool(_) => 1,
            FieldValue::Int(_) | FieldValue::UInt(_) | FieldValue::Float(_) => 2,
            FieldValue::Str(_) => 3,
            FieldValue::Bytes(_) => 4,
        }
    }
}

/// Partial order used by field filters: mixed kinds and NaN are unordered,
/// so no comparison operator matches them.
impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        use FieldValue::*;
        match (self, other) {
            (Null, Null) => Some(Ordering::Equal),
            (Bool(a), Bool(b)) => a.partial_cmp(b),
            (Int(a), Int(b)) => a.partial_cmp(b),
            (UInt(a), UInt(b)) => a.partial_cmp(b),
            (Int(a), UInt(b)) => (*a as i128).partial_cmp(&(*b as i128)),
            (UInt(a), Int(b)) => (*a as i128).partial_cmp(&(*b as i128)),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Float(a), Int(b)) => a.partial_cmp(&(*b as f64)),
            (Float(a), UInt(b)) => a.partial_cmp(&(*b as f64)),
            (Int(a), Float(b)) => (*a as f64).partial_cmp(b),
            (UInt(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Str(a), Str(b)) => a.partial_cmp(b),
            (Bytes(a), Bytes(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Conversion used by `#[derive(Model)]` for every declared field.
pub trait ToFieldValue {
    fn to_field_value(&self) -> FieldValue;
}

macro_rules! impl_field_value {
    ($variant:ident as $target:ty: $($t:ty),+) => {
        $(
            impl ToFieldValue for $t {
                fn to_field_value(&self) -> FieldValue {
                    FieldValue::$variant(*self as $target)
                }
            }

            impl From<$t> for FieldValue {
                fn from(value: $t) -> Self {
                    FieldValue::$variant(value as $target)
                }
            }
        )+
    };
}

impl_field_value!(Int as i64: i8, i16, i32, i64, isize);
impl_field_value!(UInt as u64: u8, u16, u32, u64, usize);
impl_field_value!(Float as f64: f32, f64);

impl ToFieldValue for bool {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Bool(*self)
    }
}

impl ToFieldValue for String {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Str(self.clone())
    }
}

impl ToFieldValue for Vec<u8> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Bytes(self.clone())
    }
}

impl<T: ToFieldValue> ToFieldValue for Option<T> {
    fn to_field_value(&self) -> FieldValue {
        self.as_ref()
            .map_or(FieldValue::Null, ToFieldValue::to_field_value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        FieldValue::Bytes(value)
    }
}

/// Looks a field up by name. `id`, `created` and `updated` fall back to the
/// metadata block when the record declares no field of that name; anything
/// else unknown is `Null`.
pub fn resolve_field<T: Model>(item: &T, name: &str) -> FieldValue {
    if let Some(value) = item.field(name) {
        return value;
    }
    let Some(meta) = item.metadata() else {
        return FieldValue::Null;
    };
    match name {
        "id" => meta.id.to_field_value(),
        "created" => meta.created.to_field_value(),
        "updated" => meta.updated.to_field_value(),
        _ => FieldValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_kinds_compare_across_variants() {
        assert_eq!(FieldValue::Int(-1).compare(&FieldValue::UInt(0)), Ordering::Less);
        assert_eq!(FieldValue::Float(2.5).compare(&FieldValue::Int(2)), Ordering::Greater);
        assert_eq!(FieldValue::UInt(7).compare(&FieldValue::Float(7.0)), Ordering::Equal);
    }

    #[test]
    fn compare_is_total() {
        let values = [
            FieldValue::Str("a".into()),
            FieldValue::Float(f64::NAN),
            FieldValue::Int(1),
            FieldValue::Null,
            FieldValue::Float(f64::NEG_INFINITY),
            FieldValue::UInt(3),
            FieldValue::Bool(true),
            FieldValue::Bytes(vec![1]),
            FieldValue::Float(2.5),
        ];
        for a in &values {
            assert_eq!(a.compare(a), Ordering::Equal);
            for b in &values {
                assert_eq!(a.compare(b), b.compare(a).reverse());
                for c in &values {
                    if a.compare(b).is_le() && b.compare(c).is_le() {
                        assert!(a.compare(c).is_le(), "{:?} {:?} {:?}", a, b, c);
                    }
                }
            }
        }

        assert_eq!(FieldValue::Null.compare(&FieldValue::Int(i64::MIN)), Ordering::Less);
        assert_eq!(
            FieldValue::Float(f64::NAN).compare(&FieldValue::Float(f64::INFINITY)),
            Ordering::Greater
        );
        assert_eq!(
            FieldValue::Int(100).compare(&FieldValue::Str("1".into())),
            Ordering::Less
        );
    }

    #[test]
    fn filters_see_mixed_kinds_as_unordered() {
        assert_eq!(FieldValue::Str("a".into()).partial_cmp(&FieldValue::Int(1)), None);
        assert_eq!(FieldValue::Float(f64::NAN).partial_cmp(&FieldValue::Float(1.0)), None);
    }

    #[test]
    fn options_map_to_null() {
        assert_eq!(None::<i32>.to_field_value(), FieldValue::Null);
        assert_eq!(Some(3u8).to_field_value(), FieldValue::UInt(3));
    }
}
