use std::sync::Arc;

use crate::{FieldValue, Model, field::resolve_field};

/// The filter contract: one boolean function over a record. Operation
/// builders accept nothing else.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

pub fn predicate<T, F>(f: F) -> Predicate<T>
where
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FieldOp {
    fn test(self, left: &FieldValue, right: &FieldValue) -> bool {
        use std::cmp::Ordering::*;
        let ordering = left.partial_cmp(right);
        match self {
            FieldOp::Eq => ordering == Some(Equal),
            FieldOp::Ne => ordering != Some(Equal),
            FieldOp::Gt => ordering == Some(Greater),
            FieldOp::Gte => matches!(ordering, Some(Greater | Equal)),
            FieldOp::Lt => ordering == Some(Less),
            FieldOp::Lte => matches!(ordering, Some(Less | Equal)),
        }
    }
}

/// Predicate tree. Compiles down to a single [`Predicate`].
///
/// ```ignore
/// let expr = FilterExpr::and(vec![
///     FilterExpr::gte("index", 0),
///     FilterExpr::not(FilterExpr::eq("name", "pluto")),
/// ]);
/// store.get().matching(expr).run().await?;
/// ```
pub enum FilterExpr<T> {
    And(Vec<FilterExpr<T>>),
    Or(Vec<FilterExpr<T>>),
    Not(Box<FilterExpr<T>>),
    Where(Predicate<T>),
    Field {
        name: String,
        op: FieldOp,
        value: FieldValue,
    },
}

impl<T: Model> FilterExpr<T> {
    pub fn and(exprs: Vec<FilterExpr<T>>) -> Self {
        FilterExpr::And(exprs)
    }

    pub fn or(exprs: Vec<FilterExpr<T>>) -> Self {
        FilterExpr::Or(exprs)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: FilterExpr<T>) -> Self {
        FilterExpr::Not(Box::new(expr))
    }

    pub fn when<F>(f: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        FilterExpr::Where(Arc::new(f))
    }

    pub fn field(name: impl Into<String>, op: FieldOp, value: impl Into<FieldValue>) -> Self {
        FilterExpr::Field {
            name: name.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::field(name, FieldOp::Eq, value)
    }

    pub fn ne(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::field(name, FieldOp::Ne, value)
    }

    pub fn gt(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::field(name, FieldOp::Gt, value)
    }

    pub fn gte(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::field(name, FieldOp::Gte, value)
    }

    pub fn lt(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::field(name, FieldOp::Lt, value)
    }

    pub fn lte(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::field(name, FieldOp::Lte, value)
    }

    pub fn matches(&self, item: &T) -> bool {
        match self {
            FilterExpr::And(exprs) => exprs.iter().all(|e| e.matches(item)),
            FilterExpr::Or(exprs) => exprs.iter().any(|e| e.matches(item)),
            FilterExpr::Not(expr) => !expr.matches(item),
            FilterExpr::Where(f) => f(item),
            FilterExpr::Field { name, op, value } => op.test(&resolve_field(item, name), value),
        }
    }

    pub fn compile(self) -> Predicate<T> {
        Arc::new(move |item: &T| self.matches(item))
    }
}
