//! GROQ query builder.
//!
//! Filters are kept as typed predicates and rendered with `$pN` placeholders.
//! Every value is shipped separately as a JSON-encoded `$pN` URL parameter, so
//! nothing a user typed ever becomes part of the query text itself.

use serde_json::Value;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(&'static str, Value),
    Gte(&'static str, Value),
    Lte(&'static str, Value),
}

impl Predicate {
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Predicate::Eq(field, value.into())
    }

    pub fn gte(field: &'static str, value: impl Into<Value>) -> Self {
        Predicate::Gte(field, value.into())
    }

    pub fn lte(field: &'static str, value: impl Into<Value>) -> Self {
        Predicate::Lte(field, value.into())
    }

    fn parts(&self) -> (&'static str, &'static str, &Value) {
        match self {
            Predicate::Eq(field, value) => (field, "==", value),
            Predicate::Gte(field, value) => (field, ">=", value),
            Predicate::Lte(field, value) => (field, "<=", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slice {
    All,
    First,
    Range(usize, usize),
}

#[derive(Debug, Clone)]
pub struct GroqQuery {
    predicates: Vec<Predicate>,
    projection: Vec<&'static str>,
    order: Option<&'static str>,
    slice: Slice,
}

impl GroqQuery {
    /// Starts a query over every document of `doc_type`.
    pub fn documents(doc_type: &str) -> Self {
        Self {
            predicates: vec![Predicate::eq("_type", doc_type)],
            projection: Vec::new(),
            order: None,
            slice: Slice::All,
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn filter_opt(self, predicate: Option<Predicate>) -> Self {
        match predicate {
            Some(p) => self.filter(p),
            None => self,
        }
    }

    pub fn project(mut self, fields: &[&'static str]) -> Self {
        self.projection = fields.to_vec();
        self
    }

    pub fn order_by(mut self, ordering: &'static str) -> Self {
        self.order = Some(ordering);
        self
    }

    /// Half-open slice `[start...end]`.
    pub fn range(mut self, start: usize, end: usize) -> Self {
        self.slice = Slice::Range(start, end);
        self
    }

    pub fn first(mut self) -> Self {
        self.slice = Slice::First;
        self
    }

    pub fn is_single(&self) -> bool {
        self.slice == Slice::First
    }

    pub fn render(&self) -> String {
        let filter = self.predicates
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let (field, op, _) = p.parts();
                format!("{} {} $p{}", field, op, i)
            })
            .collect::<Vec<_>>()
            .join(" && ");

        let mut out = format!("*[{}]", filter);
        if !self.projection.is_empty() {
            let _ = write!(out, " {{ {} }}", self.projection.join(", "));
        }
        if let Some(order) = self.order {
            let _ = write!(out, " | order({})", order);
        }
        match self.slice {
            Slice::All => {}
            Slice::First => out.push_str("[0]"),
            Slice::Range(start, end) => {
                let _ = write!(out, " [{}...{}]", start, end);
            }
        }
        out
    }

    /// URL parameters carrying the predicate values, `("$p0", "\"property\"")` etc.
    pub fn params(&self) -> Vec<(String, String)> {
        self.predicates
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let (_, _, value) = p.parts();
                (format!("$p{}", i), value.to_string())
            })
            .collect()
    }
}
