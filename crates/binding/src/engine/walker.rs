use std::fmt::Write as _;

use super::{DIVE, Engine, Evaluation, Inspect, OMITEMPTY, RawFieldFailure, RuleInput, RuleSpec, Value};
use crate::error::EngineError;

/// Collects rule failures while a struct hands over its fields.
///
/// The walker owns the current namespace (`Root.items[1].name`). Each
/// [`field`](Self::field) call appends a segment, runs that field's rules,
/// descends into nested structs and removes the segment again.
#[derive(Debug)]
pub struct Walker<'e> {
    engine: &'e Engine,
    namespace: String,
    failures: Vec<RawFieldFailure>,
    fault: Option<EngineError>,
}

impl<'e> Walker<'e> {
    pub(crate) fn new(engine: &'e Engine, root: &str) -> Self {
        Self {
            engine,
            namespace: root.to_string(),
            failures: Vec::new(),
            fault: None,
        }
    }

    /// Validates one field of the struct being walked.
    pub fn field<V>(&mut self, name: &str, value: &V, rules: &[RuleSpec])
    where
        V: Inspect + ?Sized,
    {
        if self.fault.is_some() {
            return;
        }

        let mark = self.namespace.len();
        self.namespace.push('.');
        self.namespace.push_str(name);
        self.check(name, value.inspect(), value.is_optional(), rules);
        self.namespace.truncate(mark);
    }

    pub(crate) fn finish(self) -> Evaluation {
        if let Some(fault) = self.fault {
            return Evaluation::Faulted(fault);
        }
        if self.failures.is_empty() {
            Evaluation::Valid
        } else {
            Evaluation::Failures(self.failures)
        }
    }

    fn check(&mut self, field: &str, value: Value<'_>, optional: bool, rules: &[RuleSpec]) {
        let (own, elements) = match rules.iter().position(|spec| spec.tag == DIVE) {
            Some(at) => (&rules[..at], Some(&rules[at + 1..])),
            None => (rules, None),
        };

        for spec in own {
            let input = RuleInput {
                field,
                namespace: &self.namespace,
                value: &value,
                optional,
                param: spec.param,
            };
            if spec.tag == OMITEMPTY {
                if !input.is_given() {
                    return;
                }
                continue;
            }

            match self.engine.check(spec, &input) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::trace!(namespace = %self.namespace, rule = spec.tag, "rule failed");
                    self.failures.push(RawFieldFailure {
                        namespace: self.namespace.clone(),
                        tag: spec.tag.to_string(),
                        param: spec.param.map(str::to_string),
                    });
                    return;
                }
                Err(fault) => {
                    self.fault = Some(fault);
                    return;
                }
            }
        }

        match elements {
            Some(_) if value.is_absent() => {}
            Some(elements) => {
                let Value::Seq(items) = &value else {
                    self.fault = Some(EngineError::DiveOnNonSequence {
                        field: self.namespace.clone(),
                    });
                    return;
                };
                for (index, item) in items.iter().enumerate() {
                    let mark = self.push_index(index);
                    self.check(field, item.inspect(), item.is_optional(), elements);
                    self.namespace.truncate(mark);
                    if self.fault.is_some() {
                        return;
                    }
                }
            }
            None => self.descend(value),
        }
    }

    fn descend(&mut self, value: Value<'_>) {
        match value {
            Value::Struct(inner) => inner.walk(self),
            Value::Seq(items) => {
                for (index, item) in items.iter().enumerate() {
                    let mark = self.push_index(index);
                    self.descend(item.inspect());
                    self.namespace.truncate(mark);
                    if self.fault.is_some() {
                        return;
                    }
                }
            }
            _ => {}
        }
    }

    fn push_index(&mut self, index: usize) -> usize {
        let mark = self.namespace.len();
        let _ = write!(self.namespace, "[{index}]");
        mark
    }
}
