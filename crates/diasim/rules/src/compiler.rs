use std::collections::BTreeMap;

use diasim_types::{CompileError, RuleCompiler, RuleRef};

use crate::rule::PhoneRule;

/// Rule compiler backed by a table of prepared rules keyed by notation.
///
/// Every call to [`RuleCompiler::compile`] yields fresh rule handles, so
/// compiling the same notation twice gives two distinct rules.
#[derive(Clone, Debug, Default)]
pub struct PreparedCompiler {
    table: BTreeMap<String, Vec<PhoneRule>>,
}

impl PreparedCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the rules a notation compiles to.
    pub fn register(&mut self, notation: impl Into<String>, rules: Vec<PhoneRule>) {
        self.table.insert(notation.into(), rules);
    }

    /// Register a single rule under its own notation.
    pub fn with_rule(mut self, rule: PhoneRule) -> Self {
        self.register(rule.notation().to_string(), vec![rule]);
        self
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn notations(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }
}

impl RuleCompiler for PreparedCompiler {
    fn compile(&self, text: &str) -> Result<Vec<RuleRef>, CompileError> {
        let text = text.trim();
        let rules = self
            .table
            .get(text)
            .ok_or_else(|| CompileError::Unrecognised(text.to_string()))?;
        if rules.is_empty() {
            return Err(CompileError::Empty(text.to_string()));
        }
        tracing::trace!(notation = %text, rules = rules.len(), "Compiled rule notation");
        Ok(rules.iter().cloned().map(RuleRef::new).collect())
    }
}
