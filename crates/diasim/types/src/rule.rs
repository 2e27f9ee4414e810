use std::fmt;
use std::sync::Arc;

use crate::error::CompileError;
use crate::form::PhonologicalForm;

/// A compiled sound change.
///
/// The `Display` impl yields the rule's notation, used in derivation traces.
pub trait Rule: fmt::Display + fmt::Debug + Send + Sync {
    /// The rewritten form when the rule fires, `None` when it does not.
    ///
    /// Implementations must return `None` for [`PhonologicalForm::Absent`].
    fn apply(&self, form: &PhonologicalForm) -> Option<PhonologicalForm>;
}

/// Shared handle to a rule.
///
/// Two handles denote the same rule only if they point at the same
/// allocation; textually identical rules compiled separately are distinct.
#[derive(Clone)]
pub struct RuleRef(Arc<dyn Rule>);

impl RuleRef {
    pub fn new<R: Rule + 'static>(rule: R) -> Self {
        Self(Arc::new(rule))
    }

    pub fn from_arc(rule: Arc<dyn Rule>) -> Self {
        Self(rule)
    }

    pub fn same_rule(&self, other: &RuleRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Apply the rule, counting a rewrite to an identical form as not firing.
    pub fn apply(&self, form: &PhonologicalForm) -> Option<PhonologicalForm> {
        if form.is_absent() {
            return None;
        }
        self.0.apply(form).filter(|out| out != form)
    }

    pub fn text(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for RuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for RuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RuleRef").field(&self.0).finish()
    }
}

/// Turns rule notation into executable rules.
pub trait RuleCompiler: Send + Sync {
    fn compile(&self, text: &str) -> Result<Vec<RuleRef>, CompileError>;
}
