/// Actor context for a request.
///
/// Every state-changing route records who performed the action, so this
/// must be present for all domain routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    performed_by: String,
}

impl ActorContext {
    pub fn new(performed_by: impl Into<String>) -> Self {
        Self {
            performed_by: performed_by.into(),
        }
    }

    pub fn performed_by(&self) -> &str {
        &self.performed_by
    }
}
