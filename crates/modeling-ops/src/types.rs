use chamber_kernel::{KernelError, KernelSolidHandle};
use chamber_types::ProfileError;

/// Errors from modeling operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpError {
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("invalid aperture outline: {0}")]
    Profile(#[from] ProfileError),
}

impl OpError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        OpError::InvalidParameter {
            reason: reason.into(),
        }
    }
}

/// The named solids a model hands to the output stage.
/// Insertion order is preserved; each entry becomes one STL file.
#[derive(Debug, Clone, Default)]
pub struct Parts {
    entries: Vec<(String, KernelSolidHandle)>,
}

impl Parts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a part, replacing (in place) any part already using `name`.
    pub fn insert(&mut self, name: impl Into<String>, solid: KernelSolidHandle) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = solid,
            None => self.entries.push((name, solid)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&KernelSolidHandle> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, h)| h)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KernelSolidHandle)> {
        self.entries.iter().map(|(n, h)| (n.as_str(), h))
    }

    pub fn as_slice(&self) -> &[(String, KernelSolidHandle)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
