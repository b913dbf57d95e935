use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subject {
    pub name: String,
}

impl Subject {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
