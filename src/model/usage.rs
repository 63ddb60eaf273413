// ABOUTME: Usage classification wrapper returned by resource listings.
// ABOUTME: Flattens the resource and appends Usage, UsedBy and IsSystem.

use super::Container;
use crate::types::ContainerId;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Usage {
    Used,
    Orphaned,
}

/// Container that references a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerRef {
    pub id: ContainerId,
    pub name: String,
}

impl From<&Container> for ContainerRef {
    fn from(container: &Container) -> Self {
        Self {
            id: container.id.clone(),
            name: container.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Classified<T> {
    #[serde(flatten)]
    pub resource: T,
    pub usage: Usage,
    pub used_by: Vec<ContainerRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_system: Option<bool>,
}

impl<T> Classified<T> {
    /// Classify from the set of referencing containers.
    pub fn new(resource: T, used_by: Vec<ContainerRef>) -> Self {
        let usage = if used_by.is_empty() {
            Usage::Orphaned
        } else {
            Usage::Used
        };
        Self {
            resource,
            usage,
            used_by,
            is_system: None,
        }
    }

    /// Mark as a built-in resource; built-ins always count as used.
    pub fn system(mut self) -> Self {
        self.usage = Usage::Used;
        self.is_system = Some(true);
        self
    }

    pub fn is_used(&self) -> bool {
        self.usage == Usage::Used
    }
}
