//! Opaque handles for rendered elements.

use uuid::Uuid;

/// Reference to one rendered element.
///
/// The controllers never inspect elements; they only pass handles to the
/// engine and ask the layout for bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.0.simple().to_string();
        write!(f, "el:{}", &s[..8])
    }
}

/// Identifier of a tracked image element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub u32);

/// A page region: its root element and the children that recipes animate
/// individually (hero lines, stagger items, marquee content).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub element: ElementId,
    pub children: Vec<ElementId>,
}

impl Region {
    /// A region without animated children.
    pub fn new(element: ElementId) -> Self {
        Self {
            element,
            children: Vec::new(),
        }
    }

    /// A region whose children are animated individually.
    pub fn with_children(element: ElementId, children: Vec<ElementId>) -> Self {
        Self { element, children }
    }
}

impl From<ElementId> for Region {
    fn from(element: ElementId) -> Self {
        Self::new(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_ids_are_unique() {
        let a = ElementId::new();
        let b = ElementId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_element_display_is_short() {
        let id = ElementId::new();
        let shown = id.to_string();
        assert!(shown.starts_with("el:"));
        assert_eq!(shown.len(), 11);
    }
}
