/// A length that is either absolute or relative to the animated object or its parent.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Dimension {
    Absolute(f64),
    /// A fraction of the animated object's size.
    RelativeToSelf(f64),
    /// A fraction of the parent's size.
    RelativeToParent(f64),
}

impl Default for Dimension {
    fn default() -> Self {
        Self::Absolute(0.0)
    }
}

impl From<f64> for Dimension {
    fn from(value: f64) -> Self {
        Self::Absolute(value)
    }
}

impl Dimension {
    /// Resolve along one axis, given the object's and the parent's extent on that axis.
    pub fn resolve(self, size: f64, parent_size: f64) -> f64 {
        match self {
            Dimension::Absolute(value) => value,
            Dimension::RelativeToSelf(fraction) => size * fraction,
            Dimension::RelativeToParent(fraction) => parent_size * fraction,
        }
    }
}
