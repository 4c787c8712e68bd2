#[derive(Copy, Clone, PartialEq, Debug, Default, derive_more::Mul, derive_more::Div)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const EMPTY: Self = Self::new(0.0, 0.0);

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl From<(f64, f64)> for Size {
    fn from((width, height): (f64, f64)) -> Self {
        Size::new(width, height)
    }
}
