use crate::Vector2;

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Default,
    derive_more::Add,
    derive_more::Sub,
    derive_more::Neg,
    derive_more::Mul,
    derive_more::Div,
)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        self.squared_length().sqrt()
    }

    pub fn squared_length(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for (f64, f64) {
    fn from(value: Point) -> Self {
        (value.x, value.y)
    }
}

impl From<Vector2> for Point {
    fn from(value: Vector2) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<Point> for Vector2 {
    fn from(value: Point) -> Self {
        Vector2::new(value.x, value.y)
    }
}
