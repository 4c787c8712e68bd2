use std::ops::{Mul, MulAssign};

use bitflags::bitflags;

use crate::{Affine2, Point};

bitflags! {
    /// Which parts of a [`Transformation`] are meaningful.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TransformationKind: u8 {
        const ALPHA = 0b01;
        const MATRIX = 0b10;
    }
}

impl TransformationKind {
    pub const IDENTITY: Self = Self::empty();
    pub const BOTH: Self = Self::all();
}

/// The transformation an animation applies at one point in time: an affine matrix and an alpha
/// value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    matrix: Affine2,
    alpha: f64,
    kind: TransformationKind,
}

impl Default for Transformation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transformation {
    pub const IDENTITY: Self = Self {
        matrix: Affine2::IDENTITY,
        alpha: 1.0,
        kind: TransformationKind::BOTH,
    };

    pub fn new(matrix: Affine2, alpha: f64) -> Self {
        Self {
            matrix,
            alpha,
            kind: TransformationKind::BOTH,
        }
    }

    pub fn from_matrix(matrix: Affine2) -> Self {
        Self {
            matrix,
            ..Self::IDENTITY
        }
    }

    pub fn from_alpha(alpha: f64) -> Self {
        Self {
            alpha,
            ..Self::IDENTITY
        }
    }

    /// Reset to the identity matrix, full opacity, and [`TransformationKind::BOTH`].
    pub fn clear(&mut self) {
        *self = Self::IDENTITY;
    }

    pub fn set(&mut self, other: &Transformation) {
        *self = *other;
    }

    /// Apply `other` before this transformation.
    ///
    /// The matrix is pre-concatenated, so points are first transformed by `other`, then by
    /// `self`. Alpha values multiply.
    pub fn compose(&mut self, other: &Transformation) {
        self.alpha *= other.alpha;
        self.matrix = self.matrix * other.matrix;
    }

    /// Apply `other` after this transformation.
    pub fn post_compose(&mut self, other: &Transformation) {
        self.alpha *= other.alpha;
        self.matrix = other.matrix * self.matrix;
    }

    pub fn matrix(&self) -> &Affine2 {
        &self.matrix
    }

    pub fn matrix_mut(&mut self) -> &mut Affine2 {
        &mut self.matrix
    }

    pub fn set_matrix(&mut self, matrix: Affine2) {
        self.matrix = matrix;
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    pub fn kind(&self) -> TransformationKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: TransformationKind) {
        self.kind = kind;
    }

    pub fn transform_point(&self, point: Point) -> Point {
        self.matrix.transform_point2(point.into()).into()
    }
}

impl Mul for Transformation {
    type Output = Transformation;

    fn mul(mut self, rhs: Transformation) -> Self::Output {
        self.compose(&rhs);
        self
    }
}

impl MulAssign for Transformation {
    fn mul_assign(&mut self, rhs: Transformation) {
        self.compose(&rhs);
    }
}

impl From<Affine2> for Transformation {
    fn from(matrix: Affine2) -> Self {
        Self::from_matrix(matrix)
    }
}
