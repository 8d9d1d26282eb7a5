use std::{
    fmt, iter,
    ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};

use rand::Rng;

use crate::{MatrixError, ValueRange, crossover_gene};

/// Dense, fixed-shape matrix of `f32` stored in row-major order.
///
/// The shape is fixed at construction. Every operation returns a new matrix;
/// the scalar `+=`, `-=` and `*=` operators are shorthand for the corresponding
/// value-returning operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Creates a `rows`×`cols` matrix with every element set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f32) -> Result<Self, MatrixError> {
        check_shape(rows, cols)?;
        check_element(0, value)?;
        Ok(Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        })
    }

    /// Creates a matrix from `rows * cols` elements given in row-major order.
    ///
    /// # Examples
    ///
    /// ```
    /// use neuroflap_nn::Matrix;
    ///
    /// let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    /// assert_eq!(m.shape(), (2, 3));
    /// assert_eq!(m.get(1, 0), Some(4.0));
    /// assert!(Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0]).is_err());
    /// ```
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, MatrixError> {
        check_shape(rows, cols)?;
        if data.len() != rows * cols {
            return Err(MatrixError::LengthMismatch {
                rows,
                cols,
                len: data.len(),
            });
        }
        for (index, value) in data.iter().copied().enumerate() {
            check_element(index, value)?;
        }
        Ok(Self { rows, cols, data })
    }

    /// Creates a `rows`×`cols` matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, MatrixError> {
        Self::filled(rows, cols, 0.0)
    }

    /// Creates a column matrix (`values.len()`×1).
    pub fn column(values: &[f32]) -> Result<Self, MatrixError> {
        Self::from_vec(values.len(), 1, values.to_vec())
    }

    /// Creates a matrix whose elements are drawn independently and uniformly from `range`.
    pub fn random<R>(
        rows: usize,
        cols: usize,
        range: ValueRange,
        rng: &mut R,
    ) -> Result<Self, MatrixError>
    where
        R: Rng + ?Sized,
    {
        check_shape(rows, cols)?;
        range.validate()?;
        let data = iter::repeat_with(|| range.sample(rng))
            .take(rows * cols)
            .collect();
        Ok(Self { rows, cols, data })
    }

    /// Copies the elements of this matrix into a new matrix of shape `rows`×`cols`.
    ///
    /// The element count must be preserved.
    pub fn reshaped(&self, rows: usize, cols: usize) -> Result<Self, MatrixError> {
        Self::from_vec(rows, cols, self.data.clone())
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        (row < self.rows && col < self.cols).then(|| self.data[row * self.cols + col])
    }

    /// Returns the elements in row-major order.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Fails with [`MatrixError::InvalidElement`] on the first NaN or infinite element.
    ///
    /// Arithmetic such as [`scale`](Self::scale) or [`map`](Self::map) can overflow, so
    /// values computed after construction are not guaranteed to be finite.
    pub fn check_finite(&self) -> Result<(), MatrixError> {
        for (index, value) in self.data.iter().copied().enumerate() {
            check_element(index, value)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.clone()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Applies `f` to every element, preserving the shape.
    #[must_use]
    pub fn map<F>(&self, f: F) -> Self
    where
        F: FnMut(f32) -> f32,
    {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().copied().map(f).collect(),
        }
    }

    pub fn add(&self, other: &Matrix) -> Result<Self, MatrixError> {
        self.zip_map(other, "add", |a, b| a + b)
    }

    pub fn sub(&self, other: &Matrix) -> Result<Self, MatrixError> {
        self.zip_map(other, "sub", |a, b| a - b)
    }

    /// Element-wise (Hadamard) product.
    pub fn hadamard(&self, other: &Matrix) -> Result<Self, MatrixError> {
        self.zip_map(other, "hadamard", |a, b| a * b)
    }

    #[must_use]
    pub fn add_scalar(&self, value: f32) -> Self {
        self.map(|x| x + value)
    }

    #[must_use]
    pub fn sub_scalar(&self, value: f32) -> Self {
        self.map(|x| x - value)
    }

    #[must_use]
    pub fn scale(&self, factor: f32) -> Self {
        self.map(|x| x * factor)
    }

    #[must_use]
    pub fn negate(&self) -> Self {
        self.map(|x| -x)
    }

    pub fn div_scalar(&self, divisor: f32) -> Result<Self, MatrixError> {
        if divisor == 0.0 {
            return Err(MatrixError::DivisionByZero);
        }
        Ok(self.map(|x| x / divisor))
    }

    /// Matrix product. Requires `self.cols() == other.rows()`; the result is
    /// `self.rows()`×`other.cols()`.
    pub fn matmul(&self, other: &Matrix) -> Result<Self, MatrixError> {
        if self.cols != other.rows {
            return Err(MatrixError::ShapeMismatch {
                operation: "matmul",
                left: self.shape(),
                right: other.shape(),
            });
        }
        let mut data = vec![0.0; self.rows * other.cols];
        for (row, out) in data.chunks_exact_mut(other.cols).enumerate() {
            let lhs = &self.data[row * self.cols..(row + 1) * self.cols];
            for (k, &a) in lhs.iter().enumerate() {
                let rhs = &other.data[k * other.cols..(k + 1) * other.cols];
                for (o, &b) in iter::zip(out.iter_mut(), rhs) {
                    *o += a * b;
                }
            }
        }
        Ok(Self {
            rows: self.rows,
            cols: other.cols,
            data,
        })
    }

    #[must_use]
    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for col in 0..self.cols {
            data.extend((0..self.rows).map(|row| self.data[row * self.cols + col]));
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    /// Builds a new matrix by combining corresponding elements of `self` and `other`.
    ///
    /// For every element a roll is drawn uniformly from `[0, 1)` and passed to
    /// `combine(element, other_element, roll, rng)`.
    pub fn crossover_with<R, F>(
        &self,
        other: &Matrix,
        rng: &mut R,
        mut combine: F,
    ) -> Result<Self, MatrixError>
    where
        R: Rng + ?Sized,
        F: FnMut(f32, f32, f32, &mut R) -> f32,
    {
        self.check_same_shape(other, "crossover")?;
        let data = iter::zip(&self.data, &other.data)
            .map(|(&a, &b)| {
                let roll = rng.random::<f32>();
                combine(a, b, roll, rng)
            })
            .collect();
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// Genetic crossover of two matrices of identical shape.
    ///
    /// Every element is decided independently by [`crossover_gene`]: a fresh value from
    /// `range` with probability `mutation_rate`, otherwise the element of either parent
    /// with equal probability.
    pub fn crossover<R>(
        &self,
        other: &Matrix,
        mutation_rate: f32,
        range: ValueRange,
        rng: &mut R,
    ) -> Result<Self, MatrixError>
    where
        R: Rng + ?Sized,
    {
        if !(0.0..=1.0).contains(&mutation_rate) {
            return Err(MatrixError::InvalidMutationRate {
                rate: mutation_rate,
            });
        }
        range.validate()?;
        self.crossover_with(other, rng, |a, b, roll, rng| {
            crossover_gene(a, b, roll, mutation_rate, range, rng)
        })
    }

    fn zip_map<F>(
        &self,
        other: &Matrix,
        operation: &'static str,
        mut f: F,
    ) -> Result<Self, MatrixError>
    where
        F: FnMut(f32, f32) -> f32,
    {
        self.check_same_shape(other, operation)?;
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data: iter::zip(&self.data, &other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    fn check_same_shape(&self, other: &Matrix, operation: &'static str) -> Result<(), MatrixError> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(MatrixError::ShapeMismatch {
                operation,
                left: self.shape(),
                right: other.shape(),
            })
        }
    }
}

fn check_shape(rows: usize, cols: usize) -> Result<(), MatrixError> {
    if rows == 0 || cols == 0 {
        return Err(MatrixError::EmptyShape { rows, cols });
    }
    Ok(())
}

fn check_element(index: usize, value: f32) -> Result<(), MatrixError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MatrixError::InvalidElement { index, value })
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.data.chunks_exact(self.cols).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                if let Some(precision) = f.precision() {
                    write!(f, "{value:.precision$}")?;
                } else {
                    write!(f, "{value}")?;
                }
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl Add<f32> for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: f32) -> Matrix {
        self.add_scalar(rhs)
    }
}

impl Sub<f32> for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: f32) -> Matrix {
        self.sub_scalar(rhs)
    }
}

impl Mul<f32> for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: f32) -> Matrix {
        self.scale(rhs)
    }
}

impl Neg for &Matrix {
    type Output = Matrix;

    fn neg(self) -> Matrix {
        self.negate()
    }
}

impl Neg for Matrix {
    type Output = Matrix;

    fn neg(self) -> Matrix {
        self.negate()
    }
}

impl AddAssign<f32> for Matrix {
    fn add_assign(&mut self, rhs: f32) {
        *self = self.add_scalar(rhs);
    }
}

impl SubAssign<f32> for Matrix {
    fn sub_assign(&mut self, rhs: f32) {
        *self = self.sub_scalar(rhs);
    }
}

impl MulAssign<f32> for Matrix {
    fn mul_assign(&mut self, rhs: f32) {
        *self = self.scale(rhs);
    }
}
