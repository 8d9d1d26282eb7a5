use crate::Matrix;

/// Scalar activation applied element-wise after a layer's affine transform.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// Identity.
    #[default]
    #[display("linear")]
    Linear,
    /// `max(0, x)`.
    #[display("relu")]
    Relu,
    #[display("sigmoid")]
    Sigmoid,
    #[display("tanh")]
    Tanh,
}

impl Activation {
    #[must_use]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Self::Linear => x,
            Self::Relu => x.max(0.0),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Tanh => x.tanh(),
        }
    }

    #[must_use]
    pub fn apply_matrix(self, matrix: &Matrix) -> Matrix {
        match self {
            Self::Linear => matrix.clone(),
            _ => matrix.map(|x| self.apply(x)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relu() {
        assert_eq!(Activation::Relu.apply(-3.0), 0.0);
        assert_eq!(Activation::Relu.apply(0.0), 0.0);
        assert_eq!(Activation::Relu.apply(2.5), 2.5);
    }

    #[test]
    fn test_linear_is_identity() {
        for x in [-10.0, -0.5, 0.0, 0.5, 10.0] {
            assert_eq!(Activation::Linear.apply(x), x);
        }
    }

    #[test]
    fn test_squashing_functions() {
        assert!((Activation::Sigmoid.apply(0.0) - 0.5).abs() < 1e-6);
        assert!(Activation::Sigmoid.apply(50.0) <= 1.0);
        assert!(Activation::Sigmoid.apply(-50.0) >= 0.0);
        assert_eq!(Activation::Tanh.apply(0.0), 0.0);
        assert!(Activation::Tanh.apply(-50.0) >= -1.0);
    }

    #[test]
    fn test_apply_matrix() {
        let m = Matrix::from_vec(2, 1, vec![-1.0, 1.0]).unwrap();
        assert_eq!(Activation::Relu.apply_matrix(&m).to_vec(), vec![0.0, 1.0]);
        assert_eq!(Activation::Linear.apply_matrix(&m), m);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Activation::Relu).unwrap(), "\"relu\"");
        let act: Activation = serde_json::from_str("\"sigmoid\"").unwrap();
        assert_eq!(act, Activation::Sigmoid);
        assert_eq!(Activation::Tanh.to_string(), "tanh");
    }
}
