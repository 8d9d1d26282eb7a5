use crate::{Activation, ValueRange};

/// Position of a layer within a network.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    derive_more::IsVariant,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    #[display("input")]
    Input,
    #[display("hidden")]
    Hidden,
    #[display("output")]
    Output,
}

/// Size, activation and initialization ranges of a trainable layer.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerParams {
    pub size: usize,
    pub activation: Activation,
    /// Range for the weights feeding into this layer, also used when mutating them.
    pub weight_range: ValueRange,
    /// Range for this layer's biases, also used when mutating them.
    pub bias_range: ValueRange,
}

/// Declarative description of one layer of a [`NeuralNetwork`](crate::NeuralNetwork).
///
/// The input layer only carries a size; it has no weights, biases or activation.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Layer {
    Input { size: usize },
    Hidden(LayerParams),
    Output(LayerParams),
}

impl Layer {
    #[must_use]
    pub const fn input(size: usize) -> Self {
        Self::Input { size }
    }

    #[must_use]
    pub const fn hidden(
        size: usize,
        activation: Activation,
        weight_range: ValueRange,
        bias_range: ValueRange,
    ) -> Self {
        Self::Hidden(LayerParams {
            size,
            activation,
            weight_range,
            bias_range,
        })
    }

    #[must_use]
    pub const fn output(
        size: usize,
        activation: Activation,
        weight_range: ValueRange,
        bias_range: ValueRange,
    ) -> Self {
        Self::Output(LayerParams {
            size,
            activation,
            weight_range,
            bias_range,
        })
    }

    #[must_use]
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Input { .. } => LayerKind::Input,
            Self::Hidden(_) => LayerKind::Hidden,
            Self::Output(_) => LayerKind::Output,
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Input { size } => *size,
            Self::Hidden(params) | Self::Output(params) => params.size,
        }
    }

    /// Activation of the layer; the input layer passes values through unchanged.
    #[must_use]
    pub fn activation(&self) -> Activation {
        self.params()
            .map_or(Activation::Linear, |params| params.activation)
    }

    /// Parameters of a trainable layer, `None` for the input layer.
    #[must_use]
    pub fn params(&self) -> Option<&LayerParams> {
        match self {
            Self::Input { .. } => None,
            Self::Hidden(params) | Self::Output(params) => Some(params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: ValueRange = ValueRange::new(-1.0, 1.0);

    #[test]
    fn test_accessors() {
        let input = Layer::input(5);
        assert_eq!(input.kind(), LayerKind::Input);
        assert_eq!(input.size(), 5);
        assert_eq!(input.activation(), Activation::Linear);
        assert!(input.params().is_none());

        let hidden = Layer::hidden(4, Activation::Relu, RANGE, RANGE);
        assert!(hidden.kind().is_hidden());
        assert_eq!(hidden.size(), 4);
        assert_eq!(hidden.activation(), Activation::Relu);

        let output = Layer::output(2, Activation::Sigmoid, RANGE, ValueRange::new(0.0, 0.5));
        assert!(output.kind().is_output());
        assert_eq!(output.params().map(|p| p.bias_range.high), Some(0.5));
    }

    #[test]
    fn test_serde_layout() {
        let json = serde_json::to_value(Layer::input(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "input", "size": 3 }));

        let layer = Layer::hidden(2, Activation::Tanh, RANGE, RANGE);
        let json = serde_json::to_string(&layer).unwrap();
        let back: Layer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layer);
    }
}
