use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Copy, Clone, Default)]
#[serde(tag = "type")]
pub enum Activation {
    #[default]
    #[serde(rename = "ReLU")]
    RELU,
    #[serde(rename = "GELU")]
    GELU,
    #[serde(rename = "SiLU")]
    SILU {
        #[serde(default = "default_silu_alpha")]
        alpha: f32,
    },
}

fn default_silu_alpha() -> f32 {
    1.0
}

#[cfg(test)]
mod tests {
    use serde_json::from_str;

    use super::Activation;

    #[test]
    fn test_activation_tags() {
        assert_eq!(from_str::<Activation>(r#"{"type": "ReLU"}"#).unwrap(), Activation::RELU);
        assert_eq!(from_str::<Activation>(r#"{"type": "GELU"}"#).unwrap(), Activation::GELU);
        assert_eq!(
            from_str::<Activation>(r#"{"type": "SiLU"}"#).unwrap(),
            Activation::SILU {
                alpha: 1.0
            }
        );
        assert_eq!(
            from_str::<Activation>(r#"{"type": "SiLU", "alpha": 1.5}"#).unwrap(),
            Activation::SILU {
                alpha: 1.5
            }
        );
    }
}
