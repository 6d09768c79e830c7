//! Static price lookup for cost display
//!
//! Prices are per token. Reference: https://aws.amazon.com/bedrock/pricing/

use std::fmt;

/// Per-token prices for one model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input: f64,
    pub output: f64,
    pub currency_symbol: &'static str,
}

impl ModelPricing {
    /// Display estimate for a token count pair
    pub fn estimate(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        input_tokens as f64 * self.input + output_tokens as f64 * self.output
    }

    /// Estimate rendered with the currency symbol
    pub fn format_estimate(&self, input_tokens: u64, output_tokens: u64) -> String {
        format!(
            "{}{:.6}",
            self.currency_symbol,
            self.estimate(input_tokens, output_tokens)
        )
    }
}

impl fmt::Display for ModelPricing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "in {}{:.6}/1K, out {}{:.6}/1K",
            self.currency_symbol,
            self.input * 1000.0,
            self.currency_symbol,
            self.output * 1000.0
        )
    }
}

/// Bedrock model prices
pub const BEDROCK_PRICING: &[(&str, ModelPricing)] = &[
    (
        "us.anthropic.claude-3-5-haiku-20241022-v1:0",
        ModelPricing {
            input: 0.003 / 1000.0,
            output: 0.015 / 1000.0,
            currency_symbol: "$",
        },
    ),
    (
        "us.anthropic.claude-3-5-sonnet-20241022-v2:0",
        ModelPricing {
            input: 0.00025 / 1000.0,
            output: 0.00125 / 1000.0,
            currency_symbol: "$",
        },
    ),
    (
        "us.anthropic.claude-3-7-sonnet-20250219-v1:0",
        ModelPricing {
            input: 0.015 / 1000.0,
            output: 0.075 / 1000.0,
            currency_symbol: "$",
        },
    ),
];

/// Ollama model prices
pub const OLLAMA_PRICING: &[(&str, ModelPricing)] = &[(
    "qwen2.5-coder:3b",
    ModelPricing {
        input: 0.003 / 1000.0,
        output: 0.015 / 1000.0,
        currency_symbol: "$",
    },
)];

/// Look up a model in both tables
pub fn lookup(model: &str) -> Option<ModelPricing> {
    BEDROCK_PRICING
        .iter()
        .chain(OLLAMA_PRICING.iter())
        .find(|(id, _)| *id == model)
        .map(|(_, pricing)| *pricing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_models() {
        let haiku = lookup("us.anthropic.claude-3-5-haiku-20241022-v1:0").unwrap();
        assert!((haiku.input - 0.000003).abs() < 1e-12);
        assert!((haiku.output - 0.000015).abs() < 1e-12);
        assert_eq!(haiku.currency_symbol, "$");

        assert!(lookup("qwen2.5-coder:3b").is_some());
    }

    #[test]
    fn test_lookup_unknown_model() {
        assert!(lookup("llama3.1:8b").is_none());
    }

    #[test]
    fn test_estimate() {
        let pricing = lookup("us.anthropic.claude-3-7-sonnet-20250219-v1:0").unwrap();
        let cost = pricing.estimate(1000, 1000);
        assert!((cost - 0.09).abs() < 1e-9);
        assert_eq!(pricing.format_estimate(1000, 1000), "$0.090000");
    }
}
