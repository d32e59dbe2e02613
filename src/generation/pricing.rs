//! Static USD prices per token.
//!
//! Model ids returned by providers often carry a date suffix (`gpt-4o-mini-2024-07-18`),
//! so lookups fall back to the longest known name that prefixes the id at a `-` boundary.

use super::Generation;

/// Which side of a call the tokens were billed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceKind {
    Input,
    Output,
    /// Undifferentiated usage (embeddings, or a chat total split 50/50).
    Usage,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Rates {
    Chat { input: f64, output: f64 },
    Embedding { usage: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ModelPricing {
    model: &'static str,
    rates: Rates,
}

const PER_MILLION: f64 = 1_000_000.0;

const PRICING: &[ModelPricing] = &[
    ModelPricing {
        model: "gpt-4o-mini",
        rates: Rates::Chat {
            input: 0.150 / PER_MILLION,
            output: 0.600 / PER_MILLION,
        },
    },
    ModelPricing {
        model: "gpt-4o",
        rates: Rates::Chat {
            input: 2.50 / PER_MILLION,
            output: 10.00 / PER_MILLION,
        },
    },
    ModelPricing {
        model: "text-embedding-3-small",
        rates: Rates::Embedding {
            usage: 0.020 / PER_MILLION,
        },
    },
];

fn pricing_for(model: &str) -> Option<&'static ModelPricing> {
    if let Some(exact) = PRICING.iter().find(|p| p.model == model) {
        return Some(exact);
    }

    PRICING
        .iter()
        .filter(|p| {
            model
                .strip_prefix(p.model)
                .is_some_and(|rest| rest.starts_with('-'))
        })
        .max_by_key(|p| p.model.len())
}

/// Returns `true` when `model` has a known price.
pub fn is_priced(model: &str) -> bool {
    pricing_for(model).is_some()
}

/// Cost in USD of `tokens` billed as `kind` on `model`; unknown models cost 0.
pub fn calculate_cost(tokens: u32, model: &str, kind: PriceKind) -> f64 {
    let Some(pricing) = pricing_for(model) else {
        return 0.0;
    };
    let tokens = tokens as f64;

    match (pricing.rates, kind) {
        (Rates::Embedding { usage }, _) => tokens * usage,
        (Rates::Chat { input, .. }, PriceKind::Input) => tokens * input,
        (Rates::Chat { output, .. }, PriceKind::Output) => tokens * output,
        (Rates::Chat { input, output }, PriceKind::Usage) => tokens * (input + output) / 2.0,
    }
}

/// Input plus output cost of a completed generation.
pub fn generation_cost(generation: &Generation) -> f64 {
    calculate_cost(generation.prompt_tokens, &generation.model, PriceKind::Input)
        + calculate_cost(
            generation.completion_tokens,
            &generation.model,
            PriceKind::Output,
        )
}
