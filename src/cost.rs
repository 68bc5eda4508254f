//! Character-based cost estimation.
//!
//! Rates follow Gemini Flash pay-per-character pricing, applied per 1,000
//! characters of prompt and completion text. The estimates are advisory;
//! nothing in the pipeline gates on them.

use tracing::{info, warn};

use crate::chunking::Document;
use crate::llm::LLM;

pub const INPUT_COST_PER_1K_CHARS: f64 = 0.000125;
pub const OUTPUT_COST_PER_1K_CHARS: f64 = 0.000375;

/// Estimated cost of one prompt/completion exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RequestCost {
    pub input_chars: usize,
    pub output_chars: usize,
    pub input_cost: f64,
    pub output_cost: f64,
}

impl RequestCost {
    pub fn for_exchange(input_chars: usize, output_chars: usize) -> Self {
        Self {
            input_chars,
            output_chars,
            input_cost: (input_chars as f64 / 1000.0) * INPUT_COST_PER_1K_CHARS,
            output_cost: (output_chars as f64 / 1000.0) * OUTPUT_COST_PER_1K_CHARS,
        }
    }

    pub fn total(&self) -> f64 {
        self.input_cost + self.output_cost
    }

    /// Log the exchange breakdown at info level.
    pub fn log_details(&self) {
        info!("Input characters: {}", self.input_chars);
        info!("Input cost: ${:.6}", self.input_cost);
        info!("Output characters: {}", self.output_chars);
        info!("Output cost: ${:.6}", self.output_cost);
        info!("Total cost: ${:.6}", self.total());
    }
}

/// Sum the billable units of every document, asking the provider one
/// document at a time. A failed count is logged and contributes zero so
/// one bad request cannot sink the whole tally.
pub async fn total_billable_units(llm: &dyn LLM, documents: &[Document]) -> u64 {
    if documents.is_empty() {
        return 0;
    }

    info!("Counting total billable characters...");
    let mut total = 0u64;
    for document in documents {
        match llm.count_billable_units(&document.content).await {
            Ok(count) => total += count,
            Err(e) => warn!("⚠️ Billable character count failed: {}", e),
        }
    }
    total
}
