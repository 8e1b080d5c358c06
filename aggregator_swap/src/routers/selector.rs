use std::{collections::HashMap, sync::Arc};

use error_stack::report;
use rust_decimal::Decimal;
use tracing::info;

use crate::{
    error::{AggregatorResult, Error},
    routers::{ProviderKind, QuoteProvider},
};

/// At or above the threshold the permit based provider wins, below it the
/// cheaper allowance based one does.
pub fn select_provider_kind(amount_usd: Decimal, threshold_usd: Decimal) -> ProviderKind {
    if amount_usd >= threshold_usd {
        ProviderKind::ZeroX
    } else {
        ProviderKind::OneInch
    }
}

#[derive(Clone)]
pub struct AggregatorSelector {
    threshold_usd: Decimal,
    providers: HashMap<ProviderKind, Arc<dyn QuoteProvider>>,
}

impl AggregatorSelector {
    pub fn new(threshold_usd: Decimal) -> Self {
        Self {
            threshold_usd,
            providers: HashMap::new(),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn QuoteProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn threshold_usd(&self) -> Decimal {
        self.threshold_usd
    }

    pub fn select(&self, amount_usd: Decimal) -> AggregatorResult<Arc<dyn QuoteProvider>> {
        let kind = select_provider_kind(amount_usd, self.threshold_usd);
        info!(
            "Trade worth {amount_usd} USD (threshold {}), using {kind}",
            self.threshold_usd
        );
        self.providers.get(&kind).cloned().ok_or_else(|| {
            report!(Error::ConfigurationError(format!(
                "No provider registered for {kind}"
            )))
        })
    }
}
