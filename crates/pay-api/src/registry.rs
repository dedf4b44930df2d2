//! # Default Strategy Registry
//!
//! Wires the provider adapters to the shared store and coordinator and
//! registers one factory per strategy key.

use pay_core::{
    CheckoutStore, PaymentStrategyRegistry, SharedSubmissionCoordinator, Strategy,
    WalletPaymentAdapter, WalletProcessor,
};
use pay_cybersource::{
    CardinalScriptHost, CyberSourceConfig, CyberSourcePaymentAdapter, CyberSourceScriptLoader,
};
use std::sync::Arc;

/// Collaborators shared by every strategy in the registry
#[derive(Clone)]
pub struct StrategyDependencies {
    pub store: Arc<dyn CheckoutStore>,
    pub coordinator: SharedSubmissionCoordinator,
    pub script_host: Arc<dyn CardinalScriptHost>,
    pub cybersource: CyberSourceConfig,
    /// Wallet providers, keyed by strategy key
    pub wallets: Vec<(&'static str, Arc<dyn WalletProcessor>)>,
}

impl StrategyDependencies {
    pub fn new(
        store: Arc<dyn CheckoutStore>,
        coordinator: SharedSubmissionCoordinator,
        script_host: Arc<dyn CardinalScriptHost>,
    ) -> Self {
        Self {
            store,
            coordinator,
            script_host,
            cybersource: CyberSourceConfig::default(),
            wallets: Vec::new(),
        }
    }

    pub fn with_cybersource_config(mut self, config: CyberSourceConfig) -> Self {
        self.cybersource = config;
        self
    }

    /// Builder: register a wallet provider under `key`
    pub fn with_wallet(mut self, key: &'static str, processor: Arc<dyn WalletProcessor>) -> Self {
        self.wallets.push((key, processor));
        self
    }
}

/// Build the registry of every supported strategy
pub fn create_payment_strategy_registry(deps: StrategyDependencies) -> PaymentStrategyRegistry {
    let mut registry = PaymentStrategyRegistry::new();

    let cybersource = deps.clone();
    registry.register(pay_cybersource::strategy::PROVIDER_NAME, move || {
        let adapter = CyberSourcePaymentAdapter::new(
            Arc::clone(&cybersource.store),
            Arc::clone(&cybersource.coordinator),
            CyberSourceScriptLoader::new(Arc::clone(&cybersource.script_host)),
            cybersource.cybersource.clone(),
        );
        Strategy::boxed(adapter, Arc::clone(&cybersource.store))
    });

    for (key, processor) in deps.wallets.iter().cloned() {
        let store = Arc::clone(&deps.store);
        let coordinator = Arc::clone(&deps.coordinator);
        registry.register(key, move || {
            let adapter = WalletPaymentAdapter::new(
                key,
                Arc::clone(&processor),
                Arc::clone(&store),
                Arc::clone(&coordinator),
            );
            Strategy::boxed(adapter, Arc::clone(&store))
        });
    }

    registry
}
