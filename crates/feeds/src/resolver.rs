//! Contract address resolution across chains.

use crate::{ContractValidator, FeedError};
use lurker_core::ResolvedToken;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tries each validator in order until one recognises the address.
#[derive(Clone)]
pub struct TokenResolver {
    validators: Vec<Arc<dyn ContractValidator>>,
}

impl TokenResolver {
    pub fn new(validators: Vec<Arc<dyn ContractValidator>>) -> Self {
        Self { validators }
    }

    /// Resolve an address to a named token.
    ///
    /// - `Ok(Some)`: some validator recognised the address
    /// - `Ok(None)`: no validator recognised it (at least one answered cleanly)
    /// - `Err`: every validator failed; carries the last failure
    pub async fn resolve(&self, address: &str) -> Result<Option<ResolvedToken>, FeedError> {
        let mut last_error = None;
        let mut answered = false;

        for validator in &self.validators {
            let chain = validator.chain();
            match validator.token_name(address).await {
                Ok(Some(name)) => {
                    debug!(address = address, chain = %chain, name = %name, "Resolved contract");
                    return Ok(Some(ResolvedToken::new(name, chain)));
                }
                Ok(None) => {
                    answered = true;
                    debug!(address = address, chain = %chain, "Not a known token");
                }
                Err(e) => {
                    warn!(address = address, chain = %chain, error = %e, "Contract validation failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !answered => Err(e),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lurker_core::Chain;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Answer {
        Name(&'static str),
        Unknown,
        Fail,
    }

    struct FakeValidator {
        chain: Chain,
        answer: Answer,
        calls: AtomicUsize,
    }

    impl FakeValidator {
        fn new(chain: Chain, answer: Answer) -> Arc<Self> {
            Arc::new(Self {
                chain,
                answer,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ContractValidator for FakeValidator {
        fn chain(&self) -> Chain {
            self.chain
        }

        async fn token_name(&self, _address: &str) -> Result<Option<String>, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.answer {
                Answer::Name(name) => Ok(Some(name.to_string())),
                Answer::Unknown => Ok(None),
                Answer::Fail => Err(FeedError::Timeout("slow".to_string())),
            }
        }
    }

    fn resolver(eth: &Arc<FakeValidator>, sol: &Arc<FakeValidator>) -> TokenResolver {
        TokenResolver::new(vec![eth.clone() as Arc<dyn ContractValidator>, sol.clone()])
    }

    #[tokio::test]
    async fn test_first_validator_wins() {
        let eth = FakeValidator::new(Chain::Ethereum, Answer::Name("Pepe"));
        let sol = FakeValidator::new(Chain::Solana, Answer::Name("Other"));

        let token = resolver(&eth, &sol).resolve("0xabc").await.unwrap().unwrap();
        assert_eq!(token, ResolvedToken::new("Pepe", Chain::Ethereum));
        assert_eq!(sol.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_after_failure() {
        let eth = FakeValidator::new(Chain::Ethereum, Answer::Fail);
        let sol = FakeValidator::new(Chain::Solana, Answer::Name("dogwifhat"));

        let token = resolver(&eth, &sol).resolve("EKpQ").await.unwrap().unwrap();
        assert_eq!(token.chain, Chain::Solana);
        assert_eq!(token.hashtag().as_str(), "$DOGWIF");
    }

    #[tokio::test]
    async fn test_unknown_everywhere_is_not_found() {
        let eth = FakeValidator::new(Chain::Ethereum, Answer::Unknown);
        let sol = FakeValidator::new(Chain::Solana, Answer::Unknown);

        assert_eq!(resolver(&eth, &sol).resolve("0xdead").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_one_failure_one_unknown_is_not_found() {
        let eth = FakeValidator::new(Chain::Ethereum, Answer::Fail);
        let sol = FakeValidator::new(Chain::Solana, Answer::Unknown);

        assert_eq!(resolver(&eth, &sol).resolve("0xdead").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_all_failures_is_an_error() {
        let eth = FakeValidator::new(Chain::Ethereum, Answer::Fail);
        let sol = FakeValidator::new(Chain::Solana, Answer::Fail);

        let err = resolver(&eth, &sol).resolve("0xdead").await.unwrap_err();
        assert!(matches!(err, FeedError::Timeout(_)));
    }
}
