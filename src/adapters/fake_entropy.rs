use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::error::EntropyError;
use crate::ports::EntropySource;

type Outcome = Result<Vec<u8>, EntropyError>;

/// Source that settles only when the test says so
#[derive(Debug)]
pub struct DeferredEntropySource {
    receiver: Mutex<Option<oneshot::Receiver<Outcome>>>,
    pub requests: Arc<AtomicUsize>,
}

/// Controls a [`DeferredEntropySource`]
#[derive(Debug)]
pub struct DeferredEntropyHandle {
    sender: oneshot::Sender<Outcome>,
}

impl DeferredEntropySource {
    pub fn new() -> (Self, DeferredEntropyHandle) {
        let (sender, receiver) = oneshot::channel();
        let source = Self {
            receiver: Mutex::new(Some(receiver)),
            requests: Arc::new(AtomicUsize::new(0)),
        };
        (source, DeferredEntropyHandle { sender })
    }
}

impl DeferredEntropyHandle {
    pub fn release(self, bytes: Vec<u8>) {
        let _ = self.sender.send(Ok(bytes));
    }

    pub fn fail(self, err: EntropyError) {
        let _ = self.sender.send(Err(err));
    }
}

#[async_trait]
impl EntropySource for DeferredEntropySource {
    fn name(&self) -> &'static str {
        "deferred"
    }

    fn is_secure(&self) -> bool {
        true
    }

    async fn provide(&self, _length: usize) -> Result<Vec<u8>, EntropyError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let receiver = self.receiver.lock().unwrap().take();
        let Some(receiver) = receiver else {
            return Err(EntropyError::SourceFailed {
                source_name: "deferred".to_string(),
                reason: "already consumed".to_string(),
            });
        };
        receiver.await.unwrap_or(Err(EntropyError::ChannelClosed))
    }
}

/// Source that answers immediately with a fixed byte
#[derive(Debug, Clone, Default)]
pub struct FixedEntropySource {
    pub fill: u8,
    pub fail_with: Option<EntropyError>,
    pub requests: Arc<AtomicUsize>,
}

impl FixedEntropySource {
    pub fn new(fill: u8) -> Self {
        Self {
            fill,
            ..Self::default()
        }
    }

    pub fn failing(err: EntropyError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntropySource for FixedEntropySource {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn is_secure(&self) -> bool {
        true
    }

    async fn provide(&self, length: usize) -> Result<Vec<u8>, EntropyError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(vec![self.fill; length]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::async_contract_tests_for;
    use crate::ports::contract_tests::entropy_contract;

    async_contract_tests_for!(
        fixed_entropy_contract,
        make = || FixedEntropySource::new(9),
        tests = {
            test_provides_requested_length => entropy_contract::test_provides_requested_length,
            test_provides_zero_length => entropy_contract::test_provides_zero_length,
        }
    );

    #[tokio::test]
    async fn test_deferred_settles_on_release() {
        let (source, handle) = DeferredEntropySource::new();
        handle.release(vec![1, 2, 3]);
        assert_eq!(source.provide(3).await.unwrap(), vec![1, 2, 3]);
        assert!(source.provide(3).await.is_err());
    }
}
