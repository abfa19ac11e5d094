//! Scoped transaction guard.
//!
//! A [`TxnGuard`] begins a transaction on construction and must be resolved
//! with [`TxnGuard::commit`] or [`TxnGuard::abort`], both of which consume
//! it. A guard released without either is a contract violation: it is
//! logged and the transaction is aborted.

use tracing::error;

/// Store capable of begin/commit/abort transactions.
pub trait Transactional {
    type Txn;
    type Error: std::error::Error;

    fn begin(&self) -> Result<Self::Txn, Self::Error>;

    fn commit(&self, txn: Self::Txn) -> Result<(), Self::Error>;

    fn abort(&self, txn: Self::Txn);
}

pub struct TxnGuard<'a, T: Transactional> {
    store: &'a T,
    txn: Option<T::Txn>,
}

impl<'a, T: Transactional> TxnGuard<'a, T> {
    pub fn begin(store: &'a T) -> Result<Self, T::Error> {
        let txn = store.begin()?;
        Ok(Self {
            store,
            txn: Some(txn),
        })
    }

    /// Open transaction. `None` only once the guard is being consumed.
    pub fn txn_mut(&mut self) -> Option<&mut T::Txn> {
        self.txn.as_mut()
    }

    pub fn commit(mut self) -> Result<(), T::Error> {
        match self.txn.take() {
            Some(txn) => self.store.commit(txn),
            None => Ok(()),
        }
    }

    pub fn abort(mut self) {
        if let Some(txn) = self.txn.take() {
            self.store.abort(txn);
        }
    }
}

impl<T: Transactional> Drop for TxnGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(txn) = self.txn.take() {
            error!("[qc-18] Transaction guard released without commit or abort");
            self.store.abort(txn);
        }
    }
}
