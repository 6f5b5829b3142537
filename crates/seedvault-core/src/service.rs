//! Chain collaborator interface
//!
//! Balance lookups and transaction broadcast belong to a chain service
//! outside this crate. Only the interface lives here.

/// Network access for one chain
pub trait ChainService {
    type Error: std::error::Error;

    /// Balance of `address` in the chain's base unit (lamports, wei)
    fn balance(&self, address: &str) -> Result<u128, Self::Error>;

    /// Submit a signed transaction and return its id
    fn broadcast(&self, signed_tx: &[u8]) -> Result<String, Self::Error>;
}

impl<T: ChainService + ?Sized> ChainService for &T {
    type Error = T::Error;

    fn balance(&self, address: &str) -> Result<u128, Self::Error> {
        (**self).balance(address)
    }

    fn broadcast(&self, signed_tx: &[u8]) -> Result<String, Self::Error> {
        (**self).broadcast(signed_tx)
    }
}
