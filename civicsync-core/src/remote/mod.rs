pub mod protocol;
pub mod provider;
#[allow(clippy::module_inception)]
mod remote;

pub use remote::Remote;
