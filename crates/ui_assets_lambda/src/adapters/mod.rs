pub mod callback;
pub mod object_store;
pub mod s3;

use std::future::Future;

/// Drives an SDK future to completion from the synchronous adapter traits.
///
/// Requires the multi-thread Tokio runtime the Lambda binary starts.
pub(crate) fn run_blocking<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
