//! Non-reentrant critical sections.
//!
//! The marker lives in task-local storage, so it follows the call stack of
//! one task: a collaborator that calls back into a guarded section from
//! inside it is rejected, while independent callers run side by side.

use crate::error::GuardError;
use std::future::Future;

tokio::task_local! {
	static ENTERED: ();
}

/// Runs `section` unless the current task is already inside one.
pub(crate) async fn non_reentrant<F, T>(section: F) -> Result<T, GuardError>
where
	F: Future<Output = Result<T, GuardError>>,
{
	if ENTERED.try_with(|_| ()).is_ok() {
		return Err(GuardError::Reentrancy);
	}
	ENTERED.scope((), section).await
}
