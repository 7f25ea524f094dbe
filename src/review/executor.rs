use crate::checks::{CheckRegistry, Invocation, Sink};
use crate::errors::ReviewError;

/// Run `invocations` one after another against `sink`.
///
/// Returns `true` when any check reported a non-zero status. An unknown check
/// name aborts the batch with an error; checks already run keep their output.
pub async fn execute(
    registry: &CheckRegistry,
    invocations: &[Invocation],
    sink: &mut Sink,
) -> Result<bool, ReviewError> {
    let mut failed = false;
    for invocation in invocations {
        let check = registry.find(&invocation.check)?;
        let status = check.run(invocation, sink).await?;
        if status != 0 {
            tracing::debug!(check = %invocation.check, status, "check failed");
            failed = true;
        }
    }
    Ok(failed)
}
