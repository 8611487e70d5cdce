//! Action execution with optimistic commitment. Declared postconditions
//! enter the commitment set before the device runs; on failure exactly
//! those propositions are subtracted again, so a failed action leaves the
//! shared state as if it had never been attempted.

use tracing::{debug, error, warn};

use crate::domain::Domain;
use crate::error::EngineError;
use crate::semantics::{ActionOutcome, ActionStatus, IcmContent, IcmLevel, IcmPolarity};
use crate::state::{AgendaItem, InformationState};

use super::collaborators::Device;

/// Runs queued actions from the front until one is not ready. Confirmed
/// actions always run; pending ones run only when the domain does not
/// flag them critical.
pub(super) async fn execute_ready<D: Device>(
    device: &mut D,
    domain: &dyn Domain,
    mut state: InformationState,
) -> Result<InformationState, EngineError> {
    loop {
        let instance = match state.private.actions.front() {
            Some(i) => i.clone(),
            None => break,
        };
        let ready = match instance.status {
            ActionStatus::Confirmed => true,
            ActionStatus::Pending => !domain.critical(&instance.action),
            _ => false,
        };
        if !ready {
            break;
        }

        let declared = domain.postcond(&instance.action);
        for p in &declared {
            state = state.commit(p.clone());
        }
        debug!(action = %instance.action.name, id = %instance.id, "executing action");

        let result = device
            .execute(&instance.action, &state)
            .await
            .map_err(|e| {
                error!(action = %instance.action.name, error = %e, "device failed");
                EngineError::Device(e)
            })?;

        let (_, rest) = state.private.actions.pop_front();
        state.private.actions = rest;

        match result.outcome {
            ActionOutcome::Success => {
                let mut next = state;
                for p in result.postconditions {
                    next.private.beliefs = next.private.beliefs.add(p);
                }
                next.private.completed = next
                    .private
                    .completed
                    .push_back(instance.with_status(ActionStatus::Executed(ActionOutcome::Success)));
                state = next.push_agenda(AgendaItem::ConfirmAction(instance.action.clone()));
                debug!(action = %instance.action.name, "action succeeded");
            }
            ActionOutcome::Failure => {
                let mut next = state;
                for p in &declared {
                    next.shared.com = next.shared.com.remove(p);
                }
                next.private.completed = next
                    .private
                    .completed
                    .push_back(instance.with_status(ActionStatus::RolledBack));
                let reason = result
                    .error
                    .unwrap_or_else(|| format!("{} failed", instance.action.name));
                warn!(action = %instance.action.name, %reason, "action failed, commitments rolled back");
                state = next.push_agenda(AgendaItem::Icm {
                    level: IcmLevel::Acceptance,
                    polarity: IcmPolarity::Negative,
                    content: Some(IcmContent::Text(reason)),
                });
            }
        }
    }
    Ok(state)
}
