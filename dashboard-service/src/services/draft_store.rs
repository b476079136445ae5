use crate::error::OrderError;
use crate::models::purchase_order::new_order_id;
use crate::models::PurchaseOrder;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Draft {
    order: PurchaseOrder,
    /// Set while the order is with the backend; edits and resubmits get 409.
    submitting: bool,
}

/// In-memory drafts keyed by order id. Lost on restart.
///
/// Sent orders stay in the store so later edits are refused and their ids
/// are never handed to another draft.
#[derive(Clone, Default)]
pub struct DraftStore {
    drafts: Arc<DashMap<String, Draft>>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new draft and return it as stored. An id that is already
    /// taken is replaced with a freshly generated one.
    pub fn insert(&self, mut order: PurchaseOrder) -> PurchaseOrder {
        if let Entry::Vacant(slot) = self.drafts.entry(order.id.clone()) {
            slot.insert(Draft {
                order: order.clone(),
                submitting: false,
            });
            return order;
        }

        let taken = std::mem::replace(&mut order.id, new_order_id());
        tracing::warn!(taken_id = %taken, order_id = %order.id, "Draft id already in use; assigned a new one");
        self.drafts.insert(
            order.id.clone(),
            Draft {
                order: order.clone(),
                submitting: false,
            },
        );
        order
    }

    pub fn get(&self, id: &str) -> Result<PurchaseOrder, OrderError> {
        self.drafts
            .get(id)
            .map(|entry| entry.order.clone())
            .ok_or_else(|| OrderError::OrderNotFound(id.to_string()))
    }

    /// Apply `edit` under the entry lock and return the resulting order.
    /// Must not be given anything that awaits.
    pub fn edit<F>(&self, id: &str, edit: F) -> Result<PurchaseOrder, OrderError>
    where
        F: FnOnce(&mut PurchaseOrder) -> Result<(), OrderError>,
    {
        let mut entry = self
            .drafts
            .get_mut(id)
            .ok_or_else(|| OrderError::OrderNotFound(id.to_string()))?;
        if entry.submitting {
            return Err(OrderError::SubmitInProgress(id.to_string()));
        }
        edit(&mut entry.order)?;
        Ok(entry.order.clone())
    }

    /// Claim a stored draft for submission. Returns `Ok(None)` when no draft
    /// has this id. While the returned [`Submission`] is alive the draft
    /// refuses edits and further claims; dropping it without
    /// [`Submission::complete`] releases the claim.
    pub fn begin_submit(
        &self,
        id: &str,
    ) -> Result<Option<(PurchaseOrder, Submission)>, OrderError> {
        let Some(mut entry) = self.drafts.get_mut(id) else {
            return Ok(None);
        };
        if entry.submitting {
            return Err(OrderError::SubmitInProgress(id.to_string()));
        }
        entry.order.ensure_editable()?;
        entry.submitting = true;

        let submission = Submission {
            store: self.clone(),
            id: id.to_string(),
            completed: false,
        };
        Ok(Some((entry.order.clone(), submission)))
    }

    fn release(&self, id: &str) {
        if let Some(mut entry) = self.drafts.get_mut(id) {
            entry.submitting = false;
        }
    }
}

/// Claim on a draft that is being handed to the backend.
pub struct Submission {
    store: DraftStore,
    id: String,
    completed: bool,
}

impl Submission {
    /// Store exactly what the backend accepted, marked sent.
    pub fn complete(mut self, submitted: &PurchaseOrder) {
        if let Some(mut entry) = self.store.drafts.get_mut(&self.id) {
            entry.order = submitted.clone();
            entry.order.mark_sent();
            entry.submitting = false;
        }
        self.completed = true;
    }
}

impl Drop for Submission {
    fn drop(&mut self) {
        if !self.completed {
            self.store.release(&self.id);
        }
    }
}
