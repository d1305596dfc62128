//! Request lifecycle manager: submissions, status transitions, dispatch
use crate::error::{Outcome, StockError};
use crate::ledger::InventoryLedger;
use crate::request::{NewRequest, Request, RequestStatus};
use crate::store::StockStore;
use tracing::{info, warn};

/// Per-status tallies for the request queue header.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub dispatched: usize,
    pub cancelled: usize,
}

/// Owns request state transitions and the dispatch-time reconciliation with
/// the inventory ledger. Never touches product quantities directly; dispatch
/// goes through the ledger's decrease and only marks the request on success.
pub struct RequestLifecycle {
    store: StockStore,
    requests: Vec<Request>,
}

impl RequestLifecycle {
    pub fn open(store: StockStore) -> Result<Self, StockError> {
        let mut lifecycle = Self {
            store,
            requests: Vec::new(),
        };
        lifecycle.refresh()?;
        Ok(lifecycle)
    }

    pub fn refresh(&mut self) -> Result<(), StockError> {
        self.requests = self.store.list_requests()?;
        Ok(())
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn find(&self, id: &str) -> Option<&Request> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for request in &self.requests {
            match request.status {
                RequestStatus::Pending => counts.pending += 1,
                RequestStatus::Approved => counts.approved += 1,
                RequestStatus::Dispatched => counts.dispatched += 1,
                RequestStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }

    /// Submit a new request. Stock is not reserved here; availability is a
    /// soft limit until dispatch, so over-requesting only logs a warning.
    pub fn submit(
        &mut self,
        new_request: NewRequest,
        user_id: &str,
        ledger: &InventoryLedger,
    ) -> Outcome {
        self.try_submit(new_request, user_id, ledger).into()
    }

    fn try_submit(
        &mut self,
        new_request: NewRequest,
        user_id: &str,
        ledger: &InventoryLedger,
    ) -> Result<String, StockError> {
        if new_request.requested_quantity == 0 {
            return Err(StockError::Validation(
                "Requested quantity must be at least 1".into(),
            ));
        }
        let product = ledger
            .find(&new_request.product_id)
            .ok_or_else(|| StockError::ProductNotFound(new_request.product_id.clone()))?;

        if new_request.requested_quantity > product.quantity {
            warn!(
                sku = %product.sku,
                requested = new_request.requested_quantity,
                available = product.quantity,
                "requested quantity exceeds available stock"
            );
        }

        let request = Request::from_submission(new_request, user_id)?;
        self.store.put_request(&request)?;
        self.refresh()?;

        info!(request_id = %request.id, "request submitted");
        Ok("Request submitted successfully!".into())
    }

    /// Move a request through the transition table. Dispatched is not a legal
    /// target here; that transition only happens through [`Self::dispatch`],
    /// which settles the stock first.
    pub fn set_status(&mut self, request_id: &str, status: RequestStatus) -> Outcome {
        self.try_set_status(request_id, status).into()
    }

    fn try_set_status(
        &mut self,
        request_id: &str,
        status: RequestStatus,
    ) -> Result<String, StockError> {
        let mut request = self
            .find(request_id)
            .cloned()
            .ok_or_else(|| StockError::RequestNotFound(request_id.to_owned()))?;

        if status == RequestStatus::Dispatched {
            return Err(StockError::Validation(
                "Requests are dispatched through the dispatch operation".into(),
            ));
        }
        if !request.status.can_transition_to(status) {
            return Err(StockError::IllegalTransition {
                from: request.status,
                to: status,
            });
        }

        request.status = status;
        self.store.put_request(&request)?;
        self.refresh()?;

        info!(request_id, %status, "request status updated");
        Ok(format!("Request {status} successfully"))
    }

    /// Fulfil an approved request: decrement matching stock, then mark the
    /// request dispatched. The order matters; the status only changes after
    /// the ledger reports the stock actually moved. On a failed decrease the
    /// request stays approved and the reason is surfaced to the caller.
    pub fn dispatch(&mut self, request_id: &str, ledger: &mut InventoryLedger) -> Outcome {
        self.try_dispatch(request_id, ledger).into()
    }

    fn try_dispatch(
        &mut self,
        request_id: &str,
        ledger: &mut InventoryLedger,
    ) -> Result<String, StockError> {
        let mut request = self
            .find(request_id)
            .cloned()
            .ok_or_else(|| StockError::RequestNotFound(request_id.to_owned()))?;

        if !request.status.can_transition_to(RequestStatus::Dispatched) {
            return Err(StockError::IllegalTransition {
                from: request.status,
                to: RequestStatus::Dispatched,
            });
        }

        let message = ledger.try_decrease(&request.product_id, request.requested_quantity)?;

        request.status = RequestStatus::Dispatched;
        self.store.put_request(&request)?;
        self.refresh()?;

        info!(request_id, "request dispatched");
        Ok(message)
    }

    /// Cleanup delete, any status. Removing a dispatched request does not
    /// restore the decremented stock.
    pub fn remove(&mut self, request_id: &str) -> Outcome {
        self.try_remove(request_id).into()
    }

    fn try_remove(&mut self, request_id: &str) -> Result<String, StockError> {
        if let Some(request) = self.find(request_id) {
            if request.status == RequestStatus::Dispatched {
                warn!(request_id, "removing a dispatched request; stock deduction stays");
            }
        }
        if !self.store.delete_request(request_id)? {
            return Err(StockError::RequestNotFound(request_id.to_owned()));
        }
        self.refresh()?;

        info!(request_id, "request removed");
        Ok("Request removed successfully".into())
    }

    pub fn clear_all(&mut self) -> Outcome {
        self.try_clear_all().into()
    }

    fn try_clear_all(&mut self) -> Result<String, StockError> {
        self.store.clear_requests()?;
        self.refresh()?;
        Ok("All requests cleared successfully".into())
    }
}
