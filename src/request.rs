//! Stock request records and the status transition table
use crate::error::StockError;
use crate::product::TimeStamp;
use crate::utils;
use chrono::Utc;
use std::fmt;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    #[n(0)]
    Pending,
    #[n(1)]
    Approved,
    #[n(2)]
    Dispatched,
    #[n(3)]
    Cancelled,
}

impl RequestStatus {
    /// The full transition table. Dispatched and Cancelled are terminal;
    /// everything not listed here is rejected by the lifecycle manager.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::{Approved, Cancelled, Dispatched, Pending};

        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Cancelled)
                | (Approved, Dispatched)
                | (Approved, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Dispatched | RequestStatus::Cancelled)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Dispatched => "dispatched",
            RequestStatus::Cancelled => "cancelled",
        };
        write!(f, "{label}")
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Request {
    #[n(0)]
    pub id: String, // bech32-encoded uuid7, assigned on submit
    #[n(1)]
    pub user_id: String, // the requester, owned by the identity layer
    #[n(2)]
    pub product_id: String,
    #[n(3)]
    pub shop_name: String,
    #[n(4)]
    pub shop_location: String,
    #[n(5)]
    pub requested_quantity: u32,
    #[n(6)]
    pub status: RequestStatus,
    #[n(7)]
    pub notes: Option<String>,
    #[n(8)]
    pub created_at: TimeStamp<Utc>,
}

/// What a shop fills in when asking for stock. Id, status and timestamp are
/// assigned on submit.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub product_id: String,
    pub shop_name: String,
    pub shop_location: String,
    pub requested_quantity: u32,
    pub notes: Option<String>,
}

impl Request {
    pub(crate) fn from_submission(new: NewRequest, user_id: &str) -> Result<Self, StockError> {
        Ok(Self {
            id: utils::new_uuid_to_bech32("req_")?,
            user_id: user_id.to_owned(),
            product_id: new.product_id,
            shop_name: new.shop_name,
            shop_location: new.shop_location,
            requested_quantity: new.requested_quantity,
            status: RequestStatus::Pending,
            notes: new.notes,
            created_at: TimeStamp::new(),
        })
    }
}
