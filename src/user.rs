//! Read-only identity context supplied by the external auth layer
use crate::error::StockError;
use crate::product::TimeStamp;
use crate::utils;
use chrono::Utc;
use std::fmt;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    #[n(0)]
    Admin,
    #[n(1)]
    Warehouse,
    #[n(2)]
    Shop,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum City {
    #[n(0)]
    Sydney,
    #[n(1)]
    Melbourne,
    #[n(2)]
    Brisbane,
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            City::Sydney => "SYDNEY",
            City::Melbourne => "MELBOURNE",
            City::Brisbane => "BRISBANE",
        };
        write!(f, "{label}")
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct User {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub username: String,
    #[n(2)]
    pub name: String,
    #[n(3)]
    pub role: Role,
    #[n(4)]
    pub city: Option<City>,
    #[n(5)]
    pub created_at: TimeStamp<Utc>,
}

impl User {
    /// Shop users carry the city their store belongs to; nobody else does.
    pub fn new(
        username: &str,
        name: &str,
        role: Role,
        city: Option<City>,
    ) -> Result<Self, StockError> {
        match (role, city) {
            (Role::Shop, None) => {
                return Err(StockError::Validation(
                    "Shop users must be assigned a city".into(),
                ));
            }
            (Role::Admin | Role::Warehouse, Some(_)) => {
                return Err(StockError::Validation(
                    "Only shop users carry a city".into(),
                ));
            }
            _ => {}
        }

        Ok(Self {
            id: utils::new_uuid_to_bech32("user_")?,
            username: username.to_owned(),
            name: name.to_owned(),
            role,
            city,
            created_at: TimeStamp::new(),
        })
    }

    /// Store label shown on submissions, e.g. "SYDNEY Store".
    pub fn shop_name(&self) -> Option<String> {
        self.city.map(|city| format!("{city} Store"))
    }
}
