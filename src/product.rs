//! Product records and the timestamp codec shared by all stored rows
use crate::error::StockError;
use crate::utils;
use chrono::{DateTime, TimeZone, Utc};

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Product {
    #[n(0)]
    pub id: String, // bech32-encoded uuid7, assigned at creation
    #[n(1)]
    pub sku: String, // unique case-insensitively, enforced by the ledger
    #[n(2)]
    pub name: String,
    #[n(3)]
    pub quantity: u32,
    #[n(4)]
    pub created_at: TimeStamp<Utc>,
    #[n(5)]
    pub updated_at: TimeStamp<Utc>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

// Ordering is written out by hand: a derive would demand T: Ord, which Utc
// does not implement, while DateTime<Tz> orders fine on its own.
impl PartialOrd for TimeStamp<Utc> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeStamp<Utc> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for TimeStamp<Utc> {
    fn default() -> Self {
        Self::new()
    }
}

impl Product {
    /// Mint a new product row with a freshly assigned id. The caller's
    /// quantity is the initial stock level.
    pub fn new(sku: &str, name: &str, quantity: u32) -> Result<Self, StockError> {
        let sku = sku.trim();
        let name = name.trim();
        if sku.is_empty() {
            return Err(StockError::Validation("SKU must not be empty".into()));
        }
        if name.is_empty() {
            return Err(StockError::Validation(
                "Product name must not be empty".into(),
            ));
        }
        let now = TimeStamp::new();
        Ok(Self {
            id: utils::new_uuid_to_bech32("prod_")?,
            sku: sku.to_owned(),
            name: name.to_owned(),
            quantity,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// The ledger's uniqueness rule: SKUs match regardless of casing.
    pub fn matches_sku(&self, sku: &str) -> bool {
        self.sku.eq_ignore_ascii_case(sku.trim())
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}
impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}
impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}
