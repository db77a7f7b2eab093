//! Resale listings and the buyers who expressed interest in them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

use super::draft::ListingDraft;
use super::ids::{ListingId, UserId};
use super::wire::null_as_default;

/// A two-wheeler listed for resale.
///
/// Always held as the server last returned it; local code never patches
/// individual fields. Decodes from payloads keyed by `_id`, `id`, or both
/// (`_id` wins).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ListingWire")]
pub struct Listing {
    pub id: ListingId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub price: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub owners_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kilometres_run: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_year: u16,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sold: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub booked_buyers: Vec<Buyer>,
}

impl Listing {
    /// Short human label, e.g. `Royal Enfield Classic 350`.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} {}", self.brand, self.model).trim().to_string()
    }

    /// Snapshot of the editable fields.
    #[must_use]
    pub fn draft(&self) -> ListingDraft {
        ListingDraft {
            brand: self.brand.clone(),
            model: self.model.clone(),
            location: self.location.clone(),
            price: self.price,
            description: self.description.clone(),
            color: self.color.clone(),
            owners_count: self.owners_count,
            kilometres_run: self.kilometres_run,
            model_year: self.model_year,
        }
    }

    /// Whether a buyer with `user_id` is recorded on this listing.
    #[must_use]
    pub fn has_buyer(&self, user_id: &UserId) -> bool {
        self.booked_buyers.iter().any(|b| &b.user_id == user_id)
    }

    /// Resolve image references against the API origin.
    ///
    /// Absolute URLs pass through unchanged; references that cannot be
    /// joined are skipped.
    #[must_use]
    pub fn image_urls(&self, origin: &Url) -> Vec<Url> {
        self.images
            .iter()
            .filter_map(|image| origin.join(image.trim_start_matches('/')).ok())
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingWire {
    #[serde(rename = "_id", default)]
    mongo_id: Option<ListingId>,
    #[serde(default)]
    id: Option<ListingId>,
    #[serde(default, deserialize_with = "null_as_default")]
    brand: String,
    #[serde(default, deserialize_with = "null_as_default")]
    model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    price: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    owners_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    kilometres_run: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    model_year: u16,
    #[serde(default, deserialize_with = "null_as_default")]
    images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    sold: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    booked_buyers: Vec<Buyer>,
}

impl TryFrom<ListingWire> for Listing {
    type Error = &'static str;

    fn try_from(wire: ListingWire) -> Result<Self, Self::Error> {
        let id = wire
            .mongo_id
            .or(wire.id)
            .ok_or("listing has neither `_id` nor `id`")?;
        Ok(Self {
            id,
            brand: wire.brand,
            model: wire.model,
            location: wire.location,
            price: wire.price,
            description: wire.description,
            color: wire.color,
            owners_count: wire.owners_count,
            kilometres_run: wire.kilometres_run,
            model_year: wire.model_year,
            images: wire.images,
            sold: wire.sold,
            booked_buyers: wire.booked_buyers,
        })
    }
}

/// Contact snapshot of a user interested in a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: UserId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contact: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
}

/// Origin (scheme, host, port) of an API base URL.
///
/// Image paths are served from the origin, not from the API prefix.
#[must_use]
pub fn api_origin(base: &Url) -> Url {
    let mut origin = base.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    origin
}
