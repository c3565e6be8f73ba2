use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::property_yield;

/// A rental listing as held by a [`PropertyRepository`](crate::PropertyRepository).
///
/// `gross_yield` is derived from `monthly_rent` and `price`; it is set by
/// [`Property::from_new`] and refreshed by [`PropertyUpdate::apply_to`], never
/// written independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i64,
    pub address: String,
    pub neighborhood: String,
    pub price: Decimal,
    pub monthly_rent: Decimal,
    #[serde(rename = "yield")]
    pub gross_yield: Decimal,
    pub sq_meters: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub source: String,
    pub image_url: Option<String>,
    pub created_at: NaiveDate,
}

impl Property {
    /// Builds a stored listing from its user-supplied fields.
    pub fn from_new(
        id: i64,
        new: NewProperty,
        created_at: NaiveDate,
    ) -> Self {
        let gross_yield = property_yield(new.monthly_rent, new.price);
        Self {
            id,
            address: new.address,
            neighborhood: new.neighborhood,
            price: new.price,
            monthly_rent: new.monthly_rent,
            gross_yield,
            sq_meters: new.sq_meters,
            bedrooms: new.bedrooms,
            bathrooms: new.bathrooms,
            source: new.source,
            image_url: new.image_url,
            created_at,
        }
    }
}

/// Why a listing was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PropertyValidationError {
    #[error("address must not be empty")]
    EmptyAddress,

    #[error("neighborhood must not be empty")]
    EmptyNeighborhood,

    #[error("price must be positive, got {0}")]
    NonPositivePrice(Decimal),

    #[error("monthly rent must not be negative, got {0}")]
    NegativeRent(Decimal),
}

fn validate_fields(
    address: &str,
    neighborhood: &str,
    price: Decimal,
    monthly_rent: Decimal,
) -> Result<(), PropertyValidationError> {
    if address.trim().is_empty() {
        return Err(PropertyValidationError::EmptyAddress);
    }
    if neighborhood.trim().is_empty() {
        return Err(PropertyValidationError::EmptyNeighborhood);
    }
    if price <= Decimal::ZERO {
        return Err(PropertyValidationError::NonPositivePrice(price));
    }
    if monthly_rent < Decimal::ZERO {
        return Err(PropertyValidationError::NegativeRent(monthly_rent));
    }
    Ok(())
}

/// For creating new listings (no id, yield or creation date)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub address: String,
    pub neighborhood: String,
    pub price: Decimal,
    pub monthly_rent: Decimal,
    pub sq_meters: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub source: String,
    pub image_url: Option<String>,
}

impl NewProperty {
    pub fn validate(&self) -> Result<(), PropertyValidationError> {
        validate_fields(
            &self.address,
            &self.neighborhood,
            self.price,
            self.monthly_rent,
        )
    }
}

/// Partial edit of a stored listing. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyUpdate {
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub price: Option<Decimal>,
    pub monthly_rent: Option<Decimal>,
    pub sq_meters: Option<u32>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub source: Option<String>,
    pub image_url: Option<Option<String>>,
}

impl PropertyUpdate {
    /// True when the edit touches an input of the derived yield.
    pub fn changes_yield_inputs(&self) -> bool {
        self.price.is_some() || self.monthly_rent.is_some()
    }

    /// Merges this edit into `property`.
    ///
    /// The merged record is validated before anything is written, so a
    /// rejected edit leaves `property` unchanged.
    pub fn apply_to(
        self,
        property: &mut Property,
    ) -> Result<(), PropertyValidationError> {
        let recompute = self.changes_yield_inputs();

        let address = self.address.unwrap_or_else(|| property.address.clone());
        let neighborhood = self
            .neighborhood
            .unwrap_or_else(|| property.neighborhood.clone());
        let price = self.price.unwrap_or(property.price);
        let monthly_rent = self.monthly_rent.unwrap_or(property.monthly_rent);

        validate_fields(&address, &neighborhood, price, monthly_rent)?;

        property.address = address;
        property.neighborhood = neighborhood;
        property.price = price;
        property.monthly_rent = monthly_rent;
        if let Some(sq_meters) = self.sq_meters {
            property.sq_meters = sq_meters;
        }
        if let Some(bedrooms) = self.bedrooms {
            property.bedrooms = bedrooms;
        }
        if let Some(bathrooms) = self.bathrooms {
            property.bathrooms = bathrooms;
        }
        if let Some(source) = self.source {
            property.source = source;
        }
        if let Some(image_url) = self.image_url {
            property.image_url = image_url;
        }
        if recompute {
            property.gross_yield = property_yield(property.monthly_rent, property.price);
        }
        Ok(())
    }
}
