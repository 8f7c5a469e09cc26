use serde::{Deserialize, Serialize};
use crate::address::Address;

/// An address with the person living there, the unit stored in the address book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonAddressRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub house_number: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub city: String,
}

impl PersonAddressRecord {
    pub fn from_address_and_person(address: Address, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: address.id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            house_number: address.house_number,
            street: address.street,
            postcode: address.postcode,
            city: address.city,
        }
    }

    pub fn address(&self) -> Address {
        Address {
            id: self.id.clone(),
            city: self.city.clone(),
            street: self.street.clone(),
            postcode: self.postcode.clone(),
            house_number: self.house_number.clone(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}
