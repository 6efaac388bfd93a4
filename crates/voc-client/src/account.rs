//! Customer account and account/vehicle relation resources

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::VocClient;
use crate::error::{Result, VocError};
use crate::vehicle::Vehicle;

/// The signed-in customer account, returned by `customeraccounts`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerAccount {
    /// Often a phone number
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub account_id: String,

    #[serde(rename = "account")]
    pub account_link: String,

    #[serde(rename = "accountVehicleRelations")]
    pub relation_links: Vec<String>,

    #[serde(skip)]
    pub relations: Vec<AccountVehicleRelation>,

    #[serde(skip)]
    relations_resolved: bool,
}

impl CustomerAccount {
    /// Fetch every relation hyperlink, once
    #[instrument(skip(self, client), fields(username = %self.username))]
    pub async fn resolve_links(&mut self, client: &VocClient) -> Result<()> {
        if self.relations_resolved {
            return Ok(());
        }

        self.relations.clear();
        for link in &self.relation_links {
            let relation = client.get_relation_by_hyperlink(link).await?;
            self.relations.push(relation);
        }
        self.relations_resolved = true;
        Ok(())
    }

    pub fn is_resolved(&self) -> bool {
        self.relations_resolved
    }

    /// Numeric ids taken from the trailing segment of each relation hyperlink
    pub fn relation_ids(&self) -> Result<Vec<u64>> {
        self.relation_links
            .iter()
            .map(|url| {
                url.rsplit('/')
                    .next()
                    .and_then(|tail| tail.parse().ok())
                    .ok_or_else(|| {
                        VocError::invalid_input(format!(
                            "failed to extract relation id from {}",
                            url
                        ))
                    })
            })
            .collect()
    }

    /// Fetch every relation by id
    pub async fn relations(&self, client: &VocClient) -> Result<Vec<AccountVehicleRelation>> {
        let mut relations = Vec::new();
        for id in self.relation_ids()? {
            relations.push(client.get_relation_by_id(id).await?);
        }
        Ok(relations)
    }

    /// Fetch every vehicle linked to this account, fully resolved
    #[instrument(skip(self, client), fields(username = %self.username))]
    pub async fn vehicles(&self, client: &VocClient) -> Result<Vec<Vehicle>> {
        let mut vehicles = Vec::new();
        for relation in self.relations(client).await? {
            vehicles.push(client.get_vehicle(&relation.vehicle_id).await?);
        }
        Ok(vehicles)
    }
}

/// Link between a customer account and a vehicle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountVehicleRelation {
    /// VIN
    pub vehicle_id: String,
    pub username: String,
    /// "Verified"; no other value has been seen
    pub status: String,
    pub customer_vehicle_relation_id: u64,
    pub account_id: String,

    #[serde(rename = "account")]
    pub account_link: String,

    /// Self hyperlink
    #[serde(rename = "accountVehicleRelation")]
    pub relation_link: String,

    #[serde(rename = "vehicle")]
    pub vehicle_link: String,

    #[serde(skip)]
    pub account: Option<Box<CustomerAccount>>,

    #[serde(skip)]
    pub vehicle: Option<Box<Vehicle>>,

    #[serde(skip)]
    pub relation: Option<Box<AccountVehicleRelation>>,
}

impl AccountVehicleRelation {
    /// Fetch the account, vehicle and self hyperlinks, each at most once.
    ///
    /// Stops at the first failure and leaves earlier results in place.
    #[instrument(skip(self, client), fields(vin = %self.vehicle_id))]
    pub async fn resolve_links(&mut self, client: &VocClient) -> Result<()> {
        if self.account.is_none() {
            let account = client.get_account_by_hyperlink(&self.account_link).await?;
            self.account = Some(Box::new(account));
        }

        if self.vehicle.is_none() {
            let vehicle = client.get_vehicle_by_hyperlink(&self.vehicle_link).await?;
            self.vehicle = Some(Box::new(vehicle));
        }

        if self.relation.is_none() {
            let relation = client.get_relation_by_hyperlink(&self.relation_link).await?;
            self.relation = Some(Box::new(relation));
        }

        Ok(())
    }

    pub fn is_resolved(&self) -> bool {
        self.account.is_some() && self.vehicle.is_some() && self.relation.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(links: &[&str]) -> CustomerAccount {
        CustomerAccount {
            username: "0701234567".into(),
            relation_links: links.iter().map(|l| l.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_relation_ids() {
        let account = account(&[
            "https://vocapi.wirelesscar.net/customerapi/rest/v3.0/vehicle-account-relations/123",
            "https://vocapi.wirelesscar.net/customerapi/rest/v3.0/vehicle-account-relations/456",
        ]);
        assert_eq!(account.relation_ids().unwrap(), vec![123, 456]);
    }

    #[test]
    fn test_relation_id_must_be_numeric() {
        let account = account(&["https://example.test/vehicle-account-relations/abc"]);
        let err = account.relation_ids().unwrap_err();
        assert!(matches!(err, VocError::InvalidInput(_)));
        assert!(err
            .to_string()
            .contains("failed to extract relation id from https://example.test/vehicle-account-relations/abc"));
    }

    #[test]
    fn test_account_parsing() {
        let json = serde_json::json!({
            "username": "0701234567",
            "firstName": "Ada",
            "accountId": "7a3f",
            "account": "https://example.test/customeraccounts",
            "accountVehicleRelations": ["https://example.test/vehicle-account-relations/1"]
        });
        let account: CustomerAccount = serde_json::from_value(json).unwrap();
        assert_eq!(account.first_name, "Ada");
        assert_eq!(account.relation_links.len(), 1);
        assert!(account.relations.is_empty());
        assert!(!account.is_resolved());
    }

    #[test]
    fn test_relation_parsing() {
        let json = serde_json::json!({
            "vehicleId": "YV1XZ",
            "status": "Verified",
            "customerVehicleRelationId": 1234,
            "account": "https://example.test/customeraccounts",
            "accountVehicleRelation": "https://example.test/vehicle-account-relations/1234",
            "vehicle": "https://example.test/vehicles/YV1XZ"
        });
        let relation: AccountVehicleRelation = serde_json::from_value(json).unwrap();
        assert_eq!(relation.customer_vehicle_relation_id, 1234);
        assert_eq!(relation.vehicle_link, "https://example.test/vehicles/YV1XZ");
        assert!(!relation.is_resolved());
    }
}
