//! Customer account actions: address CRUD and profile updates.
//!
//! Each handler owns a commerce client and the caller-supplied mutation
//! documents, checks the session, and converts every failure into a
//! structured payload with the right HTTP status (400/401/405). Address
//! errors are keyed by address id so a page with many address forms can
//! place each error next to its form.

use crate::{
    action::ActionPayload,
    client::CommerceClient,
    form::{FormData, FormMethod},
    Result, VitrineError,
};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

/// Form keys copied into an address input. Anything else is ignored.
pub const ADDRESS_INPUT_KEYS: [&str; 10] = [
    "address1",
    "address2",
    "city",
    "company",
    "territoryCode",
    "firstName",
    "lastName",
    "phoneNumber",
    "zoneCode",
    "zip",
];

/// Address fields sent to the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub territory_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

impl AddressInput {
    /// Build an address from the whitelisted form keys.
    pub fn from_form(form: &FormData) -> Self {
        let field = |key: &str| form.get(key).map(str::to_string);
        Self {
            address1: field("address1"),
            address2: field("address2"),
            city: field("city"),
            company: field("company"),
            territory_code: field("territoryCode"),
            first_name: field("firstName"),
            last_name: field("lastName"),
            phone_number: field("phoneNumber"),
            zone_code: field("zoneCode"),
            zip: field("zip"),
        }
    }
}

/// Outcome data of an address action.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressActionData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_address: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_address: Option<AddressInput>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_address: Option<bool>,
}

/// Mutation documents for the address actions, supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct AddressMutations {
    pub create: String,
    pub update: String,
    pub delete: String,
}

/// Handler for the addresses page form actions.
pub struct AddressHandler<C: CommerceClient> {
    client: C,
    mutations: AddressMutations,
}

impl<C: CommerceClient> AddressHandler<C> {
    pub fn new(client: C, mutations: AddressMutations) -> Self {
        Self { client, mutations }
    }

    /// Run an address form action: POST creates, PUT updates, DELETE
    /// deletes. Any other method is a 405 payload.
    #[instrument(skip(self, form), fields(client = %self.client.name(), %method))]
    pub async fn handle(&self, method: FormMethod, form: &FormData) -> ActionPayload<AddressActionData> {
        let address_id = match form.get("addressId") {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return ActionPayload::error(400, "You must provide an address id."),
        };

        // A mutation must never bounce through a login redirect.
        if !self.client.is_logged_in().await {
            return ActionPayload::field_error(401, address_id, "Unauthorized");
        }

        let default_address = form.get("defaultAddress") == Some("on");
        let address = AddressInput::from_form(form);

        let result = match method {
            FormMethod::Post => self.create(address, default_address).await,
            FormMethod::Put => self.update(&address_id, address, default_address).await,
            FormMethod::Delete => self.delete(&address_id).await,
        };

        match result {
            Ok(data) => ActionPayload::ok(data),
            Err(err) => ActionPayload::field_error(err.status(), address_id, err.to_string()),
        }
    }

    async fn create(&self, address: AddressInput, default_address: bool) -> Result<AddressActionData> {
        debug!("Creating customer address");
        let variables = self.variables(json!({
            "address": address,
            "defaultAddress": default_address,
        }));

        let data = self
            .client
            .mutate(&self.mutations.create, variables)
            .await?
            .into_result()?;

        let result = &data["customerAddressCreate"];
        check_user_errors(result)?;
        let created = result
            .get("customerAddress")
            .filter(|address| !address.is_null())
            .cloned()
            .ok_or_else(|| VitrineError::Api("Customer address create failed.".to_string()))?;

        Ok(AddressActionData {
            created_address: Some(created),
            default_address: Some(default_address),
            ..Default::default()
        })
    }

    async fn update(
        &self,
        address_id: &str,
        address: AddressInput,
        default_address: bool,
    ) -> Result<AddressActionData> {
        debug!("Updating customer address");
        let variables = self.variables(json!({
            "address": address,
            "addressId": decode_address_id(address_id),
            "defaultAddress": default_address,
        }));

        let data = self
            .client
            .mutate(&self.mutations.update, variables)
            .await?
            .into_result()?;

        let result = &data["customerAddressUpdate"];
        check_user_errors(result)?;
        if result
            .get("customerAddress")
            .map(Value::is_null)
            .unwrap_or(true)
        {
            return Err(VitrineError::Api("Customer address update failed.".to_string()));
        }

        Ok(AddressActionData {
            updated_address: Some(address),
            default_address: Some(default_address),
            ..Default::default()
        })
    }

    async fn delete(&self, address_id: &str) -> Result<AddressActionData> {
        debug!("Deleting customer address");
        let variables = self.variables(json!({
            "addressId": decode_address_id(address_id),
        }));

        let data = self
            .client
            .mutate(&self.mutations.delete, variables)
            .await?
            .into_result()?;

        let result = &data["customerAddressDelete"];
        check_user_errors(result)?;
        if result
            .get("deletedAddressId")
            .map(Value::is_null)
            .unwrap_or(true)
        {
            return Err(VitrineError::Api("Customer address delete failed.".to_string()));
        }

        Ok(AddressActionData {
            deleted_address: Some(address_id.to_string()),
            ..Default::default()
        })
    }

    fn variables(&self, mut variables: Value) -> Value {
        if let (Value::Object(map), Some(language)) = (&mut variables, self.client.language()) {
            map.insert("language".into(), json!(language));
        }
        variables
    }
}

/// Form keys copied into a profile update. Anything else is ignored.
pub const PROFILE_INPUT_KEYS: [&str; 2] = ["firstName", "lastName"];

/// Handler for the profile page form action. PUT only.
pub struct ProfileHandler<C: CommerceClient> {
    client: C,
    update_document: String,
}

impl<C: CommerceClient> ProfileHandler<C> {
    pub fn new(client: C, update_document: impl Into<String>) -> Self {
        Self {
            client,
            update_document: update_document.into(),
        }
    }

    /// Update the customer profile from whitelisted form fields.
    #[instrument(skip(self, form), fields(client = %self.client.name(), %method))]
    pub async fn handle(&self, method: FormMethod, form: &FormData) -> ActionPayload<Value> {
        if method != FormMethod::Put {
            return ActionPayload::error(405, "Method not allowed");
        }

        let mut customer = serde_json::Map::new();
        for (key, value) in form.entries() {
            if PROFILE_INPUT_KEYS.contains(&key) && !value.is_empty() {
                customer.insert(key.to_string(), json!(value));
            }
        }

        match self.update(Value::Object(customer)).await {
            Ok(customer) => ActionPayload::ok(customer),
            Err(err) => ActionPayload::error(err.status(), err.to_string()),
        }
    }

    async fn update(&self, customer: Value) -> Result<Value> {
        let mut variables = json!({ "customer": customer });
        if let (Value::Object(map), Some(language)) = (&mut variables, self.client.language()) {
            map.insert("language".into(), json!(language));
        }

        let data = self
            .client
            .mutate(&self.update_document, variables)
            .await?
            .into_result()?;

        data["customerUpdate"]
            .get("customer")
            .filter(|customer| !customer.is_null())
            .cloned()
            .ok_or_else(|| VitrineError::Api("Customer profile update failed.".to_string()))
    }
}

/// Ensure the session is authenticated before rendering an account page.
/// Loader-side counterpart of the handlers' 401 payloads.
pub async fn ensure_authenticated<C: CommerceClient>(client: &C) -> Result<()> {
    if client.is_logged_in().await {
        Ok(())
    } else {
        Err(VitrineError::Unauthorized)
    }
}

/// Address ids arrive percent-encoded from the form round-trip.
fn decode_address_id(address_id: &str) -> String {
    percent_decode_str(address_id)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| address_id.to_string())
}

/// Surface the first `userErrors` entry of a mutation result, if any.
fn check_user_errors(result: &Value) -> Result<()> {
    if let Some(first) = result
        .get("userErrors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
    {
        let message = first
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Mutation failed");
        return Err(VitrineError::UserError(message.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionErrors;
    use crate::client::{ApiResponse, MockCommerceClient};

    fn mutations() -> AddressMutations {
        AddressMutations {
            create: "mutation AddressCreate".into(),
            update: "mutation AddressUpdate".into(),
            delete: "mutation AddressDelete".into(),
        }
    }

    fn address_form(address_id: &str) -> FormData {
        FormData::from_pairs([
            ("addressId", address_id),
            ("firstName", "Ada"),
            ("lastName", "Lovelace"),
            ("address1", "12 Main St"),
            ("city", "London"),
            ("zip", "N1 9GU"),
            ("territoryCode", "GB"),
            ("defaultAddress", "on"),
        ])
    }

    #[tokio::test]
    async fn test_create_address() {
        let client = MockCommerceClient::new().with_response(
            "mutation AddressCreate",
            ApiResponse::ok(json!({
                "customerAddressCreate": {
                    "customerAddress": {"id": "addr-1"},
                    "userErrors": []
                }
            })),
        );
        let handler = AddressHandler::new(client, mutations());

        let payload = handler
            .handle(FormMethod::Post, &address_form("NEW_ADDRESS_ID"))
            .await;
        assert!(payload.is_ok());
        let data = payload.data.unwrap();
        assert_eq!(data.created_address.unwrap()["id"], "addr-1");
        assert_eq!(data.default_address, Some(true));
    }

    #[tokio::test]
    async fn test_missing_address_id() {
        let handler = AddressHandler::new(MockCommerceClient::new(), mutations());
        let payload = handler
            .handle(FormMethod::Post, &FormData::default())
            .await;
        assert_eq!(payload.status, 400);
    }

    #[tokio::test]
    async fn test_logged_out_is_401_keyed_by_address_id() {
        let handler = AddressHandler::new(MockCommerceClient::new().logged_out(), mutations());
        let payload = handler
            .handle(FormMethod::Put, &address_form("addr-9"))
            .await;
        assert_eq!(payload.status, 401);
        match payload.error.unwrap() {
            ActionErrors::Fields(map) => assert_eq!(map["addr-9"], "Unauthorized"),
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_user_error_is_400() {
        let client = MockCommerceClient::new().with_response(
            "mutation AddressUpdate",
            ApiResponse::ok(json!({
                "customerAddressUpdate": {
                    "customerAddress": null,
                    "userErrors": [{"message": "Zip is invalid"}]
                }
            })),
        );
        let handler = AddressHandler::new(client, mutations());

        let payload = handler
            .handle(FormMethod::Put, &address_form("addr-1"))
            .await;
        assert_eq!(payload.status, 400);
        match payload.error.unwrap() {
            ActionErrors::Fields(map) => assert_eq!(map["addr-1"], "Zip is invalid"),
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_address() {
        let client = MockCommerceClient::new().with_response(
            "mutation AddressDelete",
            ApiResponse::ok(json!({
                "customerAddressDelete": {"deletedAddressId": "addr-1", "userErrors": []}
            })),
        );
        let handler = AddressHandler::new(client, mutations());

        let payload = handler
            .handle(FormMethod::Delete, &address_form("addr-1"))
            .await;
        assert!(payload.is_ok());
        assert_eq!(payload.data.unwrap().deleted_address.as_deref(), Some("addr-1"));
    }

    #[tokio::test]
    async fn test_profile_rejects_non_put() {
        let handler = ProfileHandler::new(MockCommerceClient::new(), "mutation CustomerUpdate");
        let payload = handler
            .handle(FormMethod::Post, &FormData::default())
            .await;
        assert_eq!(payload.status, 405);
    }

    #[tokio::test]
    async fn test_profile_update() {
        let client = MockCommerceClient::new().with_response(
            "mutation CustomerUpdate",
            ApiResponse::ok(json!({
                "customerUpdate": {"customer": {"firstName": "Ada"}}
            })),
        );
        let handler = ProfileHandler::new(client, "mutation CustomerUpdate");

        let form = FormData::from_pairs([
            ("firstName", "Ada"),
            ("lastName", ""),
            ("password", "never-forwarded"),
        ]);
        let payload = handler.handle(FormMethod::Put, &form).await;
        assert!(payload.is_ok());
        assert_eq!(payload.data.unwrap()["firstName"], "Ada");
    }

    #[tokio::test]
    async fn test_ensure_authenticated() {
        assert!(ensure_authenticated(&MockCommerceClient::new()).await.is_ok());
        let err = ensure_authenticated(&MockCommerceClient::new().logged_out())
            .await
            .unwrap_err();
        assert!(matches!(err, VitrineError::Unauthorized));
    }

    #[test]
    fn test_address_input_whitelist() {
        let form = FormData::from_pairs([
            ("firstName", "Ada"),
            ("zip", "N1 9GU"),
            ("addressId", "addr-1"),
            ("csrfToken", "nope"),
        ]);
        let address = AddressInput::from_form(&form);
        assert_eq!(address.first_name.as_deref(), Some("Ada"));
        assert_eq!(address.zip.as_deref(), Some("N1 9GU"));
        let serialized = serde_json::to_value(&address).unwrap();
        assert!(serialized.get("addressId").is_none());
        assert!(serialized.get("csrfToken").is_none());
    }

    #[test]
    fn test_decode_address_id() {
        assert_eq!(
            decode_address_id("gid%3A%2F%2Fshop%2FAddress%2F1"),
            "gid://shop/Address/1"
        );
        assert_eq!(decode_address_id("plain"), "plain");
    }
}
