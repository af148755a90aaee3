//! Cart form actions.
//!
//! A cart form submits a single JSON-encoded `cartFormInput` field naming
//! the action and its inputs. Action kinds are a closed enum so an unknown
//! kind is rejected when the form is decoded, not deep inside a dispatch.

use crate::{
    action::ActionPayload, client::CommerceClient, form::FormData, Result, VitrineError,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

/// Name of the form field carrying the encoded cart input.
pub const CART_FORM_INPUT_NAME: &str = "cartFormInput";

/// Every cart operation the framework dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CartAction {
    Create,
    LinesAdd,
    LinesUpdate,
    LinesRemove,
    NoteUpdate,
    DiscountCodesUpdate,
    GiftCardCodesUpdate,
    BuyerIdentityUpdate,
    AttributesUpdate,
    SelectedDeliveryOptionsUpdate,
    MetafieldsSet,
    MetafieldsDelete,
}

/// Decoded cart form input: the action kind plus its free-form inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartFormInput {
    pub action: CartAction,

    /// Inputs forwarded to the mutation variables (lines, note, codes...).
    #[serde(default)]
    pub inputs: Value,
}

impl CartFormInput {
    /// Decode the `cartFormInput` field of a submitted form.
    ///
    /// Unknown action kinds fail here with a form error.
    pub fn from_form(form: &FormData) -> Result<Self> {
        let raw = form
            .get(CART_FORM_INPUT_NAME)
            .ok_or_else(|| VitrineError::Form(format!("Missing {CART_FORM_INPUT_NAME} field")))?;
        serde_json::from_str(raw).map_err(|e| VitrineError::Form(e.to_string()))
    }

    /// Encode back into the form field pair, the shape a cart form submits.
    pub fn to_form_pair(&self) -> Result<(String, String)> {
        Ok((CART_FORM_INPUT_NAME.to_string(), serde_json::to_string(self)?))
    }
}

/// Mutation documents for every cart action, supplied by the caller.
/// Documents are opaque to this crate.
#[derive(Debug, Clone, Default)]
pub struct CartMutations {
    pub create: String,
    pub lines_add: String,
    pub lines_update: String,
    pub lines_remove: String,
    pub note_update: String,
    pub discount_codes_update: String,
    pub gift_card_codes_update: String,
    pub buyer_identity_update: String,
    pub attributes_update: String,
    pub selected_delivery_options_update: String,
    pub metafields_set: String,
    pub metafields_delete: String,
}

impl CartMutations {
    /// The document behind an action. Exhaustive: adding a `CartAction`
    /// variant will not compile until it is routed here.
    pub fn document_for(&self, action: CartAction) -> &str {
        match action {
            CartAction::Create => &self.create,
            CartAction::LinesAdd => &self.lines_add,
            CartAction::LinesUpdate => &self.lines_update,
            CartAction::LinesRemove => &self.lines_remove,
            CartAction::NoteUpdate => &self.note_update,
            CartAction::DiscountCodesUpdate => &self.discount_codes_update,
            CartAction::GiftCardCodesUpdate => &self.gift_card_codes_update,
            CartAction::BuyerIdentityUpdate => &self.buyer_identity_update,
            CartAction::AttributesUpdate => &self.attributes_update,
            CartAction::SelectedDeliveryOptionsUpdate => &self.selected_delivery_options_update,
            CartAction::MetafieldsSet => &self.metafields_set,
            CartAction::MetafieldsDelete => &self.metafields_delete,
        }
    }
}

/// Handler for cart form actions.
pub struct CartHandler<C: CommerceClient> {
    client: C,
    mutations: CartMutations,
    cart_id: Option<String>,
}

impl<C: CommerceClient> CartHandler<C> {
    pub fn new(client: C, mutations: CartMutations) -> Self {
        Self {
            client,
            mutations,
            cart_id: None,
        }
    }

    /// Set the cart id merged into every mutation's variables.
    pub fn with_cart_id(mut self, cart_id: impl Into<String>) -> Self {
        self.cart_id = Some(cart_id.into());
        self
    }

    /// Run the action submitted by a cart form.
    ///
    /// All failures are caught here and returned as a structured payload;
    /// nothing propagates past the action boundary.
    #[instrument(skip(self, form), fields(client = %self.client.name()))]
    pub async fn handle(&self, form: &FormData) -> ActionPayload<Value> {
        let input = match CartFormInput::from_form(form) {
            Ok(input) => input,
            Err(err) => return ActionPayload::from_error(&err),
        };

        debug!("Dispatching cart action: {:?}", input.action);
        match self.dispatch(input).await {
            Ok(result) => ActionPayload::ok(result),
            Err(err) => ActionPayload::from_error(&err),
        }
    }

    /// Run a decoded cart input against the API.
    pub async fn dispatch(&self, input: CartFormInput) -> Result<Value> {
        let document = self.mutations.document_for(input.action);
        let variables = self.build_variables(input.inputs)?;

        let response = self.client.mutate(document, variables).await?;
        let data = response.into_result()?;
        extract_mutation_result(data)
    }

    /// Inputs must be an object (or absent); anything else is a malformed
    /// `cartFormInput`, not an empty mutation.
    fn build_variables(&self, inputs: Value) -> Result<Value> {
        let mut variables = json!({});
        if let Value::Object(map) = &mut variables {
            if let Some(cart_id) = &self.cart_id {
                map.insert("cartId".into(), json!(cart_id));
            }
            if let Some(language) = self.client.language() {
                map.insert("language".into(), json!(language));
            }
            match inputs {
                Value::Object(inputs) => map.extend(inputs),
                Value::Null => {}
                other => {
                    return Err(VitrineError::Form(format!(
                        "Cart inputs must be an object, got {other}"
                    )))
                }
            }
        }
        Ok(variables)
    }
}

/// Unwrap a single-operation mutation payload and surface user errors.
///
/// The API nests the result under the mutation name; the name varies per
/// document so the single entry is taken positionally.
fn extract_mutation_result(data: Value) -> Result<Value> {
    let inner = match &data {
        Value::Object(map) if map.len() == 1 => map.values().next().cloned().unwrap_or(Value::Null),
        _ => data,
    };

    if let Some(user_errors) = inner.get("userErrors").and_then(Value::as_array) {
        if let Some(first) = user_errors.first() {
            let message = first
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Cart mutation failed");
            return Err(VitrineError::UserError(message.to_string()));
        }
    }

    Ok(inner)
}
