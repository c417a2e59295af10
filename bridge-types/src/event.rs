//! Outbound Event Streams and Payloads
//!
//! Names and payload shapes for the four host-facing event streams: the
//! paywall lifecycle stream, the delegate action-request stream, the
//! per-presentation stream, and the log-forwarding stream. Payloads cross the
//! boundary as JSON values.

use serde_json::{Map, Value};

/// Paywall lifecycle event stream (open, close, dismiss, purchase succeeded,
/// open failed, custom action).
pub const PAYWALL_EVENT: &str = "onPaywallEvent";

/// Delegate action-request stream carrying purchase/restore requests that the
/// host must fulfil.
pub const DELEGATE_ACTION_EVENT: &str = "onDelegateActionEvent";

/// Per-presentation event stream scoped to a single `present_paywall` call.
pub const PRESENTATION_EVENT: &str = "paywallEventHandlers";

/// Log-forwarding stream. High volume; exempt from queueing.
pub const LOG_EVENT: &str = "onBridgeLog";

/// Delimiter joining the components of a composite product identity.
const IDENTITY_DELIMITER: char = ':';

/// Identity of a purchasable product.
///
/// On platforms with subscription sub-identifiers this is a composite of the
/// product id plus optional base-plan and offer ids, rendered on the wire as
/// `productId:basePlanId:offerId` with absent components omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductIdentity {
    pub product_id: String,
    pub base_plan_id: Option<String>,
    pub offer_id: Option<String>,
}

impl ProductIdentity {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            base_plan_id: None,
            offer_id: None,
        }
    }

    pub fn with_base_plan(mut self, base_plan_id: impl Into<String>) -> Self {
        self.base_plan_id = Some(base_plan_id.into());
        self
    }

    pub fn with_offer(mut self, offer_id: impl Into<String>) -> Self {
        self.offer_id = Some(offer_id.into());
        self
    }

    /// Render the composite wire form, omitting absent components.
    pub fn composite(&self) -> String {
        let mut out = self.product_id.clone();
        if let Some(base_plan) = &self.base_plan_id {
            out.push(IDENTITY_DELIMITER);
            out.push_str(base_plan);
            if let Some(offer) = &self.offer_id {
                out.push(IDENTITY_DELIMITER);
                out.push_str(offer);
            }
        }
        out
    }

    /// Parse a composite wire form back into its components.
    pub fn parse(composite: &str) -> Self {
        let mut parts = composite.split(IDENTITY_DELIMITER);
        let product_id = parts.next().unwrap_or_default().to_string();
        Self {
            product_id,
            base_plan_id: parts.next().map(str::to_string),
            offer_id: parts.next().map(str::to_string),
        }
    }
}

/// A request emitted on the delegate action stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelegateAction {
    Purchase(ProductIdentity),
    Restore,
}

impl DelegateAction {
    /// Wire payload: `{type: "purchase", productId, basePlanId?, offerId?}`
    /// or `{type: "restore"}`.
    pub fn to_payload(&self) -> Value {
        let mut map = Map::new();
        match self {
            Self::Purchase(identity) => {
                map.insert("type".into(), Value::String("purchase".into()));
                map.insert(
                    "productId".into(),
                    Value::String(identity.product_id.clone()),
                );
                if let Some(base_plan) = &identity.base_plan_id {
                    map.insert("basePlanId".into(), Value::String(base_plan.clone()));
                }
                if let Some(offer) = &identity.offer_id {
                    map.insert("offerId".into(), Value::String(offer.clone()));
                }
            }
            Self::Restore => {
                map.insert("type".into(), Value::String("restore".into()));
            }
        }
        Value::Object(map)
    }
}
