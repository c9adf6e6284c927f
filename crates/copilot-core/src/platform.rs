//! Supported commerce and logistics platforms.
//!
//! The display name of a [`Platform`] is also the namespace used for its
//! credential keys (`"Shopify:accessToken"`), so the strings below are part of
//! the persisted format and must not change.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Platform {
    #[default]
    #[strum(to_string = "Shopify")]
    Shopify,
    #[serde(rename = "Generic WMS")]
    #[strum(to_string = "Generic WMS", serialize = "generic-wms", serialize = "wms")]
    GenericWms,
    #[strum(to_string = "Magento")]
    Magento,
    #[strum(to_string = "BigCommerce")]
    BigCommerce,
    #[serde(rename = "Amazon Seller Central")]
    #[strum(
        to_string = "Amazon Seller Central",
        serialize = "amazon-seller-central",
        serialize = "amazon"
    )]
    AmazonSellerCentral,
    #[serde(rename = "Etsy API")]
    #[strum(to_string = "Etsy API", serialize = "etsy")]
    Etsy,
    #[serde(rename = "Square API")]
    #[strum(to_string = "Square API", serialize = "square")]
    Square,
    #[strum(to_string = "WooCommerce")]
    WooCommerce,
    #[strum(to_string = "ShipStation")]
    ShipStation,
    #[strum(to_string = "Stripe")]
    Stripe,
}

/// Kind of record a generated integration usually deals with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
pub enum ResourceType {
    Orders,
    Products,
    Customers,
}

/// Description of one credential field a platform needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub placeholder: Option<&'static str>,
    /// Masked when displayed.
    pub secret: bool,
    pub required: bool,
}

const fn field(
    id: &'static str,
    label: &'static str,
    placeholder: Option<&'static str>,
    secret: bool,
    required: bool,
) -> FieldSpec {
    FieldSpec {
        id,
        label,
        placeholder,
        secret,
        required,
    }
}

const SHOPIFY_FIELDS: &[FieldSpec] = &[
    field("storeDomain", "Store Domain", Some("your-store.myshopify.com"), false, true),
    field("accessToken", "Access Token", Some("shpat_***"), true, true),
    field("apiVersion", "API Version", Some("2024-07"), false, false),
];

const GENERIC_WMS_FIELDS: &[FieldSpec] = &[
    field("baseUrl", "Base URL", Some("https://wms.example.com/api"), false, true),
    field("apiKey", "API Key", Some("wms_xxx"), true, true),
];

const MAGENTO_FIELDS: &[FieldSpec] = &[
    field("baseUrl", "Base URL", Some("https://magento.example.com"), false, true),
    field("accessToken", "Access Token", Some("magento_token"), true, true),
];

const BIGCOMMERCE_FIELDS: &[FieldSpec] = &[
    field("storeHash", "Store Hash", Some("abc123"), false, true),
    field("clientId", "Client ID", Some("bc client id"), false, true),
    field("accessToken", "Access Token", Some("bc access token"), true, true),
    field("apiVersion", "API Version", Some("v3"), false, false),
];

const AMAZON_FIELDS: &[FieldSpec] = &[
    field(
        "lwaClientId",
        "LWA Client ID",
        Some("amzn1.application-oa2-client..."),
        false,
        true,
    ),
    field("lwaClientSecret", "LWA Client Secret", None, true, true),
    field("refreshToken", "Refresh Token", None, true, true),
    field("region", "Region", Some("NA/EU/FE"), false, false),
];

const ETSY_FIELDS: &[FieldSpec] = &[
    field("apiKey", "API Key", Some("etsy_key"), false, true),
    field("sharedSecret", "Shared Secret", None, true, true),
];

const SQUARE_FIELDS: &[FieldSpec] = &[
    field("accessToken", "Access Token", Some("sq0atp-***"), true, true),
    field("environment", "Environment", Some("sandbox | production"), false, false),
];

const WOOCOMMERCE_FIELDS: &[FieldSpec] = &[
    field("storeUrl", "Store URL", Some("https://store.example.com"), false, true),
    field("consumerKey", "Consumer Key", None, false, true),
    field("consumerSecret", "Consumer Secret", None, true, true),
];

const SHIPSTATION_FIELDS: &[FieldSpec] = &[
    field("apiKey", "API Key", None, false, true),
    field("apiSecret", "API Secret", None, true, true),
];

const STRIPE_FIELDS: &[FieldSpec] = &[
    field("secretKey", "Secret Key", Some("sk_live_***"), true, true),
    field("apiVersion", "API Version", Some("2024-06-20"), false, false),
];

impl Platform {
    /// Credential fields the platform's generated code needs.
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Platform::Shopify => SHOPIFY_FIELDS,
            Platform::GenericWms => GENERIC_WMS_FIELDS,
            Platform::Magento => MAGENTO_FIELDS,
            Platform::BigCommerce => BIGCOMMERCE_FIELDS,
            Platform::AmazonSellerCentral => AMAZON_FIELDS,
            Platform::Etsy => ETSY_FIELDS,
            Platform::Square => SQUARE_FIELDS,
            Platform::WooCommerce => WOOCOMMERCE_FIELDS,
            Platform::ShipStation => SHIPSTATION_FIELDS,
            Platform::Stripe => STRIPE_FIELDS,
        }
    }

    pub fn field(self, id: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|spec| spec.id == id)
    }

    /// Prefix shared by every credential key of this platform.
    pub fn credential_prefix(self) -> String {
        format!("{self}:")
    }

    pub fn all() -> impl Iterator<Item = Platform> {
        Platform::iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_is_shopify() {
        assert_eq!(Platform::default(), Platform::Shopify);
    }

    #[test]
    fn test_display_names_match_storage_namespace() {
        assert_eq!(Platform::GenericWms.to_string(), "Generic WMS");
        assert_eq!(Platform::Etsy.credential_prefix(), "Etsy API:");
        assert_eq!(Platform::all().count(), 10);
    }

    #[test]
    fn test_parse_accepts_display_name_and_aliases() {
        assert_eq!(Platform::from_str("shopify").unwrap(), Platform::Shopify);
        assert_eq!(
            Platform::from_str("Generic WMS").unwrap(),
            Platform::GenericWms
        );
        assert_eq!(Platform::from_str("amazon").unwrap(), Platform::AmazonSellerCentral);
        assert!(Platform::from_str("oscommerce").is_err());
    }

    #[test]
    fn test_every_platform_has_a_required_field() {
        for platform in Platform::all() {
            assert!(
                platform.fields().iter().any(|f| f.required),
                "{platform} has no required field"
            );
        }
    }

    #[test]
    fn test_field_lookup() {
        let spec = Platform::Stripe.field("secretKey").unwrap();
        assert!(spec.secret);
        assert!(Platform::Stripe.field("accessToken").is_none());
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&Platform::Square).unwrap();
        assert_eq!(json, "\"Square API\"");
        let back: Platform = serde_json::from_str("\"Generic WMS\"").unwrap();
        assert_eq!(back, Platform::GenericWms);
    }
}
