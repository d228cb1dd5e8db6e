//! Order types: the order tree returned to buyers and the creation request.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::order::OrderItem;
use bazaar_core::{AddressId, LoginName, OrderId, ProductId, SubOrderId};

/// Order header row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub buyer_login_name: LoginName,
    pub address_id: AddressId,
    pub provider_name: String,
    pub account_id: Option<String>,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub address_id: AddressId,
    pub recipient_name: String,
    pub phone: String,
    pub street: String,
    pub district: String,
    pub city: String,
}

/// Sub-order row (one per seller).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SubOrder {
    pub sub_order_id: SubOrderId,
    pub seller_login_name: LoginName,
    pub delivery_method_name: String,
    pub delivery_provider_name: String,
    pub delivery_price: i32,
    pub total_sku_price: i64,
    pub actual_date: Option<NaiveDate>,
    pub expected_date: Option<NaiveDate>,
}

/// Purchased line joined to its product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SubOrderDetail {
    pub sub_order_id: SubOrderId,
    pub product_id: ProductId,
    pub variant_name: String,
    pub quantity: i32,
    pub unit_price: i32,
    pub product_name: String,
}

impl SubOrderDetail {
    #[must_use]
    pub fn item_total(&self) -> i64 {
        i64::from(self.unit_price) * i64::from(self.quantity)
    }
}

/// A sub-order with its lines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubOrderView {
    #[serde(flatten)]
    pub sub_order: SubOrder,
    pub details: Vec<SubOrderDetail>,
}

/// Full order tree: order, sub-orders, lines and shipping address.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: OrderSummary,
    pub address: Option<Address>,
    pub sub_orders: Vec<SubOrderView>,
}

impl OrderDetails {
    /// Assemble the tree from flat rows, keeping sub-order order.
    #[must_use]
    pub fn assemble(
        order: OrderSummary,
        address: Option<Address>,
        sub_orders: Vec<SubOrder>,
        mut details: Vec<SubOrderDetail>,
    ) -> Self {
        let sub_orders = sub_orders
            .into_iter()
            .map(|sub_order| {
                let (mine, rest): (Vec<_>, Vec<_>) = details
                    .drain(..)
                    .partition(|d| d.sub_order_id == sub_order.sub_order_id);
                details = rest;
                SubOrderView {
                    sub_order,
                    details: mine,
                }
            })
            .collect();
        Self {
            order,
            address,
            sub_orders,
        }
    }
}

/// `POST /buyers/order/create` body.
///
/// Accepts camelCase keys and the PascalCase keys older clients send
/// (`Skus`, `AddressID`, `ProviderName`, `AccountID`, ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(alias = "Skus")]
    pub skus: Vec<OrderItem>,
    #[serde(alias = "AddressID")]
    pub address_id: AddressId,
    #[serde(alias = "ProviderName")]
    pub provider_name: String,
    #[serde(default, alias = "AccountID")]
    pub account_id: Option<String>,
    #[serde(alias = "DeliveryMethodName")]
    pub delivery_method_name: String,
    #[serde(alias = "DeliveryProviderName")]
    pub delivery_provider_name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn sub_order(id: i32, seller: &str) -> SubOrder {
        SubOrder {
            sub_order_id: SubOrderId::new(id),
            seller_login_name: LoginName::parse(seller).unwrap(),
            delivery_method_name: "Express".to_string(),
            delivery_provider_name: "VNPost".to_string(),
            delivery_price: 30_000,
            total_sku_price: 0,
            actual_date: None,
            expected_date: None,
        }
    }

    fn detail(sub_order_id: i32, variant: &str) -> SubOrderDetail {
        SubOrderDetail {
            sub_order_id: SubOrderId::new(sub_order_id),
            product_id: ProductId::new(1),
            variant_name: variant.to_string(),
            quantity: 2,
            unit_price: 150,
            product_name: "Shirt".to_string(),
        }
    }

    #[test]
    fn test_assemble_groups_details_by_sub_order() {
        let order = OrderSummary {
            order_id: OrderId::new(1),
            buyer_login_name: LoginName::parse("alice").unwrap(),
            address_id: AddressId::new(1),
            provider_name: "MoMo".to_string(),
            account_id: None,
            total_price: 600,
            created_at: Utc::now(),
        };
        let tree = OrderDetails::assemble(
            order,
            None,
            vec![sub_order(10, "shop-a"), sub_order(11, "shop-b")],
            vec![detail(11, "Blue"), detail(10, "Red"), detail(11, "Green")],
        );

        assert_eq!(tree.sub_orders.len(), 2);
        assert_eq!(tree.sub_orders[0].details.len(), 1);
        assert_eq!(tree.sub_orders[0].details[0].variant_name, "Red");
        assert_eq!(tree.sub_orders[1].details.len(), 2);
        assert_eq!(tree.sub_orders[1].details[0].item_total(), 300);
    }

    #[test]
    fn test_create_order_request_parses_camel_case() {
        let body = r#"{
            "skus": [{"productId": 4, "variantName": "Red", "quantity": 2}],
            "addressId": 9,
            "providerName": "MoMo",
            "deliveryMethodName": "Express",
            "deliveryProviderName": "VNPost"
        }"#;
        let req: CreateOrderRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.skus.len(), 1);
        assert_eq!(req.skus[0].quantity, 2);
        assert!(req.account_id.is_none());
    }

    #[test]
    fn test_create_order_request_parses_pascal_case() {
        let body = r#"{
            "Skus": [{"ProductID": 4, "VariantName": "Red", "Quantity": 2}],
            "AddressID": 9,
            "ProviderName": "MoMo",
            "AccountID": "acc-1",
            "DeliveryMethodName": "Standard",
            "DeliveryProviderName": "VNPost"
        }"#;
        let req: CreateOrderRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.skus.len(), 1);
        assert_eq!(req.skus[0].product_id, ProductId::new(4));
        assert_eq!(req.skus[0].variant_name, "Red");
        assert_eq!(req.skus[0].quantity, 2);
        assert_eq!(req.address_id, AddressId::new(9));
        assert_eq!(req.provider_name, "MoMo");
        assert_eq!(req.account_id.as_deref(), Some("acc-1"));
        assert_eq!(req.delivery_method_name, "Standard");
    }
}
