//! Order Workflow.
//!
//! `create_order` runs every step in one transaction: lock the requested
//! variants, plan the order, write order, sub-orders and lines, move stock
//! and money, clear the purchased cart lines, and read the tree back. Any
//! error drops the transaction, which rolls everything back.

use chrono::{Days, NaiveDate};
use tracing::instrument;

use bazaar_core::order::{OrderItem, normalize_items, plan_order};
use bazaar_core::types::delivery::{
    DELIVERY_METHODS, DELIVERY_PRICE, DELIVERY_PROVIDERS, delivery_method_choices,
    delivery_provider_choices, lead_time_days,
};
use bazaar_core::{DomainError, LoginName, OrderId, Role};

use super::{ServiceError, log_failure};
use crate::db::orders::{NewOrder, NewSubOrder};
use crate::db::{CartRepository, OrderRepository, RepositoryError, StorageContext};
use crate::models::CurrentUser;
use crate::models::order::{CreateOrderRequest, OrderDetails, OrderSummary};

const DELIVERY_METHOD_FKEY: &str = "sub_order_delivery_method_fkey";
const DELIVERY_PROVIDER_FKEY: &str = "sub_order_delivery_provider_fkey";
const ADDRESS_FKEY: &str = "orders_address_fkey";
const PAYMENT_PROVIDER_FKEY: &str = "orders_provider_fkey";

/// Order operations for one request.
pub struct OrderService<'a> {
    storage: StorageContext<'a>,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(storage: StorageContext<'a>) -> Self {
        Self { storage }
    }

    /// Create an order with one sub-order per seller.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty item list, a non-positive quantity,
    ///   insufficient stock, overflow, an address that is missing or not the
    ///   buyer's, or an unknown payment provider, delivery method or delivery
    ///   provider.
    /// - `NotFound` when an item does not resolve to a variant.
    /// - `Internal` for any other storage failure.
    #[instrument(
        skip(self, request),
        fields(buyer = %buyer, items = request.skus.len(), address_id = %request.address_id)
    )]
    pub async fn create_order(
        &self,
        buyer: &LoginName,
        request: &CreateOrderRequest,
    ) -> Result<OrderDetails, ServiceError> {
        let result = match normalize_items(&request.skus) {
            Ok(items) => self
                .try_create_order(buyer, request, &items)
                .await
                .map_err(|e| translate_order_failure(buyer, e)),
            Err(e) => Err(e.into()),
        };
        if let Ok(order) = &result {
            tracing::info!(
                order_id = %order.order.order_id,
                total_price = order.order.total_price,
                sub_orders = order.sub_orders.len(),
                "Order created"
            );
        }
        result.inspect_err(|e| log_failure("createOrder", e))
    }

    async fn try_create_order(
        &self,
        buyer: &LoginName,
        request: &CreateOrderRequest,
        items: &[OrderItem],
    ) -> Result<OrderDetails, ServiceError> {
        let (product_ids, variant_names): (Vec<i32>, Vec<String>) = items
            .iter()
            .map(|item| (item.product_id.as_i32(), item.variant_name.clone()))
            .unzip();

        let mut tx = self.storage.begin().await?;

        let variants =
            OrderRepository::lock_variants(&mut tx, &product_ids, &variant_names).await?;
        let plan = plan_order(items, &variants)?;

        let order = OrderRepository::insert_order(
            &mut tx,
            NewOrder {
                buyer,
                address_id: request.address_id,
                provider_name: &request.provider_name,
                account_id: request.account_id.as_deref(),
                total_price: plan.total_price,
            },
        )
        .await?;

        let order_date = order.created_at.date_naive();
        let expected_date = expected_delivery(order_date, &request.delivery_method_name);

        for seller_plan in &plan.sub_orders {
            let sub_order_id = OrderRepository::insert_sub_order(
                &mut tx,
                NewSubOrder {
                    order_id: order.order_id,
                    seller: &seller_plan.seller,
                    delivery_method_name: &request.delivery_method_name,
                    delivery_provider_name: &request.delivery_provider_name,
                    delivery_price: DELIVERY_PRICE,
                    total_sku_price: seller_plan.total_sku_price,
                    actual_date: order_date,
                    expected_date,
                },
            )
            .await?;

            for line in &seller_plan.lines {
                OrderRepository::insert_detail(&mut tx, sub_order_id, line).await?;
            }
        }

        for line in plan.purchased() {
            OrderRepository::decrement_stock(&mut tx, line).await?;
        }
        for (seller, amount) in plan.seller_credits() {
            OrderRepository::credit_seller(&mut tx, seller, amount).await?;
        }
        OrderRepository::debit_buyer(&mut tx, buyer, plan.total_price).await?;

        let cleared =
            CartRepository::remove_purchased(&mut tx, buyer, &product_ids, &variant_names).await?;
        tracing::debug!(cleared, "Purchased lines removed from cart");

        let details = OrderRepository::read_details(&mut tx, order.order_id)
            .await?
            .ok_or_else(|| ServiceError::Internal("order missing after insert".to_string()))?;

        tx.commit().await?;
        Ok(details)
    }

    /// Read the order tree.
    ///
    /// Buyers can only read their own orders; another buyer's order looks
    /// missing. Admins can read any order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the order is absent or not visible to the caller.
    #[instrument(skip(self), fields(order_id = %order_id, caller = %caller.login_name))]
    pub async fn read_order_details(
        &self,
        caller: &CurrentUser,
        order_id: OrderId,
    ) -> Result<OrderDetails, ServiceError> {
        let details = OrderRepository::new(self.storage.pool())
            .get_details(order_id)
            .await
            .map_err(ServiceError::from)
            .inspect_err(|e| log_failure("readOrderDetails", e))?;

        match details {
            Some(order) if visible_to(caller, &order) => Ok(order),
            _ => {
                let err: ServiceError = DomainError::not_found("Order not found").into();
                log_failure("readOrderDetails", &err);
                Err(err)
            }
        }
    }

    /// List a buyer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Repository` if the read fails.
    #[instrument(skip(self), fields(buyer = %buyer))]
    pub async fn list_orders(&self, buyer: &LoginName) -> Result<Vec<OrderSummary>, ServiceError> {
        OrderRepository::new(self.storage.pool())
            .list_for_buyer(buyer)
            .await
            .map_err(ServiceError::from)
            .inspect_err(|e| log_failure("listOrders", e))
    }
}

fn visible_to(caller: &CurrentUser, order: &OrderDetails) -> bool {
    match caller.role {
        Role::Admin => true,
        Role::Buyer => order.order.buyer_login_name == caller.login_name,
        Role::Seller => false,
    }
}

/// Expected delivery date for a method, counted from the order date.
fn expected_delivery(order_date: NaiveDate, delivery_method: &str) -> NaiveDate {
    order_date
        .checked_add_days(Days::new(u64::from(lead_time_days(delivery_method))))
        .unwrap_or(order_date)
}

/// Map storage failures inside the order transaction to caller-facing errors.
fn translate_order_failure(buyer: &LoginName, err: ServiceError) -> ServiceError {
    let ServiceError::Repository(repo_err) = err else {
        return err;
    };

    match repo_err {
        RepositoryError::ForeignKey { constraint } => match constraint.as_str() {
            DELIVERY_METHOD_FKEY => ServiceError::InvalidChoice {
                message: format!(
                    "Invalid delivery method. Valid choices: {}",
                    delivery_method_choices()
                ),
                choices: &DELIVERY_METHODS,
            },
            DELIVERY_PROVIDER_FKEY => ServiceError::InvalidChoice {
                message: format!(
                    "Invalid delivery provider. Valid choices: {}",
                    delivery_provider_choices()
                ),
                choices: &DELIVERY_PROVIDERS,
            },
            ADDRESS_FKEY => DomainError::invalid("Invalid AddressID: address does not exist").into(),
            PAYMENT_PROVIDER_FKEY => {
                DomainError::invalid("Invalid ProviderName: payment provider does not exist").into()
            }
            other => DomainError::invalid(format!("Invalid reference ({other})")).into(),
        },
        other => ServiceError::Internal(format!("Failed to create order for {buyer}: {other}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use bazaar_core::AddressId;

    use super::*;
    use crate::models::order::OrderSummary;

    fn buyer() -> LoginName {
        LoginName::parse("alice").unwrap()
    }

    fn fk(constraint: &str) -> ServiceError {
        ServiceError::Repository(RepositoryError::ForeignKey {
            constraint: constraint.to_string(),
        })
    }

    #[test]
    fn test_delivery_method_fk_lists_choices() {
        let err = translate_order_failure(&buyer(), fk(DELIVERY_METHOD_FKEY));
        assert_eq!(
            err.to_string(),
            "Invalid delivery method. Valid choices: Economy, Express, Standard"
        );
        assert!(matches!(err, ServiceError::InvalidChoice { choices, .. } if choices.len() == 3));
    }

    #[test]
    fn test_delivery_provider_fk_lists_choices() {
        let err = translate_order_failure(&buyer(), fk(DELIVERY_PROVIDER_FKEY));
        assert_eq!(
            err.to_string(),
            "Invalid delivery provider. Valid choices: Giao Hang Nhanh, GrabExpress, VNPost"
        );
    }

    #[test]
    fn test_other_fk_is_invalid_argument() {
        let err = translate_order_failure(&buyer(), fk(ADDRESS_FKEY));
        assert!(matches!(err, ServiceError::Domain(DomainError::InvalidArgument(_))));
    }

    #[test]
    fn test_unknown_storage_failure_is_internal() {
        let err = translate_order_failure(
            &buyer(),
            ServiceError::Repository(RepositoryError::DataCorruption("bad row".to_string())),
        );
        match err {
            ServiceError::Internal(message) => {
                assert!(message.starts_with("Failed to create order for alice: "));
            }
            other => panic!("expected internal error, got {other:?}"),
        }
    }

    #[test]
    fn test_domain_errors_pass_through() {
        let err = translate_order_failure(&buyer(), DomainError::not_found("SKU not found").into());
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound(_))));
    }

    #[test]
    fn test_expected_delivery_lead_times() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 30).unwrap();
        assert_eq!(
            expected_delivery(day, "Express"),
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
        );
        assert_eq!(
            expected_delivery(day, "Standard"),
            NaiveDate::from_ymd_opt(2025, 4, 3).unwrap()
        );
        assert_eq!(
            expected_delivery(day, "Economy"),
            NaiveDate::from_ymd_opt(2025, 4, 6).unwrap()
        );
    }

    #[test]
    fn test_order_visibility() {
        let order = OrderDetails::assemble(
            OrderSummary {
                order_id: OrderId::new(1),
                buyer_login_name: buyer(),
                address_id: AddressId::new(1),
                provider_name: "MoMo".to_string(),
                account_id: None,
                total_price: 0,
                created_at: Utc::now(),
            },
            None,
            vec![],
            vec![],
        );
        let owner = CurrentUser {
            login_name: buyer(),
            role: Role::Buyer,
        };
        let stranger = CurrentUser {
            login_name: LoginName::parse("bob").unwrap(),
            role: Role::Buyer,
        };
        let admin = CurrentUser {
            login_name: LoginName::parse("root").unwrap(),
            role: Role::Admin,
        };
        assert!(visible_to(&owner, &order));
        assert!(!visible_to(&stranger, &order));
        assert!(visible_to(&admin, &order));
    }
}
