//! Checkout service.

use std::{fmt, sync::Arc};

use farmstall::{
    cart::{CartStorage, CartStore},
    handoff::HandoffLink,
    identity::Caller,
    orders::{NewOrder, Order, OrderLine, OrderType},
    pricing::ShippingMethod,
};
use tracing::{Span, field, info, warn};

use crate::domain::{
    checkout::{
        data::{CheckoutRequest, CustomerForm, Handoff, WhatsAppRequest},
        errors::CheckoutError,
    },
    orders::OrdersService,
    profiles::{ProfilesService, ProfilesServiceError, data::ProfileDetails},
};

#[derive(Clone)]
pub struct CheckoutService {
    orders: Arc<dyn OrdersService>,
    profiles: Arc<dyn ProfilesService>,
    link: HandoffLink,
}

impl fmt::Debug for CheckoutService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutService")
            .field("link", &self.link)
            .finish_non_exhaustive()
    }
}

impl CheckoutService {
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrdersService>,
        profiles: Arc<dyn ProfilesService>,
        link: HandoffLink,
    ) -> Self {
        Self {
            orders,
            profiles,
            link,
        }
    }

    /// Place a website order for everything in the cart, then empty it. The
    /// cart is left as it was if the order cannot be placed.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] for an empty cart, or the error
    /// that stopped the order from being placed.
    #[tracing::instrument(
        name = "checkout.service.checkout",
        skip(self, cart, request),
        fields(idempotency_key = %request.idempotency_key, order_uuid = field::Empty),
        err
    )]
    pub async fn checkout<S: CartStorage>(
        &self,
        caller: Caller,
        cart: &CartStore<S>,
        request: CheckoutRequest,
    ) -> Result<Order, CheckoutError> {
        let items = cart.list()?;

        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let order = self
            .orders
            .submit_order(NewOrder {
                idempotency_key: request.idempotency_key,
                user: caller.user,
                customer: request.form.customer,
                address: request.form.address,
                lines: items
                    .iter()
                    .map(|item| OrderLine {
                        product: item.product_id,
                        quantity: item.quantity,
                    })
                    .collect(),
                order_type: OrderType::Website,
                shipping_method: request.shipping_method,
            })
            .await?;

        Span::current().record("order_uuid", field::display(order.uuid));

        if let Err(error) = cart.clear() {
            warn!(
                order_uuid = %order.uuid,
                error = %error,
                "order placed but cart was not cleared"
            );
        }

        Ok(order)
    }

    /// Checkout form pre-filled from the caller's saved profile, blank for
    /// guests and users without one.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be read.
    pub async fn prefill(&self, caller: Caller) -> Result<CustomerForm, CheckoutError> {
        Ok(self
            .saved_details(caller)
            .await?
            .map(|details| CustomerForm::from_profile(&details))
            .unwrap_or_default())
    }

    /// Place a single-product order and build the deep link that hands it to
    /// the store's messaging account. Blank form fields are taken from the
    /// caller's profile when it can be read; otherwise the form is used as
    /// entered. The order is recorded without an owning user.
    ///
    /// # Errors
    ///
    /// Returns the error that stopped the order from being placed or rendered.
    #[tracing::instrument(
        name = "checkout.service.order_on_whatsapp",
        skip(self, caller, request),
        fields(
            idempotency_key = %request.idempotency_key,
            product_uuid = %request.product,
            quantity = request.quantity,
        ),
        err
    )]
    pub async fn order_on_whatsapp(
        &self,
        caller: Caller,
        request: WhatsAppRequest,
    ) -> Result<Handoff, CheckoutError> {
        let saved = self.saved_details(caller).await.unwrap_or_else(|error| {
            warn!(error = %error, "profile unavailable, using the form as entered");

            None
        });

        let form = match saved {
            Some(details) => request.form.fill_blanks_from(&details),
            None => request.form,
        };

        let order = self
            .orders
            .submit_order(NewOrder {
                idempotency_key: request.idempotency_key,
                user: None,
                customer: form.customer,
                address: form.address,
                lines: vec![OrderLine {
                    product: request.product,
                    quantity: request.quantity,
                }],
                order_type: OrderType::Whatsapp,
                shipping_method: ShippingMethod::Standard,
            })
            .await?;

        let link = self.link.for_order(&order)?;

        info!(
            order_uuid = %order.uuid,
            recipient = self.link.recipient(),
            "built hand-off link"
        );

        Ok(Handoff { order, link })
    }

    async fn saved_details(
        &self,
        caller: Caller,
    ) -> Result<Option<ProfileDetails>, ProfilesServiceError> {
        let Some(user) = caller.user else {
            return Ok(None);
        };

        match self.profiles.get_profile(user).await {
            Ok(profile) => Ok(Some(profile.details)),
            Err(ProfilesServiceError::NotFound) => Ok(None),
            Err(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use farmstall::{
        cart::MemoryCartStorage,
        identity::{Role, UserUuid},
        orders::{
            CustomerDetails, IdempotencyKey, OrderItem, OrderItemUuid, OrderStatus, OrderUuid,
            ShippingAddress,
        },
        pricing::ShippingPolicy,
        products::{Product, ProductUuid},
    };
    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::domain::{
        orders::{MockOrdersService, OrdersServiceError},
        profiles::{MockProfilesService, records::ProfileRecord},
    };

    use super::*;

    fn product(name: &str, price: u64) -> Product {
        Product {
            uuid: ProductUuid::new(),
            name: name.to_string(),
            price,
            stock_quantity: 10,
            image_ref: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn form() -> CustomerForm {
        CustomerForm {
            customer: CustomerDetails {
                name: "Divya Nair".to_string(),
                phone: "9847066666".to_string(),
            },
            address: ShippingAddress {
                line1: "18 Lake Road".to_string(),
                line2: None,
                city: "Kollam".to_string(),
                state: "Kerala".to_string(),
                postal_code: "691001".to_string(),
                country: "India".to_string(),
                landmark: None,
            },
        }
    }

    fn profile(user: UserUuid) -> ProfileRecord {
        ProfileRecord {
            user,
            role: Role::User,
            details: ProfileDetails {
                full_name: Some("Saved Name".to_string()),
                phone: Some("9847077777".to_string()),
                address_line1: Some("1 Saved Street".to_string()),
                city: Some("Kannur".to_string()),
                state: Some("Kerala".to_string()),
                postal_code: Some("670001".to_string()),
                country: Some("India".to_string()),
                landmark: Some("Lighthouse".to_string()),
                ..ProfileDetails::default()
            },
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    /// What the orders service would return for `order`, priced at a flat
    /// 100.00 per unit.
    fn placed(order: &NewOrder) -> Order {
        let uuid = OrderUuid::new();
        let items: Vec<OrderItem> = order
            .lines
            .iter()
            .map(|line| OrderItem {
                uuid: OrderItemUuid::new(),
                order: uuid,
                product: line.product,
                product_name: "Cashew Nuts".to_string(),
                quantity: line.quantity,
                unit_price: 100_00,
            })
            .collect();
        let total_amount = items.iter().map(|item| 100_00 * u64::from(item.quantity)).sum();

        Order {
            uuid,
            user: order.user,
            customer: order.customer.clone(),
            address: order.address.clone(),
            total_amount,
            shipping_fee: ShippingPolicy::default()
                .shipping_fee(total_amount, order.shipping_method),
            shipping_method: order.shipping_method,
            status: OrderStatus::Pending,
            order_type: order.order_type,
            idempotency_key: order.idempotency_key,
            items,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn service(orders: MockOrdersService, profiles: MockProfilesService) -> CheckoutService {
        CheckoutService::new(
            Arc::new(orders),
            Arc::new(profiles),
            HandoffLink::new("whatsapp", "+91 90000 00000"),
        )
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            idempotency_key: IdempotencyKey::new(),
            form: form(),
            shipping_method: ShippingMethod::Express,
        }
    }

    #[tokio::test]
    async fn checkout_places_cart_and_clears_it() -> TestResult {
        let user = UserUuid::new();
        let cart = CartStore::new(MemoryCartStorage::new());
        let cashews = product("Cashew Nuts", 100_00);
        let dates = product("Dates", 100_00);

        cart.add(&cashews, 2)?;
        cart.add(&dates, 1)?;

        let mut orders = MockOrdersService::new();

        orders
            .expect_submit_order()
            .withf(move |order| {
                order.user == Some(user)
                    && order.order_type == OrderType::Website
                    && order.shipping_method == ShippingMethod::Express
                    && order.lines.len() == 2
            })
            .times(1)
            .returning(|order| Ok(placed(&order)));

        let checkout = service(orders, MockProfilesService::new());
        let mut events = cart.subscribe();

        let order = checkout
            .checkout(Caller::user(user), &cart, request())
            .await?;

        assert_eq!(order.total_amount, 300_00);
        assert_eq!(order.shipping_fee, 100_00);
        assert!(cart.list()?.is_empty());
        assert_eq!(events.try_recv()?.item_count(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_is_rejected_without_submitting() {
        let cart = CartStore::new(MemoryCartStorage::new());
        let mut orders = MockOrdersService::new();

        orders.expect_submit_order().never();

        let result = service(orders, MockProfilesService::new())
            .checkout(Caller::guest(), &cart, request())
            .await;

        assert!(
            matches!(result, Err(CheckoutError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );
    }

    #[tokio::test]
    async fn failed_checkout_keeps_the_cart() -> TestResult {
        let cart = CartStore::new(MemoryCartStorage::new());
        let cashews = product("Cashew Nuts", 100_00);

        cart.add(&cashews, 3)?;

        let before = cart.cart()?;
        let mut orders = MockOrdersService::new();

        orders.expect_submit_order().returning(move |_| {
            Err(OrdersServiceError::OutOfStock {
                product: cashews.uuid,
                requested: 3,
                available: 1,
            })
        });

        let result = service(orders, MockProfilesService::new())
            .checkout(Caller::guest(), &cart, request())
            .await;

        assert!(
            matches!(
                result,
                Err(CheckoutError::Orders(OrdersServiceError::OutOfStock { .. }))
            ),
            "expected OutOfStock, got {result:?}"
        );
        assert_eq!(cart.cart()?, before);

        Ok(())
    }

    #[tokio::test]
    async fn prefill_uses_saved_profile() -> TestResult {
        let user = UserUuid::new();
        let mut profiles = MockProfilesService::new();

        profiles
            .expect_get_profile()
            .withf(move |requested| *requested == user)
            .returning(|requested| Ok(profile(requested)));

        let form = service(MockOrdersService::new(), profiles)
            .prefill(Caller::user(user))
            .await?;

        assert_eq!(form.customer.name, "Saved Name");
        assert_eq!(form.address.landmark.as_deref(), Some("Lighthouse"));

        Ok(())
    }

    #[tokio::test]
    async fn prefill_is_blank_without_profile() -> TestResult {
        let mut profiles = MockProfilesService::new();

        profiles
            .expect_get_profile()
            .returning(|_| Err(ProfilesServiceError::NotFound));

        let checkout = service(MockOrdersService::new(), profiles);

        assert_eq!(
            checkout.prefill(Caller::user(UserUuid::new())).await?,
            CustomerForm::default()
        );
        assert_eq!(
            checkout.prefill(Caller::guest()).await?,
            CustomerForm::default()
        );

        Ok(())
    }

    #[tokio::test]
    async fn whatsapp_order_is_anonymous_single_line_with_link() -> TestResult {
        let user = UserUuid::new();
        let cashews = ProductUuid::new();
        let mut orders = MockOrdersService::new();
        let mut profiles = MockProfilesService::new();

        profiles
            .expect_get_profile()
            .returning(|requested| Ok(profile(requested)));

        orders
            .expect_submit_order()
            .withf(move |order| {
                order.user.is_none()
                    && order.order_type == OrderType::Whatsapp
                    && order.shipping_method == ShippingMethod::Standard
                    && order.lines == [OrderLine {
                        product: cashews,
                        quantity: 2,
                    }]
            })
            .times(1)
            .returning(|order| Ok(placed(&order)));

        let mut entered = form();

        entered.customer.name = String::new();

        let handoff = service(orders, profiles)
            .order_on_whatsapp(
                Caller::user(user),
                WhatsAppRequest {
                    idempotency_key: IdempotencyKey::new(),
                    product: cashews,
                    quantity: 2,
                    form: entered,
                },
            )
            .await?;

        assert_eq!(handoff.order.customer.name, "Saved Name");
        assert_eq!(handoff.order.customer.phone, "9847066666");
        assert_eq!(
            handoff.order.address.landmark.as_deref(),
            Some("Lighthouse")
        );
        assert!(
            handoff
                .link
                .starts_with("whatsapp://send?recipient=919000000000&text=New+order+%23")
        );
        assert!(handoff.link.contains("Cashew+Nuts+x+2"));

        Ok(())
    }

    #[tokio::test]
    async fn profile_storage_failure_falls_back_to_entered_form() -> TestResult {
        let mut orders = MockOrdersService::new();
        let mut profiles = MockProfilesService::new();
        let entered = form();
        let expected = entered.clone();

        profiles
            .expect_get_profile()
            .returning(|_| Err(ProfilesServiceError::Sql(sqlx::Error::PoolTimedOut)));

        orders
            .expect_submit_order()
            .withf(move |order| {
                order.customer == expected.customer && order.address == expected.address
            })
            .times(1)
            .returning(|order| Ok(placed(&order)));

        let handoff = service(orders, profiles)
            .order_on_whatsapp(
                Caller::user(UserUuid::new()),
                WhatsAppRequest {
                    idempotency_key: IdempotencyKey::new(),
                    product: ProductUuid::new(),
                    quantity: 1,
                    form: entered,
                },
            )
            .await?;

        assert_eq!(handoff.order.order_type, OrderType::Whatsapp);

        Ok(())
    }

    #[tokio::test]
    async fn profile_storage_failure_is_reported_by_prefill() {
        let mut profiles = MockProfilesService::new();

        profiles
            .expect_get_profile()
            .returning(|_| Err(ProfilesServiceError::Sql(sqlx::Error::PoolTimedOut)));

        let result = service(MockOrdersService::new(), profiles)
            .prefill(Caller::user(UserUuid::new()))
            .await;

        assert!(
            matches!(result, Err(CheckoutError::Profiles(_))),
            "expected Profiles, got {result:?}"
        );
    }
}
