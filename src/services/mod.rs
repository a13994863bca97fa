//! Commerce services - core storefront business logic.

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod pricing;
pub mod reviews;
pub mod wallet;
pub mod wishlist;

// Re-export services for convenience
pub use cart::{parse_cart_snapshot, AddToCartInput, CartService};
pub use checkout::{CheckoutOutcome, CheckoutService};
pub use orders::OrderService;
pub use reviews::{ReviewInput, ReviewService};
pub use wallet::WalletService;
pub use wishlist::{SaveToWishlistInput, WishlistService, WishlistToggle};
