pub mod address;
pub mod cart;
pub mod order;
pub mod review;
pub mod wallet;
pub mod wishlist;

pub use address::ShippingAddress;
pub use cart::CartLine;
pub use order::{CancellationRequest, Order, OrderStatus, PaymentMode};
pub use review::ProductReview;
pub use wallet::WalletBalance;
pub use wishlist::WishlistEntry;
