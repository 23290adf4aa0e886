//! Database Models

// Serde helpers
pub mod serde_helpers;

// Shared value objects
pub mod image_ref;

// Catalog
pub mod product;

// Orders
pub mod order;

// Accounts
pub mod user;

// Re-exports
pub use image_ref::ImageRef;
pub use order::{
    Order, OrderCreate, OrderId, OrderItem, OrderItemInput, OrderStatus, OrderStatusUpdate,
    PaymentInfo, PaymentStatus, ShippingInfo,
};
pub use product::{Category, Product, ProductCreate, ProductId, ProductUpdate, Review};
pub use user::{Role, User, UserId};
