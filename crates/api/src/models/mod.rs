//! Domain types for the API.
//!
//! These types represent validated domain objects, separate from database
//! row types (in `db`) and the request/response DTOs (in `routes`).

pub mod order;
pub mod product;
pub mod user;

pub use order::{Order, OrderItem, PaymentResult, Transition, TransitionError};
pub use product::{NewProduct, Product, ProductChanges, Review};
pub use user::User;
