//! Pure data structures for the storefront: catalog records, the cart aggregate, orders and
//! customers. `Cart`, `Customer` and `Order` implement
//! [`ActorEntity`](actor_framework::ActorEntity) in their actor modules.

pub mod cart;
pub mod catalog;
pub mod customer;
pub mod money;
pub mod order;

pub use cart::*;
pub use catalog::*;
pub use customer::*;
pub use money::*;
pub use order::*;
