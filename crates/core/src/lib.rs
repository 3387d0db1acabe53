pub mod config;
pub mod domain;
pub mod errors;

pub use domain::mandate::{MandateId, MandateLineItem, MandateStatus, PaymentMandate};
pub use domain::message::{Message, MessageRole};
pub use domain::order::{Order, OrderId, OrderItem, OrderStatus, User, UserId};
pub use domain::product::{Category, CategoryId, Product, ProductId};
pub use domain::response::{AgentResponse, CarouselItem, OfferDetails};
pub use domain::session::{
    RouteDecision, SessionId, SessionState, Specialist, SuspensionKind, SuspensionRequest,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
