pub mod comment;
pub mod event;
pub mod payment;
pub mod post;
pub mod ticket;
pub mod user;

pub use comment::Comment;
pub use event::Event;
pub use payment::PaymentPrice;
pub use post::Post;
pub use ticket::{Ticket, TicketState};
pub use user::{SafeUser, User, UserRole};
