pub mod checkout;
pub mod ledger;
pub mod memory;
pub mod models;
pub mod orchestrator;

pub use checkout::{CheckoutService, PaymentConfirmation, SandboxGateway};
pub use ledger::{BookingError, BookingLedger, BookingRepository};
pub use models::{Booking, BookingStatus, CreateBookingRequest, PaymentState};
pub use orchestrator::BookingOrchestrator;
