//! Capture Strategy Implementations
//!
//! One implementation per [`checkout_core::CaptureStrategyKind`]; the
//! controller drives all three through the same port and never
//! special-cases the variant after a credential is obtained.

mod card_form;
mod payment_sheet;
mod wallet_button;

pub use card_form::CardFormStrategy;
pub use payment_sheet::PaymentSheetStrategy;
pub use wallet_button::WalletButtonStrategy;
