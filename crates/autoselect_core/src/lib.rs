//! autoselect core runtime
//!
//! Small single-threaded building blocks for reactive form components:
//!
//! - **Signals**: replay-of-one broadcast channels with multi-listener dispatch
//! - **Scopes**: lifecycle-owned subscriptions, released together on teardown
//! - **Clocks**: injectable time sources for deterministic timers
//! - **Debouncing**: explicit cancel-and-restart quiet periods
//!
//! # Example
//!
//! ```rust
//! use autoselect_core::{Scope, Signal};
//!
//! let text = Signal::with_value(String::new());
//! let upper = Signal::new();
//!
//! let scope = Scope::new();
//! let upper_clone = upper.clone();
//! scope.subscribe(&text, move |t: &String| upper_clone.emit(t.to_uppercase()));
//!
//! text.emit("abc".to_string());
//! assert_eq!(upper.get(), Some("ABC".to_string()));
//! ```

pub mod clock;
pub mod debounce;
pub mod reactive;
pub mod scope;

pub use clock::{Clock, ManualClock, SystemClock};
pub use debounce::Debouncer;
pub use reactive::{focus_signal, ListenerId, Signal, Subscription};
pub use scope::Scope;
