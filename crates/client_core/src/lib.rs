//! Client core for the student loan advisor: transcript, request dispatch,
//! loan form and chat input, wired together by [`SessionController`].

pub mod backend;
pub mod clock;
pub mod composer;
pub mod controller;
pub mod error;
pub mod loan_form;
pub mod session;
pub mod transcript;
pub mod view;

pub use backend::{AdvisorBackend, HttpAdvisorBackend};
pub use clock::{Clock, FixedClock, SystemClock};
pub use controller::SessionController;
pub use error::{BackendFailure, FormError};
pub use session::{Event, RequestState, SessionState};
pub use view::SessionView;
