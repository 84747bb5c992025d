//! Social login SDK pieces.
//!
//! - [`login`]: embedded web view OAuth login. Builds the dialog request,
//!   interprets redirects (including caller-supplied custom redirect URIs)
//!   and reports one outcome per attempt.
//! - [`attribution`]: forwards app events to the platform measurement API
//!   as attribution triggers.

pub mod attribution;
pub mod login;
