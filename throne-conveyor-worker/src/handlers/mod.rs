// Copyright (c) 2022 Throne Contributors

//! The representative `GetObject` handler pipeline: `CheckJet` binds the
//! item to a jet (or redirects the caller), `WaitForHot` suspends until
//! the jet's hot-data handoff has arrived, and `GetObject` resolves and
//! returns the requested state. Other message kinds are not modeled with
//! a full pipeline of their own; `GetObjectHandler` fails them with
//! `InvalidMessage`.

mod check_jet;
mod get_object;
mod wait_for_hot;

pub use check_jet::CheckJetHandler;
pub use get_object::GetObjectHandler;
pub use wait_for_hot::WaitForHotHandler;
