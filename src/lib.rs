//! Signup Reconcile: attaches sign-up profile fields to an account once the
//! backend has provisioned it.

pub mod account;
pub mod config;
pub mod error;
pub mod profile;
pub mod reconcile;
