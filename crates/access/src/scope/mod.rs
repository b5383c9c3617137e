//! Scope resolution: which tenant the user's data operations target.
//!
//! A session is anchored at a home tenant. Users above school level can
//! drill down by selecting a zone, a woreda and a school; the most specific
//! selection becomes the [`EffectiveTenant`].
//!
//! # Narrowing Rules
//!
//! - Selections may only move downward into the home tenant's subtree.
//! - Each level must lie inside the level selected above it.
//! - Selecting a level clears every level below it in the same update.
//! - The selection is reset whenever the session's tenant context changes.

mod resolver;
mod selection;

pub use resolver::{EffectiveTenant, effective_tenant};
pub use selection::{ScopeSelection, SelectionCell};
