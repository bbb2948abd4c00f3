//! Data models for PokeAPI payloads.
//!
//! - `Pokemon`: a single creature record with its types and abilities
//! - `PokemonPage`, `NamedResource`: one offset/limit slice of the full list
//! - `PageDescriptor`: the offset/limit pair that identifies a page

pub mod page;
pub mod pokemon;

pub use page::{NamedResource, PageDescriptor, PokemonPage};
pub use pokemon::{Ability, AbilitySlot, Pokemon, PokemonType, TypeSlot};
