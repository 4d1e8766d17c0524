//! # wwnames
//!
//! `wwnames` is a library for recovering music names from Wwise sound banks.
//!
//! Audio embedded in a sound bank is only identified by number. The music objects of a bank
//! (tracks, segments, playlist containers and switch containers) describe which audio plays for
//! which combination of switches and states; given the names of those switches and states, the
//! path to each piece of audio can be turned into a name for it.
//!
//! ```
//! use wwnames::{NameResolver, ObjectGraph, Vocabulary};
//!
//! # fn main() -> Result<(), wwnames::DecodeError> {
//! let banks: Vec<Vec<u8>> = Vec::new();
//! let graph = ObjectGraph::decode_all(&banks)?;
//! let vocab = Vocabulary::new(Vec::new(), Vec::new());
//!
//! let names = NameResolver::new(&graph, &vocab).resolve();
//!
//! for (name, audio_id) in names.iter() {
//!     println!("{audio_id}: {name}");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic, future_incompatible)]
#![deny(
    let_underscore_drop,
    macro_use_extern_crate,
    meta_variable_misuse,
    missing_abi,
    missing_debug_implementations,
    missing_docs,
    non_ascii_idents,
    nonstandard_style,
    noop_method_call,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_op_in_unsafe_fn,
    unused_crate_dependencies,
    unused_import_braces,
    unused_lifetimes,
    unused_macro_rules,
    unused_qualifications,
    unused_results
)]

mod bank;
mod error;
mod graph;
mod names;
mod path;
mod read;
mod resolve;
mod vocab;

pub use bank::object::{
    CompositionObject, GoverningGroup, ObjectKind, PlaylistContainer, Segment, SwitchContainer,
    Track,
};
pub use bank::Soundbank;
pub use error::DecodeError;
pub use graph::ObjectGraph;
pub use names::NameMap;
pub use path::PathNode;
pub use resolve::{NameResolver, ResolveOptions};
pub use vocab::{Element, ElementGroup, GroupKind, Vocabulary};
