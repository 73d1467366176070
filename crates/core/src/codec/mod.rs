//! Attribute codec (Functional Core - pure functions).
//!
//! Converts schema-less records into the store's tagged wire attributes and
//! back. Numbers travel as `N` attributes holding their decimal string form;
//! everything else travels as `S` attributes holding escaped text, JSON text
//! for nested structures, or a canonical timestamp.
//!
//! Known ambiguity: nested structures share the `S` slot with plain text and
//! are recognised on decode only by a leading `{` or `[`. A plain string that
//! starts with either character is therefore parsed as JSON on the way back.
//! Existing data depends on this rule, so it is kept as is.

mod error;
mod escape;
mod operations;
mod types;

pub use error::CodecError;
pub use escape::{escape_text, unescape_text};
pub use operations::{
    decode_attribute, decode_item, decode_items, encode_record, encode_timestamp, encode_value,
};
pub use types::{Record, WireAttribute, WireItem};
