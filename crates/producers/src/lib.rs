//! `agrobase-producers` — rural producer domain.
//!
//! Pure business rules: the producer record itself, CPF/CNPJ document
//! validation, and the land-area consistency invariant. No I/O here.

pub mod area;
pub mod document;
pub mod producer;

pub use area::check_areas;
pub use document::{DocumentKind, TaxId};
pub use producer::{Crop, NewProducer, Producer, ProducerFilter, ProducerPatch};
