//! Pipeline stages for document review.
//!
//! Each submodule implements one step; the per-format decoders sit behind
//! the [`extract`] dispatcher.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ analyze
//! (bytes)    │           (grammar session, word stats, preview)
//!            ├─ pdf     (pdfium, spawn_blocking)
//!            ├─ docx    (zip + quick-xml)
//!            ├─ legacy  (antiword, optional)
//!            └─ html    (scraper)
//! ```
//!
//! 1. [`input`]: extension whitelist, size cap, filename sanitising
//! 2. [`extract`]: dispatch on [`input::DocumentFormat`]; empty text is an
//!    error for every format
//! 3. [`analyze`]: one [`grammar`] session per call, released on drop

pub mod analyze;
pub mod docx;
pub mod extract;
pub mod grammar;
pub mod html;
pub mod input;
pub mod legacy;
pub mod pdf;
