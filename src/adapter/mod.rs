//! Cross-boundary adapters.
//!
//! The host describes its listener as a `#[repr(C)]` table: an opaque context
//! pointer, optional `retain`/`release` functions managing that context's
//! lifetime, and one function pointer per callback. The adapters in this
//! module implement the engine's listener traits on top of such a table:
//!
//! - [`HostImageListener`] implements [`rb_core::ImageProgress`] over
//!   [`RbImageListener`].
//! - [`HostConversionListener`] implements [`rb_core::ConversionProgress`] over
//!   [`RbConversionListener`].
//!
//! Each adapter owns a [`ListenerHandle`] for exactly one call and releases it
//! when dropped. Callbacks are resolved when invoked; a missing entry fails the
//! call with [`rb_core::Error::MissingCallback`] and there is no fallback.

mod conversion;
mod handle;
mod image;
pub mod value;

pub use conversion::{HostConversionListener, RbConversionListener};
pub use handle::{ListenerHandle, ReleaseFn, RetainFn};
pub use image::{HostImageListener, RbImageListener};
