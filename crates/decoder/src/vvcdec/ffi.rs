//! Raw FFI bindings for libvvcdec.
//!
//! The library is loaded at runtime; [`VvcDecFunctions`] is the typed
//! binding table resolved from it by symbol name. Signatures follow
//! `libvvcdec.h`. C++ reference out-parameters (`bool&`) are plain pointers
//! at the ABI level.

use std::ffi::{c_char, c_int};

use rd_common::{DecodeError, PlaneComponent, Subsampling};

use crate::binding::{SymbolResolver, SymbolSource};

// ---------------------------------------------------------------------------
// Opaque handles
// ---------------------------------------------------------------------------

/// Opaque decoder context owned by libvvcdec.
#[repr(C)]
pub struct LibvvcdecContext {
    _private: [u8; 0],
}

// ---------------------------------------------------------------------------
// Enums (libvvcdec_error, libvvcdec_ColorComponent, libvvcdec_ChromaFormat)
// ---------------------------------------------------------------------------

/// `libvvcdec_error`: 0 means success.
pub type LibvvcdecError = c_int;
pub const LIBVVCDEC_OK: LibvvcdecError = 0;

pub type LibvvcdecColorComponent = c_int;
pub const LIBVVCDEC_LUMA: LibvvcdecColorComponent = 0;
pub const LIBVVCDEC_CHROMA_U: LibvvcdecColorComponent = 1;
pub const LIBVVCDEC_CHROMA_V: LibvvcdecColorComponent = 2;

pub type LibvvcdecChromaFormat = c_int;
pub const LIBVVCDEC_CHROMA_400: LibvvcdecChromaFormat = 0;
pub const LIBVVCDEC_CHROMA_420: LibvvcdecChromaFormat = 1;
pub const LIBVVCDEC_CHROMA_422: LibvvcdecChromaFormat = 2;
pub const LIBVVCDEC_CHROMA_444: LibvvcdecChromaFormat = 3;
pub const LIBVVCDEC_CHROMA_UNKNOWN: LibvvcdecChromaFormat = 4;

/// Map a plane to the libvvcdec component code.
pub fn component_code(component: PlaneComponent) -> LibvvcdecColorComponent {
    match component {
        PlaneComponent::Luma => LIBVVCDEC_LUMA,
        PlaneComponent::ChromaU => LIBVVCDEC_CHROMA_U,
        PlaneComponent::ChromaV => LIBVVCDEC_CHROMA_V,
    }
}

/// Map a libvvcdec chroma format code; anything unrecognised is `Unknown`.
pub fn subsampling_from_code(code: LibvvcdecChromaFormat) -> Subsampling {
    match code {
        LIBVVCDEC_CHROMA_400 => Subsampling::Yuv400,
        LIBVVCDEC_CHROMA_420 => Subsampling::Yuv420,
        LIBVVCDEC_CHROMA_422 => Subsampling::Yuv422,
        LIBVVCDEC_CHROMA_444 => Subsampling::Yuv444,
        _ => Subsampling::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Function pointer types
// ---------------------------------------------------------------------------

pub type PfnGetVersion = unsafe extern "C" fn() -> *const c_char;
pub type PfnNewDecoder = unsafe extern "C" fn() -> *mut LibvvcdecContext;
pub type PfnFreeDecoder = unsafe extern "C" fn(*mut LibvvcdecContext) -> LibvvcdecError;
pub type PfnPushNalUnit = unsafe extern "C" fn(
    ctx: *mut LibvvcdecContext,
    data: *const u8,
    length: c_int,
    eof: bool,
    new_picture: *mut bool,
    check_output_pictures: *mut bool,
) -> LibvvcdecError;
pub type PfnGetPicturePoc = unsafe extern "C" fn(*mut LibvvcdecContext) -> u64;
pub type PfnGetPictureDimension =
    unsafe extern "C" fn(*mut LibvvcdecContext, LibvvcdecColorComponent) -> u32;
pub type PfnGetPictureStride =
    unsafe extern "C" fn(*mut LibvvcdecContext, LibvvcdecColorComponent) -> c_int;
pub type PfnGetPicturePlane =
    unsafe extern "C" fn(*mut LibvvcdecContext, LibvvcdecColorComponent) -> *const u8;
pub type PfnGetPictureChromaFormat =
    unsafe extern "C" fn(*mut LibvvcdecContext) -> LibvvcdecChromaFormat;
pub type PfnGetPictureBitDepth =
    unsafe extern "C" fn(*mut LibvvcdecContext, LibvvcdecColorComponent) -> u32;

// ---------------------------------------------------------------------------
// Binding table
// ---------------------------------------------------------------------------

/// Every mandatory libvvcdec entry point, in resolution order.
pub const REQUIRED_SYMBOLS: [&str; 11] = [
    "libvvcdec_get_version",
    "libvvcdec_new_decoder",
    "libvvcdec_free_decoder",
    "libvvcdec_push_nal_unit",
    "libvvcdec_get_picture_POC",
    "libvvcdec_get_picture_width",
    "libvvcdec_get_picture_height",
    "libvvcdec_get_picture_stride",
    "libvvcdec_get_picture_plane",
    "libvvcdec_get_picture_chroma_format",
    "libvvcdec_get_picture_bit_depth",
];

/// Fully resolved libvvcdec binding table.
///
/// Only ever constructed complete: either every slot resolved or
/// [`resolve`](Self::resolve) returned an error. The table does not keep the
/// library alive; its owner must.
#[derive(Copy, Clone)]
pub struct VvcDecFunctions {
    pub get_version: PfnGetVersion,
    pub new_decoder: PfnNewDecoder,
    pub free_decoder: PfnFreeDecoder,
    pub push_nal_unit: PfnPushNalUnit,
    pub get_picture_poc: PfnGetPicturePoc,
    pub get_picture_width: PfnGetPictureDimension,
    pub get_picture_height: PfnGetPictureDimension,
    pub get_picture_stride: PfnGetPictureStride,
    pub get_picture_plane: PfnGetPicturePlane,
    pub get_picture_chroma_format: PfnGetPictureChromaFormat,
    pub get_picture_bit_depth: PfnGetPictureBitDepth,
}

impl std::fmt::Debug for VvcDecFunctions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VvcDecFunctions")
            .field("resolved", &REQUIRED_SYMBOLS.len())
            .finish()
    }
}

impl VvcDecFunctions {
    /// Resolve every mandatory symbol from `source`.
    ///
    /// Stops at the first missing symbol and names it. Has no side effects,
    /// so repeated calls against the same source give the same outcome.
    pub fn resolve<S: SymbolSource + ?Sized>(
        source: &S,
        library: &str,
    ) -> Result<Self, DecodeError> {
        let r = SymbolResolver::new(source, library);

        // SAFETY: each type below is the libvvcdec.h signature of the symbol
        // it is resolved from. `source` must actually be libvvcdec (or a
        // faithful stand-in); that is the contract of loading it as such.
        unsafe {
            Ok(Self {
                get_version: r.required("libvvcdec_get_version")?,
                new_decoder: r.required("libvvcdec_new_decoder")?,
                free_decoder: r.required("libvvcdec_free_decoder")?,
                push_nal_unit: r.required("libvvcdec_push_nal_unit")?,
                get_picture_poc: r.required("libvvcdec_get_picture_POC")?,
                get_picture_width: r.required("libvvcdec_get_picture_width")?,
                get_picture_height: r.required("libvvcdec_get_picture_height")?,
                get_picture_stride: r.required("libvvcdec_get_picture_stride")?,
                get_picture_plane: r.required("libvvcdec_get_picture_plane")?,
                get_picture_chroma_format: r.required("libvvcdec_get_picture_chroma_format")?,
                get_picture_bit_depth: r.required("libvvcdec_get_picture_bit_depth")?,
            })
        }
    }
}

// SAFETY: the table only holds plain function pointers into a library whose
// lifetime is managed by the owner of the table.
unsafe impl Send for VvcDecFunctions {}
unsafe impl Sync for VvcDecFunctions {}
