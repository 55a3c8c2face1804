//! libvvcdec adapter implementing the `RawDecoder` protocol.

use std::ffi::{c_int, CStr};
use std::path::Path;
use std::ptr;

use rd_common::{
    DecodeError, DecoderConfig, DecoderEngine, DecoderRole, DecoderState, FrameGeometry,
    LibraryInfo, PlaneComponent, RawDecoder, Subsampling, YuvFormat,
};
use tracing::info;

use super::ffi::{
    component_code, subsampling_from_code, LibvvcdecContext, VvcDecFunctions, LIBVVCDEC_OK,
};
use crate::assemble::{assemble_frame, PictureSource, PlaneView};
use crate::binding::{candidate_paths, library_search_dirs, LoadedLibrary};
use crate::log::LogSink;
use crate::state::{DecoderCore, PictureInfo};

const PUSH_CALL: &str = "libvvcdec_push_nal_unit";
const NEW_DECODER_CALL: &str = "libvvcdec_new_decoder";

/// Decoder backed by a dynamically loaded libvvcdec.
///
/// Construction never fails: binding problems put the instance into
/// [`DecoderState::Error`] with the reason, like any other fatal error.
/// A binding error is permanent for the instance; reset does not recover it.
pub struct VvcDecoder {
    /// Keeps the symbols in `functions` valid. `Drop` frees `ctx` first.
    library: Option<LoadedLibrary>,
    functions: Option<VvcDecFunctions>,
    ctx: *mut LibvvcdecContext,
    core: DecoderCore,
    output: Vec<u8>,
    /// `output` holds the assembled current picture.
    output_ready: bool,
}

// SAFETY: the libvvcdec context is only touched through `&mut self` (or
// `&self` for read-only picture queries), never from two threads at once,
// and libvvcdec contexts are not bound to the thread that created them.
unsafe impl Send for VvcDecoder {}

impl std::fmt::Debug for VvcDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VvcDecoder")
            .field("library", &self.library)
            .field("bound", &self.functions.is_some())
            .field("core", &self.core)
            .field("output_len", &self.output.len())
            .finish()
    }
}

impl VvcDecoder {
    /// Load libvvcdec as configured and allocate a decoder instance.
    ///
    /// An explicit `library_file` is tried alone. Otherwise the platform
    /// library names are tried in the standard search directories, the
    /// configured ones, and finally through the platform loader.
    pub fn new(config: &DecoderConfig) -> Self {
        let mut decoder = Self::unbound(config.role);

        let library = match &config.library_file {
            Some(file) => LoadedLibrary::load_file(file),
            None => LoadedLibrary::load_candidate(candidate_paths(
                DecoderEngine::VvcDec.library_names(),
                &library_search_dirs(&config.search_dirs),
            )),
        };
        let library = match library {
            Ok(library) => library,
            Err(e) => {
                decoder.core.set_error(e);
                return decoder;
            }
        };

        let resolved = VvcDecFunctions::resolve(&library, &library.file_name());
        decoder.library = Some(library);
        match resolved {
            Ok(functions) => decoder.bind(functions, config),
            Err(e) => decoder.core.set_error(e),
        }
        decoder
    }

    /// Use an already resolved binding table.
    ///
    /// The functions must stay callable for the lifetime of the decoder.
    /// Used for statically linked or in-process implementations.
    pub fn from_functions(functions: VvcDecFunctions, config: &DecoderConfig) -> Self {
        let mut decoder = Self::unbound(config.role);
        decoder.bind(functions, config);
        decoder
    }

    /// Replace the log sink of this instance.
    pub fn with_log_sink(mut self, sink: Box<dyn LogSink>) -> Self {
        self.core.set_log_sink(sink);
        self
    }

    /// Self-test a candidate library file: load it and resolve every
    /// mandatory symbol. No decoder instance is created.
    pub fn check_library_file(path: &Path) -> Result<(), DecodeError> {
        let library = LoadedLibrary::load_file(path)?;
        VvcDecFunctions::resolve(&library, &library.file_name())?;
        info!(path = %path.display(), "libvvcdec library check passed");
        Ok(())
    }

    /// Picture order count of the picture waiting to be retrieved.
    pub fn picture_poc(&self) -> Option<u64> {
        if self.core.state() != DecoderState::RetrieveFrames {
            return None;
        }
        let functions = self.functions?;
        // SAFETY: a picture is pending, so the context is live and owns it.
        Some(unsafe { (functions.get_picture_poc)(self.ctx) })
    }

    fn unbound(role: DecoderRole) -> Self {
        Self {
            library: None,
            functions: None,
            ctx: ptr::null_mut(),
            core: DecoderCore::new(role),
            output: Vec::new(),
            output_ready: false,
        }
    }

    fn bind(&mut self, functions: VvcDecFunctions, config: &DecoderConfig) {
        self.functions = Some(functions);
        self.core.set_decode_signal(config.decode_signal, 1);
        self.allocate_new_decoder();
    }

    fn allocate_new_decoder(&mut self) {
        let Some(functions) = self.functions else {
            return;
        };
        if !self.ctx.is_null() {
            return;
        }

        self.core.log().debug(format_args!(
            "allocating new decoder, decode signal {}",
            self.core.decode_signal()
        ));
        // SAFETY: no arguments; returns an owned context or null.
        self.ctx = unsafe { (functions.new_decoder)() };
        if self.ctx.is_null() {
            self.core.set_error(DecodeError::DecoderCreation {
                call: NEW_DECODER_CALL,
            });
        }
    }

    fn picture(&self) -> Option<LivePicture<'_>> {
        let functions = self.functions.as_ref()?;
        (!self.ctx.is_null()).then_some(LivePicture {
            functions,
            ctx: self.ctx,
        })
    }

    /// Query the current picture and check it against the negotiated baseline.
    fn negotiate_current_picture(&mut self) -> Result<(), DecodeError> {
        let Some(picture) = self.picture() else {
            return Err(DecodeError::DecoderCreation {
                call: NEW_DECODER_CALL,
            });
        };
        let info = picture.info();
        self.core.negotiate(info)
    }
}

impl Drop for VvcDecoder {
    fn drop(&mut self) {
        if let (Some(functions), false) = (self.functions, self.ctx.is_null()) {
            // SAFETY: `ctx` came from `new_decoder` and has not been freed.
            let code = unsafe { (functions.free_decoder)(self.ctx) };
            self.ctx = ptr::null_mut();
            if code != LIBVVCDEC_OK {
                self.core
                    .log()
                    .warn(format_args!("freeing the decoder failed (error code {code})"));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Live picture access
// ---------------------------------------------------------------------------

/// The current picture of a live libvvcdec context.
struct LivePicture<'a> {
    functions: &'a VvcDecFunctions,
    ctx: *mut LibvvcdecContext,
}

impl LivePicture<'_> {
    fn info(&self) -> PictureInfo {
        PictureInfo {
            geometry: self.geometry(PlaneComponent::Luma),
            subsampling: self.chroma_format(),
            bit_depth: self.bit_depth(PlaneComponent::Luma),
        }
    }
}

// SAFETY: libvvcdec keeps the output picture and its planes alive until the
// next push or until the context is freed. `LivePicture` borrows the adapter,
// so neither can happen while it exists.
unsafe impl PictureSource for LivePicture<'_> {
    fn chroma_format(&self) -> Subsampling {
        // SAFETY: live context.
        subsampling_from_code(unsafe { (self.functions.get_picture_chroma_format)(self.ctx) })
    }

    fn bit_depth(&self, component: PlaneComponent) -> u32 {
        // SAFETY: live context, valid component code.
        unsafe { (self.functions.get_picture_bit_depth)(self.ctx, component_code(component)) }
    }

    fn width(&self, component: PlaneComponent) -> u32 {
        // SAFETY: live context, valid component code.
        unsafe { (self.functions.get_picture_width)(self.ctx, component_code(component)) }
    }

    fn height(&self, component: PlaneComponent) -> u32 {
        // SAFETY: live context, valid component code.
        unsafe { (self.functions.get_picture_height)(self.ctx, component_code(component)) }
    }

    fn plane(&self, component: PlaneComponent) -> Option<PlaneView> {
        let code = component_code(component);
        // SAFETY: live context, valid component code.
        let (data, stride) = unsafe {
            (
                (self.functions.get_picture_plane)(self.ctx, code),
                (self.functions.get_picture_stride)(self.ctx, code),
            )
        };
        (!data.is_null()).then_some(PlaneView {
            data,
            stride: stride as isize,
        })
    }
}

// ---------------------------------------------------------------------------
// RawDecoder
// ---------------------------------------------------------------------------

impl RawDecoder for VvcDecoder {
    fn push_data(&mut self, data: &[u8]) -> bool {
        if !self.core.expect_state(DecoderState::NeedsMoreData, "push_data") {
            return false;
        }
        let Some(functions) = self.functions else {
            return false;
        };

        let end_of_file = data.is_empty();
        if end_of_file {
            self.core
                .log()
                .debug(format_args!("received empty packet, setting EOF"));
        }

        let failed = DecodeError::PushFailed {
            call: PUSH_CALL,
            length: data.len(),
        };
        let Ok(length) = c_int::try_from(data.len()) else {
            return self.core.fail(failed);
        };

        let mut new_picture = false;
        let mut check_output_pictures = false;
        // SAFETY: `data` is valid for `length` bytes for the duration of the
        // call; the out-parameters point to live locals.
        let err = unsafe {
            (functions.push_nal_unit)(
                self.ctx,
                data.as_ptr(),
                length,
                end_of_file,
                &mut new_picture,
                &mut check_output_pictures,
            )
        };
        if err != LIBVVCDEC_OK {
            return self.core.fail(failed);
        }
        self.core.log().debug(format_args!(
            "pushed NAL length {}{}{}",
            data.len(),
            if new_picture { " new picture" } else { "" },
            if check_output_pictures { " check output pictures" } else { "" },
        ));

        if check_output_pictures {
            if let Err(e) = self.negotiate_current_picture() {
                return self.core.fail(e);
            }
            self.core.picture_ready();
            self.output.clear();
            self.output_ready = false;
            if let Some(poc) = self.picture_poc() {
                self.core.log().debug(format_args!("picture ready, POC {poc}"));
            }
        } else if end_of_file {
            self.core.end_of_bitstream();
        }
        true
    }

    fn decode_next_frame(&mut self) -> bool {
        if !self
            .core
            .expect_state(DecoderState::RetrieveFrames, "decode_next_frame")
        {
            return false;
        }
        match self.negotiate_current_picture() {
            Ok(()) => true,
            Err(e) => self.core.fail(e),
        }
    }

    fn raw_frame_data(&mut self) -> Option<&[u8]> {
        if !self
            .core
            .expect_state(DecoderState::RetrieveFrames, "raw_frame_data")
        {
            return None;
        }

        if !self.output_ready {
            let functions = self.functions?;
            let picture = LivePicture {
                functions: &functions,
                ctx: self.ctx,
            };
            match assemble_frame(&picture, &mut self.output) {
                Ok(layout) => {
                    self.core.log().debug(format_args!(
                        "copied frame to buffer, {} bytes ({} planes)",
                        layout.total_bytes(),
                        layout.planes.len()
                    ));
                    self.output_ready = true;
                }
                Err(e) => {
                    self.core.set_error(e);
                    return None;
                }
            }
        }

        self.core.frame_retrieved();
        Some(&self.output)
    }

    fn reset_decoder(&mut self) {
        let Some(functions) = self.functions else {
            self.core
                .log()
                .debug(format_args!("reset: no library binding, staying in error"));
            return;
        };

        self.core.reset();
        self.output.clear();
        self.output_ready = false;

        if !self.ctx.is_null() {
            // SAFETY: `ctx` came from `new_decoder` and has not been freed.
            let code = unsafe { (functions.free_decoder)(self.ctx) };
            self.ctx = ptr::null_mut();
            if code != LIBVVCDEC_OK {
                self.core.set_error(DecodeError::FreeFailed { code });
                return;
            }
        }

        self.allocate_new_decoder();
    }

    fn state(&self) -> DecoderState {
        self.core.state()
    }

    fn error(&self) -> Option<&DecodeError> {
        self.core.error()
    }

    fn frame_geometry(&self) -> Option<FrameGeometry> {
        self.core.geometry()
    }

    fn pixel_format(&self) -> Option<YuvFormat> {
        self.core.format()
    }

    fn library_paths(&self) -> Vec<LibraryInfo> {
        self.library
            .iter()
            .map(|library| LibraryInfo {
                name: DecoderEngine::VvcDec.display_name().to_string(),
                file_name: library.file_name(),
                path: library.path().to_path_buf(),
            })
            .collect()
    }

    fn decoder_name(&self) -> String {
        let fallback = DecoderEngine::VvcDec.display_name().to_string();
        if self.core.state() == DecoderState::Error {
            return fallback;
        }
        let Some(functions) = self.functions else {
            return fallback;
        };
        // SAFETY: returns a static NUL-terminated string or null.
        let version = unsafe { (functions.get_version)() };
        if version.is_null() {
            return fallback;
        }
        // SAFETY: non-null, NUL-terminated, owned by the library.
        unsafe { CStr::from_ptr(version) }
            .to_string_lossy()
            .into_owned()
    }

    fn codec_name(&self) -> &'static str {
        DecoderEngine::VvcDec.codec_name()
    }

    fn role(&self) -> DecoderRole {
        self.core.role()
    }

    fn decode_signal(&self) -> u32 {
        self.core.decode_signal()
    }

    fn set_decode_signal(&mut self, signal: u32) -> bool {
        // Reconstruction is the only signal, so there is never anything to reset.
        self.core.set_decode_signal(signal, 1);
        false
    }
}
