//! In-process stand-in for libvvcdec.
//!
//! The fake exports the exact libvvcdec C signatures. A pushed unit describes
//! the picture it produces (see [`PictureSpec`]), so tests control plane
//! sizes, bit depths, strides and failure injection without a real codec.
//! Plane rows are followed by `padding` bytes of [`PAD`].

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::ffi::{c_char, c_int, c_void};
use std::ptr;

use rd_decoder::binding::SymbolSource;
use rd_decoder::vvcdec::ffi::{
    LibvvcdecContext, VvcDecFunctions, LIBVVCDEC_CHROMA_400, LIBVVCDEC_CHROMA_420,
    LIBVVCDEC_CHROMA_422, LIBVVCDEC_CHROMA_UNKNOWN, LIBVVCDEC_OK,
};

pub const PAD: u8 = 0xEE;
pub const VERSION: &str = "fake-libvvcdec 1.0";

const TAG_PICTURE: u8 = 0xA0;
const TAG_DELAYED: u8 = 0xA1;
const TAG_PUSH_ERROR: u8 = 0xF0;
const TAG_FAIL_NEXT_FREE: u8 = 0xF1;

/// `get_picture_plane` returns null for chroma V.
pub const FLAG_NULL_V_PLANE: u8 = 1;
/// Chroma V reports one sample more per row than chroma U.
pub const FLAG_CHROMA_V_WIDER: u8 = 2;

const LIBVVCDEC_ERROR: c_int = 1;

thread_local! {
    static LIVE_CONTEXTS: Cell<isize> = const { Cell::new(0) };
}

/// Decoder contexts allocated and not yet freed on this thread.
pub fn live_contexts() -> isize {
    LIVE_CONTEXTS.with(Cell::get)
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Description of one picture, encoded into a pushed unit.
#[derive(Clone, Copy, Debug)]
pub struct PictureSpec {
    pub chroma: c_int,
    pub luma_bits: u32,
    pub chroma_bits: u32,
    pub width: u16,
    pub height: u16,
    pub padding: u8,
    pub flags: u8,
}

impl PictureSpec {
    pub fn new(chroma: c_int, bits: u32, width: u16, height: u16) -> Self {
        Self {
            chroma,
            luma_bits: bits,
            chroma_bits: bits,
            width,
            height,
            padding: 0,
            flags: 0,
        }
    }

    pub fn padding(mut self, padding: u8) -> Self {
        self.padding = padding;
        self
    }

    pub fn chroma_bits(mut self, bits: u32) -> Self {
        self.chroma_bits = bits;
        self
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    /// A unit that outputs this picture immediately.
    pub fn unit(&self) -> Vec<u8> {
        self.encode(TAG_PICTURE)
    }

    /// A unit whose picture is only output by the next end-of-stream push.
    pub fn delayed_unit(&self) -> Vec<u8> {
        self.encode(TAG_DELAYED)
    }

    /// Logical rows of one plane as the adapter should emit them.
    pub fn expected_plane(&self, component: usize) -> Vec<u8> {
        let picture = FakePicture::build(self, 0);
        let row = picture.row_bytes(component);
        let stride = picture.stride[component] as usize;
        picture.planes[component]
            .as_deref()
            .unwrap_or_default()
            .chunks(stride.max(1))
            .flat_map(|r| r[..row].iter().copied())
            .collect()
    }

    fn encode(&self, tag: u8) -> Vec<u8> {
        let mut unit = vec![
            tag,
            self.chroma as u8,
            self.luma_bits as u8,
            self.chroma_bits as u8,
        ];
        unit.extend(self.width.to_le_bytes());
        unit.extend(self.height.to_le_bytes());
        unit.push(self.padding);
        unit.push(self.flags);
        unit
    }

    fn decode(unit: &[u8]) -> Option<Self> {
        if unit.len() < 10 {
            return None;
        }
        Some(Self {
            chroma: c_int::from(unit[1]),
            luma_bits: u32::from(unit[2]),
            chroma_bits: u32::from(unit[3]),
            width: u16::from_le_bytes([unit[4], unit[5]]),
            height: u16::from_le_bytes([unit[6], unit[7]]),
            padding: unit[8],
            flags: unit[9],
        })
    }
}

/// A unit the fake rejects with an error code.
pub fn failing_unit() -> Vec<u8> {
    vec![TAG_PUSH_ERROR, 1, 2, 3]
}

/// A unit that makes the next `free_decoder` on this context report failure.
pub fn fail_next_free_unit() -> Vec<u8> {
    vec![TAG_FAIL_NEXT_FREE]
}

/// A unit that produces no picture.
pub fn parameter_set_unit() -> Vec<u8> {
    vec![0x00, 0x79, 0x01, 0x02]
}

/// Deterministic sample value; never equal to [`PAD`].
pub fn sample_value(component: usize, x: usize, y: usize) -> u8 {
    ((component * 50 + y * 7 + x) % 200) as u8
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

struct FakePicture {
    poc: u64,
    chroma: c_int,
    bits: [u32; 3],
    width: [u32; 3],
    height: [u32; 3],
    stride: [c_int; 3],
    planes: [Option<Vec<u8>>; 3],
}

impl FakePicture {
    fn build(spec: &PictureSpec, poc: u64) -> Self {
        let (w, h) = (u32::from(spec.width), u32::from(spec.height));
        let (cw, ch) = match spec.chroma {
            LIBVVCDEC_CHROMA_400 => (0, 0),
            LIBVVCDEC_CHROMA_420 => (w.div_ceil(2), h.div_ceil(2)),
            LIBVVCDEC_CHROMA_422 => (w.div_ceil(2), h),
            _ => (w, h),
        };
        let v_extra = u32::from(spec.flags & FLAG_CHROMA_V_WIDER != 0);

        let mut picture = Self {
            poc,
            chroma: spec.chroma,
            bits: [spec.luma_bits, spec.chroma_bits, spec.chroma_bits],
            width: [w, cw, cw + v_extra],
            height: [h, ch, ch],
            stride: [0; 3],
            planes: [None, None, None],
        };

        for c in 0..3 {
            let row = picture.row_bytes(c);
            picture.stride[c] = (row + usize::from(spec.padding)) as c_int;
            if c == 2 && spec.flags & FLAG_NULL_V_PLANE != 0 {
                continue;
            }
            let mut data = Vec::new();
            for y in 0..picture.height[c] as usize {
                data.extend((0..row).map(|x| sample_value(c, x, y)));
                data.extend(std::iter::repeat(PAD).take(usize::from(spec.padding)));
            }
            picture.planes[c] = Some(data);
        }
        picture
    }

    fn row_bytes(&self, c: usize) -> usize {
        let sample = if self.bits[c] > 8 { 2 } else { 1 };
        self.width[c] as usize * sample
    }
}

#[derive(Default)]
struct FakeContext {
    picture: Option<FakePicture>,
    delayed: VecDeque<PictureSpec>,
    next_poc: u64,
    fail_next_free: bool,
}

impl FakeContext {
    fn output(&mut self, spec: &PictureSpec) {
        self.picture = Some(FakePicture::build(spec, self.next_poc));
        self.next_poc += 1;
    }
}

unsafe fn current_picture<'a>(ctx: *mut LibvvcdecContext) -> Option<&'a FakePicture> {
    (ctx as *const FakeContext).as_ref()?.picture.as_ref()
}

fn component_index(component: c_int) -> Option<usize> {
    usize::try_from(component).ok().filter(|c| *c < 3)
}

// ---------------------------------------------------------------------------
// Exported functions
// ---------------------------------------------------------------------------

unsafe extern "C" fn fake_get_version() -> *const c_char {
    c"fake-libvvcdec 1.0".as_ptr()
}

unsafe extern "C" fn fake_new_decoder() -> *mut LibvvcdecContext {
    LIVE_CONTEXTS.with(|live| live.set(live.get() + 1));
    Box::into_raw(Box::<FakeContext>::default()).cast()
}

unsafe extern "C" fn fake_new_decoder_null() -> *mut LibvvcdecContext {
    ptr::null_mut()
}

unsafe extern "C" fn fake_free_decoder(ctx: *mut LibvvcdecContext) -> c_int {
    if ctx.is_null() {
        return LIBVVCDEC_ERROR;
    }
    let ctx = Box::from_raw(ctx.cast::<FakeContext>());
    LIVE_CONTEXTS.with(|live| live.set(live.get() - 1));
    if ctx.fail_next_free {
        LIBVVCDEC_ERROR
    } else {
        LIBVVCDEC_OK
    }
}

unsafe extern "C" fn fake_push_nal_unit(
    ctx: *mut LibvvcdecContext,
    data: *const u8,
    length: c_int,
    eof: bool,
    new_picture: *mut bool,
    check_output_pictures: *mut bool,
) -> c_int {
    let Some(ctx) = ctx.cast::<FakeContext>().as_mut() else {
        return LIBVVCDEC_ERROR;
    };
    let unit: &[u8] = match usize::try_from(length) {
        Ok(len) if len > 0 => std::slice::from_raw_parts(data, len),
        _ => &[],
    };

    *new_picture = false;
    *check_output_pictures = false;
    ctx.picture = None;

    match unit.first() {
        Some(&TAG_PUSH_ERROR) => return LIBVVCDEC_ERROR,
        Some(&TAG_FAIL_NEXT_FREE) => ctx.fail_next_free = true,
        Some(&TAG_PICTURE) => {
            if let Some(spec) = PictureSpec::decode(unit) {
                ctx.output(&spec);
                *new_picture = true;
                *check_output_pictures = true;
            }
        }
        Some(&TAG_DELAYED) => {
            if let Some(spec) = PictureSpec::decode(unit) {
                ctx.delayed.push_back(spec);
                *new_picture = true;
            }
        }
        _ => {}
    }

    if eof {
        if let Some(spec) = ctx.delayed.pop_front() {
            ctx.output(&spec);
            *check_output_pictures = true;
        }
    }
    LIBVVCDEC_OK
}

unsafe extern "C" fn fake_get_picture_poc(ctx: *mut LibvvcdecContext) -> u64 {
    current_picture(ctx).map_or(0, |p| p.poc)
}

unsafe extern "C" fn fake_get_picture_width(ctx: *mut LibvvcdecContext, c: c_int) -> u32 {
    current_picture(ctx)
        .zip(component_index(c))
        .map_or(0, |(p, i)| p.width[i])
}

unsafe extern "C" fn fake_get_picture_height(ctx: *mut LibvvcdecContext, c: c_int) -> u32 {
    current_picture(ctx)
        .zip(component_index(c))
        .map_or(0, |(p, i)| p.height[i])
}

unsafe extern "C" fn fake_get_picture_stride(ctx: *mut LibvvcdecContext, c: c_int) -> c_int {
    current_picture(ctx)
        .zip(component_index(c))
        .map_or(0, |(p, i)| p.stride[i])
}

unsafe extern "C" fn fake_get_picture_plane(ctx: *mut LibvvcdecContext, c: c_int) -> *const u8 {
    current_picture(ctx)
        .zip(component_index(c))
        .and_then(|(p, i)| p.planes[i].as_ref())
        .map_or(ptr::null(), |plane| plane.as_ptr())
}

unsafe extern "C" fn fake_get_picture_chroma_format(ctx: *mut LibvvcdecContext) -> c_int {
    current_picture(ctx).map_or(LIBVVCDEC_CHROMA_UNKNOWN, |p| p.chroma)
}

unsafe extern "C" fn fake_get_picture_bit_depth(ctx: *mut LibvvcdecContext, c: c_int) -> u32 {
    current_picture(ctx)
        .zip(component_index(c))
        .map_or(0, |(p, i)| p.bits[i])
}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

/// The fake as a resolved binding table.
pub fn functions() -> VvcDecFunctions {
    VvcDecFunctions {
        get_version: fake_get_version,
        new_decoder: fake_new_decoder,
        free_decoder: fake_free_decoder,
        push_nal_unit: fake_push_nal_unit,
        get_picture_poc: fake_get_picture_poc,
        get_picture_width: fake_get_picture_width,
        get_picture_height: fake_get_picture_height,
        get_picture_stride: fake_get_picture_stride,
        get_picture_plane: fake_get_picture_plane,
        get_picture_chroma_format: fake_get_picture_chroma_format,
        get_picture_bit_depth: fake_get_picture_bit_depth,
    }
}

/// Binding table whose `new_decoder` always fails.
pub fn functions_without_decoder() -> VvcDecFunctions {
    VvcDecFunctions {
        new_decoder: fake_new_decoder_null,
        ..functions()
    }
}

/// Exported symbol table of the fake, addressable by name.
pub struct FakeSymbols {
    symbols: HashMap<&'static str, *mut c_void>,
}

impl FakeSymbols {
    pub fn complete() -> Self {
        let f = functions();
        let symbols = HashMap::from([
            ("libvvcdec_get_version", f.get_version as *const () as *mut c_void),
            ("libvvcdec_new_decoder", f.new_decoder as *const () as *mut c_void),
            ("libvvcdec_free_decoder", f.free_decoder as *const () as *mut c_void),
            ("libvvcdec_push_nal_unit", f.push_nal_unit as *const () as *mut c_void),
            ("libvvcdec_get_picture_POC", f.get_picture_poc as *const () as *mut c_void),
            ("libvvcdec_get_picture_width", f.get_picture_width as *const () as *mut c_void),
            ("libvvcdec_get_picture_height", f.get_picture_height as *const () as *mut c_void),
            ("libvvcdec_get_picture_stride", f.get_picture_stride as *const () as *mut c_void),
            ("libvvcdec_get_picture_plane", f.get_picture_plane as *const () as *mut c_void),
            (
                "libvvcdec_get_picture_chroma_format",
                f.get_picture_chroma_format as *const () as *mut c_void,
            ),
            (
                "libvvcdec_get_picture_bit_depth",
                f.get_picture_bit_depth as *const () as *mut c_void,
            ),
        ]);
        Self { symbols }
    }

    pub fn without(mut self, name: &str) -> Self {
        self.symbols.remove(name);
        self
    }
}

impl SymbolSource for FakeSymbols {
    fn raw_symbol(&self, name: &str) -> Option<*mut c_void> {
        self.symbols.get(name).copied()
    }
}
