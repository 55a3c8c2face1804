//! Frame assembler.
//!
//! Turns the strided planes of a decoded picture into one contiguous raw
//! frame: luma, chroma U, chroma V (chroma absent for 4:0:0), each plane
//! row-major without padding and with 1 or 2 bytes per sample.
//!
//! The codec side is abstracted by [`PictureSource`], so the same copy path
//! serves the live adapter and synthetic pictures in tests.

use rd_common::{
    sample_width, DecodeError, FrameGeometry, PlaneComponent, Subsampling, BIT_DEPTH_RANGE,
};

/// Borrowed view of one native plane.
#[derive(Copy, Clone, Debug)]
pub struct PlaneView {
    pub data: *const u8,
    /// Byte distance between the starts of consecutive rows.
    pub stride: isize,
}

/// Read access to the current picture of a codec.
///
/// # Safety
/// For as long as the source is borrowed, every non-null [`PlaneView`]
/// returned by [`plane`](PictureSource::plane) must point to at least
/// `height` rows spaced `stride` bytes apart, each readable for `stride`
/// bytes (the last row for at least the logical row width), where `height`
/// is what [`height`](PictureSource::height) reports for that component.
pub unsafe trait PictureSource {
    fn chroma_format(&self) -> Subsampling;
    fn bit_depth(&self, component: PlaneComponent) -> u32;
    fn width(&self, component: PlaneComponent) -> u32;
    fn height(&self, component: PlaneComponent) -> u32;
    fn plane(&self, component: PlaneComponent) -> Option<PlaneView>;

    fn geometry(&self, component: PlaneComponent) -> FrameGeometry {
        FrameGeometry::new(self.width(component), self.height(component))
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Where one plane lands in the assembled frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlaneLayout {
    pub component: PlaneComponent,
    pub geometry: FrameGeometry,
    /// Logical bytes per row (width times sample width).
    pub row_bytes: usize,
    /// Offset of the plane in the assembled frame.
    pub offset: usize,
}

impl PlaneLayout {
    pub fn len(&self) -> usize {
        self.row_bytes * self.geometry.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Byte layout of one assembled frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameLayout {
    pub subsampling: Subsampling,
    pub bits_per_sample: u32,
    pub sample_width: usize,
    pub planes: Vec<PlaneLayout>,
}

impl FrameLayout {
    pub fn luma_bytes(&self) -> usize {
        self.planes.first().map_or(0, PlaneLayout::len)
    }

    /// Bytes of one chroma plane (0 for monochrome).
    pub fn chroma_bytes(&self) -> usize {
        self.planes.get(1).map_or(0, PlaneLayout::len)
    }

    pub fn total_bytes(&self) -> usize {
        self.luma_bytes() + 2 * self.chroma_bytes()
    }
}

/// Work out the output layout of the current picture, rejecting anything
/// that cannot be assembled.
pub fn frame_layout<S: PictureSource + ?Sized>(src: &S) -> Result<FrameLayout, DecodeError> {
    let subsampling = src.chroma_format();
    if subsampling == Subsampling::Unknown {
        return Err(DecodeError::UnknownChromaFormat);
    }

    let bits_per_sample = src.bit_depth(PlaneComponent::Luma);
    if !BIT_DEPTH_RANGE.contains(&bits_per_sample) {
        return Err(DecodeError::InvalidBitDepth {
            component: PlaneComponent::Luma,
            bits: bits_per_sample,
        });
    }
    let width = sample_width(bits_per_sample);

    let luma = src.geometry(PlaneComponent::Luma);
    if !luma.is_valid() {
        return Err(DecodeError::InvalidPictureSize(luma));
    }

    let mut planes = vec![PlaneLayout {
        component: PlaneComponent::Luma,
        geometry: luma,
        row_bytes: luma.width as usize * width,
        offset: 0,
    }];

    if subsampling.plane_count() > 1 {
        for component in [PlaneComponent::ChromaU, PlaneComponent::ChromaV] {
            let bits = src.bit_depth(component);
            if sample_width(bits) != width {
                return Err(DecodeError::MixedSampleWidth {
                    component,
                    bits,
                    luma_bits: bits_per_sample,
                });
            }
        }

        let u = src.geometry(PlaneComponent::ChromaU);
        let v = src.geometry(PlaneComponent::ChromaV);
        if u != v {
            return Err(DecodeError::ChromaSizeMismatch { u, v });
        }
        if !u.is_valid() {
            return Err(DecodeError::InvalidPictureSize(u));
        }

        let luma_bytes = planes[0].len();
        let row_bytes = u.width as usize * width;
        let chroma_bytes = row_bytes * u.height as usize;
        planes.push(PlaneLayout {
            component: PlaneComponent::ChromaU,
            geometry: u,
            row_bytes,
            offset: luma_bytes,
        });
        planes.push(PlaneLayout {
            component: PlaneComponent::ChromaV,
            geometry: v,
            row_bytes,
            offset: luma_bytes + chroma_bytes,
        });
    }

    Ok(FrameLayout {
        subsampling,
        bits_per_sample,
        sample_width: width,
        planes,
    })
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Copy the current picture of `src` into `out`.
///
/// `out` is cleared and resized, reusing its allocation when large enough.
/// On error `out` is left empty.
pub fn assemble_frame<S: PictureSource + ?Sized>(
    src: &S,
    out: &mut Vec<u8>,
) -> Result<FrameLayout, DecodeError> {
    out.clear();
    let layout = frame_layout(src)?;

    // Collect every plane before copying so a bad plane leaves no partial frame.
    let mut views = Vec::with_capacity(layout.planes.len());
    for plane in &layout.planes {
        let view = src
            .plane(plane.component)
            .filter(|view| !view.data.is_null())
            .ok_or(DecodeError::MissingPlane(plane.component))?;
        if view.stride < 0 || (view.stride as usize) < plane.row_bytes {
            return Err(DecodeError::InvalidStride {
                component: plane.component,
                stride: view.stride,
                row_bytes: plane.row_bytes,
            });
        }
        views.push(view);
    }

    out.resize(layout.total_bytes(), 0);
    for (plane, view) in layout.planes.iter().zip(&views) {
        let dst = &mut out[plane.offset..plane.offset + plane.len()];
        for (y, row) in dst.chunks_exact_mut(plane.row_bytes).enumerate() {
            // SAFETY: `y < height` and the stride covers a row, so the row
            // lies inside the plane that `PictureSource` vouches for.
            let src_row = unsafe {
                std::slice::from_raw_parts(view.data.offset(y as isize * view.stride), plane.row_bytes)
            };
            row.copy_from_slice(src_row);
        }
    }

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAD: u8 = 0xEE;

    /// Planes stored with explicit padding at the end of every row.
    struct PaddedPicture {
        subsampling: Subsampling,
        bits: [u32; 3],
        geometry: [FrameGeometry; 3],
        stride: [isize; 3],
        planes: [Option<Vec<u8>>; 3],
    }

    impl PaddedPicture {
        fn new(subsampling: Subsampling, bits: u32, width: u32, height: u32, padding: usize) -> Self {
            let luma = FrameGeometry::new(width, height);
            let chroma = subsampling.chroma_geometry(luma).unwrap_or(luma);
            let geometry = [luma, chroma, chroma];
            let sw = sample_width(bits);

            let mut stride = [0; 3];
            let mut planes: [Option<Vec<u8>>; 3] = [None, None, None];
            for c in 0..3 {
                let row = geometry[c].width as usize * sw;
                stride[c] = (row + padding) as isize;
                let mut data = Vec::new();
                for y in 0..geometry[c].height as usize {
                    data.extend((0..row).map(|x| (c * 64 + y * 8 + x) as u8 & 0x7F));
                    data.extend(std::iter::repeat(PAD).take(padding));
                }
                planes[c] = Some(data);
            }

            Self {
                subsampling,
                bits: [bits; 3],
                geometry,
                stride,
                planes,
            }
        }
    }

    unsafe impl PictureSource for PaddedPicture {
        fn chroma_format(&self) -> Subsampling {
            self.subsampling
        }

        fn bit_depth(&self, component: PlaneComponent) -> u32 {
            self.bits[component as usize]
        }

        fn width(&self, component: PlaneComponent) -> u32 {
            self.geometry[component as usize].width
        }

        fn height(&self, component: PlaneComponent) -> u32 {
            self.geometry[component as usize].height
        }

        fn plane(&self, component: PlaneComponent) -> Option<PlaneView> {
            let c = component as usize;
            self.planes[c].as_ref().map(|data| PlaneView {
                data: data.as_ptr(),
                stride: self.stride[c],
            })
        }
    }

    #[test]
    fn monochrome_8bit_16x16_is_256_bytes() {
        let pic = PaddedPicture::new(Subsampling::Yuv400, 8, 16, 16, 0);
        let mut out = Vec::new();
        let layout = assemble_frame(&pic, &mut out).unwrap();
        assert_eq!(out.len(), 256);
        assert_eq!(layout.planes.len(), 1);
        assert_eq!(layout.chroma_bytes(), 0);
    }

    #[test]
    fn yuv420_10bit_4x4_is_48_bytes() {
        let pic = PaddedPicture::new(Subsampling::Yuv420, 10, 4, 4, 0);
        let mut out = Vec::new();
        let layout = assemble_frame(&pic, &mut out).unwrap();
        assert_eq!(layout.sample_width, 2);
        assert_eq!(layout.luma_bytes(), 32);
        assert_eq!(layout.chroma_bytes(), 8);
        assert_eq!(out.len(), 48);
    }

    #[test]
    fn padding_never_reaches_output() {
        let pic = PaddedPicture::new(Subsampling::Yuv420, 8, 6, 4, 10);
        let mut out = Vec::new();
        let layout = assemble_frame(&pic, &mut out).unwrap();

        assert_eq!(out.len(), 6 * 4 + 2 * 3 * 2);
        assert!(!out.contains(&PAD));

        // Byte-exact: each plane is the logical rows of the source in order.
        for plane in &layout.planes {
            let c = plane.component as usize;
            let src = pic.planes[c].as_ref().unwrap();
            let stride = pic.stride[c] as usize;
            let expected: Vec<u8> = src
                .chunks(stride)
                .flat_map(|row| row[..plane.row_bytes].iter().copied())
                .collect();
            assert_eq!(&out[plane.offset..plane.offset + plane.len()], &expected[..]);
        }
    }

    #[test]
    fn output_allocation_is_reused() {
        let pic = PaddedPicture::new(Subsampling::Yuv444, 8, 8, 8, 4);
        let mut out = Vec::new();
        assemble_frame(&pic, &mut out).unwrap();
        let capacity = out.capacity();
        let ptr = out.as_ptr();

        assemble_frame(&pic, &mut out).unwrap();
        assert_eq!(out.capacity(), capacity);
        assert_eq!(out.as_ptr(), ptr);
        assert_eq!(out.len(), 3 * 64);
    }

    #[test]
    fn null_plane_is_fatal() {
        let mut pic = PaddedPicture::new(Subsampling::Yuv420, 8, 4, 4, 0);
        pic.planes[2] = None;
        let mut out = vec![1, 2, 3];
        let err = assemble_frame(&pic, &mut out).unwrap_err();
        assert_eq!(err, DecodeError::MissingPlane(PlaneComponent::ChromaV));
        assert!(out.is_empty());
    }

    #[test]
    fn mixed_sample_width_is_fatal() {
        let mut pic = PaddedPicture::new(Subsampling::Yuv420, 8, 4, 4, 0);
        pic.bits[1] = 10;
        let err = assemble_frame(&pic, &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MixedSampleWidth {
                component: PlaneComponent::ChromaU,
                bits: 10,
                luma_bits: 8
            }
        ));
    }

    #[test]
    fn mixed_depth_with_same_width_is_accepted() {
        let mut pic = PaddedPicture::new(Subsampling::Yuv420, 10, 4, 4, 0);
        pic.bits[2] = 12;
        assert!(assemble_frame(&pic, &mut Vec::new()).is_ok());
    }

    #[test]
    fn chroma_size_mismatch_is_fatal() {
        let mut pic = PaddedPicture::new(Subsampling::Yuv420, 8, 4, 4, 0);
        pic.geometry[2] = FrameGeometry::new(1, 2);
        let err = assemble_frame(&pic, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, DecodeError::ChromaSizeMismatch { .. }));
    }

    #[test]
    fn short_stride_is_fatal() {
        let mut pic = PaddedPicture::new(Subsampling::Yuv400, 8, 4, 4, 0);
        pic.stride[0] = 3;
        let err = assemble_frame(&pic, &mut Vec::new()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidStride {
                component: PlaneComponent::Luma,
                stride: 3,
                row_bytes: 4,
            }
        );
    }

    #[test]
    fn unknown_format_and_bad_sizes_are_fatal() {
        let mut pic = PaddedPicture::new(Subsampling::Yuv420, 8, 4, 4, 0);
        pic.subsampling = Subsampling::Unknown;
        assert_eq!(
            frame_layout(&pic).unwrap_err(),
            DecodeError::UnknownChromaFormat
        );

        let mut pic = PaddedPicture::new(Subsampling::Yuv400, 8, 4, 4, 0);
        pic.geometry[0] = FrameGeometry::new(0, 4);
        assert!(matches!(
            frame_layout(&pic).unwrap_err(),
            DecodeError::InvalidPictureSize(_)
        ));

        let mut pic = PaddedPicture::new(Subsampling::Yuv400, 8, 4, 4, 0);
        pic.bits[0] = 17;
        assert!(matches!(
            frame_layout(&pic).unwrap_err(),
            DecodeError::InvalidBitDepth { bits: 17, .. }
        ));
    }
}
