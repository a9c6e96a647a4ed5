//! Decoder tests against synthetic in-memory bitmaps.

use sable_bmp::{probe_bmp, BmpDecoder, BmpDecoderErrors};

/// Build a 24 bpp BMP from top-down RGB pixels.
///
/// `top_down` controls the sign of the stored height; bottom-up files
/// get their rows written in reverse like every paint program does.
fn make_bmp(width: usize, height: usize, rgb: &[u8], top_down: bool) -> Vec<u8> {
    assert_eq!(rgb.len(), width * height * 3);

    let row_stride = (width * 3 + 3) & !3;
    let data_offset = 54_u32;
    let file_size = data_offset as usize + row_stride * height;

    let mut out = Vec::with_capacity(file_size);

    // file header
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&data_offset.to_le_bytes());

    // BITMAPINFOHEADER
    out.extend_from_slice(&40_u32.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    let stored_height = if top_down {
        -(height as i32)
    } else {
        height as i32
    };
    out.extend_from_slice(&stored_height.to_le_bytes());
    out.extend_from_slice(&1_u16.to_le_bytes()); // planes
    out.extend_from_slice(&24_u16.to_le_bytes()); // bpp
    out.extend_from_slice(&0_u32.to_le_bytes()); // compression
    out.extend_from_slice(&0_u32.to_le_bytes()); // image size
    out.extend_from_slice(&2835_i32.to_le_bytes()); // x resolution
    out.extend_from_slice(&2835_i32.to_le_bytes()); // y resolution
    out.extend_from_slice(&0_u32.to_le_bytes()); // palette colors
    out.extend_from_slice(&0_u32.to_le_bytes()); // important colors

    // pixel rows, BGR with padding
    let rows: Vec<usize> = if top_down {
        (0..height).collect()
    } else {
        (0..height).rev().collect()
    };
    for row in rows {
        for x in 0..width {
            let i = (row * width + x) * 3;
            out.push(rgb[i + 2]);
            out.push(rgb[i + 1]);
            out.push(rgb[i]);
        }
        out.resize(out.len() + row_stride - width * 3, 0);
    }
    out
}

#[test]
fn test_probe() {
    let bmp = make_bmp(1, 1, &[1, 2, 3], false);

    assert!(probe_bmp(&bmp));
    assert!(!probe_bmp(b"PNG is not bmp"));
    assert!(!probe_bmp(b"BM"));
}

#[test]
fn test_single_pixel() {
    let bmp = make_bmp(1, 1, &[200, 100, 50], false);
    let pixels = BmpDecoder::new(&bmp[..]).decode().unwrap();

    assert_eq!(pixels, vec![200, 100, 50]);
}

#[test]
fn test_non_square_orientation() {
    // 3x2 image with a distinct color per pixel so any x/y or
    // row-order mixup shows up immediately
    #[rustfmt::skip]
    let rgb = [
        255, 0, 0,    0, 255, 0,    0, 0, 255,
        10, 20, 30,   40, 50, 60,   70, 80, 90,
    ];

    let bmp = make_bmp(3, 2, &rgb, false);
    let mut decoder = BmpDecoder::new(&bmp[..]);
    let pixels = decoder.decode().unwrap();

    assert_eq!(decoder.dimensions(), Some((3, 2)));
    assert_eq!(pixels, rgb);
}

#[test]
fn test_top_down_file() {
    #[rustfmt::skip]
    let rgb = [
        1, 2, 3,      4, 5, 6,
        7, 8, 9,      10, 11, 12,
        13, 14, 15,   16, 17, 18,
    ];

    let bmp = make_bmp(2, 3, &rgb, true);
    let pixels = BmpDecoder::new(&bmp[..]).decode().unwrap();

    assert_eq!(pixels, rgb);
}

#[test]
fn test_row_padding_is_skipped() {
    // width 3 rows occupy 9 bytes and carry 3 bytes of padding
    let rgb: Vec<u8> = (0..3 * 5 * 3).map(|i| i as u8).collect();
    let bmp = make_bmp(3, 5, &rgb, false);

    let pixels = BmpDecoder::new(&bmp[..]).decode().unwrap();
    assert_eq!(pixels, rgb);
}

#[test]
fn test_bad_magic_is_rejected() {
    let mut bmp = make_bmp(1, 1, &[0, 0, 0], false);
    bmp[0] = b'X';

    let err = BmpDecoder::new(&bmp[..]).decode().unwrap_err();
    assert!(matches!(err, BmpDecoderErrors::InvalidMagicBytes));
}

#[test]
fn test_wrong_depth_is_rejected() {
    let mut bmp = make_bmp(1, 1, &[0, 0, 0], false);
    // depth lives at offset 28
    bmp[28] = 32;

    let err = BmpDecoder::new(&bmp[..]).decode().unwrap_err();
    assert!(matches!(err, BmpDecoderErrors::Unsupported(_)));
}

#[test]
fn test_compressed_file_is_rejected() {
    let mut bmp = make_bmp(1, 1, &[0, 0, 0], false);
    // compression field lives at offset 30
    bmp[30] = 1;

    let err = BmpDecoder::new(&bmp[..]).decode().unwrap_err();
    assert!(matches!(err, BmpDecoderErrors::Unsupported(_)));
}

#[test]
fn test_truncated_pixels_are_rejected() {
    let bmp = make_bmp(4, 4, &[128; 48], false);

    let err = BmpDecoder::new(&bmp[..bmp.len() - 8]).decode().unwrap_err();
    assert!(matches!(err, BmpDecoderErrors::IoErrors(_)));
}
