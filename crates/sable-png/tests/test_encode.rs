//! Round-trip tests against the `png` reference decoder.

use sable_core::bit_depth::BitDepth;
use sable_core::colorspace::ColorSpace;
use sable_core::options::EncoderOptions;
use sable_png::PngEncoder;

fn rgb_options(width: usize, height: usize) -> EncoderOptions {
    EncoderOptions::default()
        .set_width(width)
        .set_height(height)
        .set_colorspace(ColorSpace::RGB)
        .set_depth(BitDepth::Eight)
}

fn encode(pixels: &[u8], options: EncoderOptions) -> Vec<u8> {
    let mut sink = vec![];
    let written = PngEncoder::new(pixels, options).encode(&mut sink).unwrap();
    assert_eq!(written, sink.len());
    sink
}

fn decode_reference(data: &[u8]) -> (png::OutputInfo, Vec<u8>) {
    let decoder = png::Decoder::new(std::io::Cursor::new(data));
    let mut reader = decoder.read_info().unwrap();
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    buf.truncate(info.buffer_size());
    (info, buf)
}

#[test]
fn test_two_by_two_red_image() {
    let red = [255_u8, 0, 0];
    let pixels: Vec<u8> = red.iter().copied().cycle().take(12).collect();

    let encoded = encode(&pixels, rgb_options(2, 2));

    // signature goes out unmangled
    assert_eq!(
        &encoded[..8],
        &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]
    );

    let (info, decoded) = decode_reference(&encoded);
    assert_eq!(info.width, 2);
    assert_eq!(info.height, 2);
    assert_eq!(info.color_type, png::ColorType::Rgb);
    assert_eq!(info.bit_depth, png::BitDepth::Eight);
    assert_eq!(decoded, pixels);
}

#[test]
fn test_non_square_gradient_roundtrips() {
    let (width, height) = (13, 7);
    let mut pixels = vec![0_u8; width * height * 3];

    for y in 0..height {
        for x in 0..width {
            let i = (y * width + x) * 3;
            pixels[i] = (x * 19) as u8;
            pixels[i + 1] = (y * 36) as u8;
            pixels[i + 2] = ((x + y) * 11) as u8;
        }
    }

    let (_, decoded) = decode_reference(&encode(&pixels, rgb_options(width, height)));
    assert_eq!(decoded, pixels);
}

#[test]
fn test_large_image_roundtrips_at_each_level() {
    let (width, height) = (211, 97);
    let pixels: Vec<u8> = (0..width * height * 3)
        .map(|i| ((i * 7) % 251) as u8)
        .collect();

    for level in [-1, 0, 1, 9] {
        let options = rgb_options(width, height).set_level(level);
        let (_, decoded) = decode_reference(&encode(&pixels, options));
        assert_eq!(decoded, pixels, "level {level}");
    }
}

#[test]
fn test_idat_chunks_never_exceed_eight_kib() {
    // highly incompressible image so several IDAT chunks appear
    let (width, height) = (256, 128);
    let mut state = 0xCAFE_BABE_u32;
    let pixels: Vec<u8> = (0..width * height * 3)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect();

    let encoded = encode(&pixels, rgb_options(width, height));

    // walk the chunk list by hand
    let mut offset = 8;
    let mut idat_seen = 0;

    while offset < encoded.len() {
        let length =
            u32::from_be_bytes(encoded[offset..offset + 4].try_into().unwrap()) as usize;
        let chunk_type = &encoded[offset + 4..offset + 8];

        if chunk_type == b"IDAT" {
            assert!(length <= 8192, "IDAT of {length} bytes");
            idat_seen += 1;
        }
        offset += 12 + length;
    }
    assert!(idat_seen > 1, "expected the stream split over chunks");

    let (_, decoded) = decode_reference(&encoded);
    assert_eq!(decoded, pixels);
}

#[test]
fn test_chunk_layout_and_order() {
    let encoded = encode(&[10, 20, 30], rgb_options(1, 1));

    let mut chunk_names = vec![];
    let mut offset = 8;

    while offset < encoded.len() {
        let length =
            u32::from_be_bytes(encoded[offset..offset + 4].try_into().unwrap()) as usize;
        chunk_names.push(encoded[offset + 4..offset + 8].to_vec());
        offset += 12 + length;
    }

    assert_eq!(chunk_names.first().unwrap(), b"IHDR");
    assert_eq!(chunk_names.last().unwrap(), b"IEND");
    assert!(chunk_names.iter().any(|name| name == b"IDAT"));
}

#[test]
fn test_wrong_data_size_is_rejected() {
    let pixels = [0_u8; 11]; // one byte short of 2x2 RGB
    let mut sink = vec![];

    assert!(PngEncoder::new(&pixels, rgb_options(2, 2))
        .encode(&mut sink)
        .is_err());
    assert!(sink.is_empty(), "failed encode must not write output");
}

#[test]
fn test_unsupported_colorspace_is_rejected() {
    let options = rgb_options(2, 2).set_colorspace(ColorSpace::Luma);
    let pixels = [0_u8; 4];
    let mut sink = vec![];

    assert!(PngEncoder::new(&pixels, options).encode(&mut sink).is_err());
}

#[test]
fn test_zero_dimensions_are_rejected() {
    let mut sink = vec![];
    assert!(PngEncoder::new(&[], rgb_options(0, 0)).encode(&mut sink).is_err());
}
