// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/pixelvault-core

//! End-to-end round-trip tests for pixel (LSB) carriers.

use pixelvault_core::{capacity, decode, encode, encode_file, CarrierKind, Payload, StegoError};

use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Deterministic PNG cover with non-trivial sample values.
fn png_cover(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            ((x * 7 + y * 3) % 256) as u8,
            ((x * 13 + y * 5 + 17) % 256) as u8,
            ((x * 31 + y * 11 + 101) % 256) as u8,
        ])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn message_of(payload: Payload) -> Vec<u8> {
    match payload {
        Payload::Message(bytes) => bytes,
        Payload::File(f) => panic!("expected message, got file {:?}", f.filename),
    }
}

#[test]
fn roundtrip_plain() {
    let cover = png_cover(64, 64);
    let stego = encode(&cover, CarrierKind::Pixel, b"meet at noon", None).unwrap();
    let back = decode(&stego, CarrierKind::Pixel, None).unwrap();
    assert_eq!(message_of(back), b"meet at noon");
}

#[test]
fn roundtrip_with_password() {
    let cover = png_cover(64, 64);
    let stego = encode(&cover, CarrierKind::Pixel, b"classified", Some("hunter2")).unwrap();
    let back = decode(&stego, CarrierKind::Pixel, Some("hunter2")).unwrap();
    assert_eq!(message_of(back), b"classified");
}

#[test]
fn roundtrip_binary_payload() {
    let cover = png_cover(64, 64);
    let payload: Vec<u8> = (0u16..512).map(|i| (i * 97 % 251) as u8).collect();
    let stego = encode(&cover, CarrierKind::Pixel, &payload, Some("pw")).unwrap();
    assert_eq!(message_of(decode(&stego, CarrierKind::Pixel, Some("pw")).unwrap()), payload);
}

#[test]
fn hello_scenario() {
    // A 100x100 24-bit carrier holds 30,000 units, about 3.75 KB raw.
    let cover = png_cover(100, 100);
    let report = capacity(&cover, CarrierKind::Pixel).unwrap();
    assert_eq!(report.total_units, 30_000);
    assert_eq!(report.usable_bytes, 3750 - report.overhead_bytes);

    let stego = encode(&cover, CarrierKind::Pixel, b"Hello", None).unwrap();
    assert_eq!(message_of(decode(&stego, CarrierKind::Pixel, None).unwrap()), b"Hello");

    let stego = encode(&cover, CarrierKind::Pixel, b"Hello", Some("Pass123")).unwrap();
    assert_eq!(
        message_of(decode(&stego, CarrierKind::Pixel, Some("Pass123")).unwrap()),
        b"Hello"
    );
}

#[test]
fn wrong_password_is_authentication_failure() {
    let cover = png_cover(64, 64);
    let stego = encode(&cover, CarrierKind::Pixel, b"secret", Some("pw1")).unwrap();
    assert!(matches!(
        decode(&stego, CarrierKind::Pixel, Some("pw2")),
        Err(StegoError::Authentication)
    ));
}

#[test]
fn missing_password_is_reported() {
    let cover = png_cover(64, 64);
    let stego = encode(&cover, CarrierKind::Pixel, b"secret", Some("pw")).unwrap();
    assert!(matches!(
        decode(&stego, CarrierKind::Pixel, None),
        Err(StegoError::PasswordRequired)
    ));
}

#[test]
fn plain_frame_never_needs_password() {
    let cover = png_cover(64, 64);
    let stego = encode(&cover, CarrierKind::Pixel, b"open", None).unwrap();
    // A password offered for a plain frame is ignored, not an error.
    assert_eq!(
        message_of(decode(&stego, CarrierKind::Pixel, Some("ignored")).unwrap()),
        b"open"
    );
}

#[test]
fn untouched_cover_has_no_hidden_data() {
    let cover = png_cover(48, 48);
    assert!(matches!(
        decode(&cover, CarrierKind::Pixel, None),
        Err(StegoError::UnknownFormat)
    ));
}

#[test]
fn empty_message_rejected() {
    let cover = png_cover(32, 32);
    assert!(matches!(
        encode(&cover, CarrierKind::Pixel, b"", None),
        Err(StegoError::EmptyMessage)
    ));
}

#[test]
fn garbage_carrier_rejected() {
    assert!(matches!(
        encode(b"not an image", CarrierKind::Pixel, b"msg", None),
        Err(StegoError::UnsupportedCarrier(_))
    ));
    assert!(matches!(
        decode(b"not an image", CarrierKind::Pixel, None),
        Err(StegoError::UnsupportedCarrier(_))
    ));
}

#[test]
fn capacity_boundary_exact_and_plus_one() {
    // 16x16 RGB: 768 units -> 96 raw bytes -> 80 usable message bytes.
    let cover = png_cover(16, 16);
    let report = capacity(&cover, CarrierKind::Pixel).unwrap();
    assert_eq!(report.usable_bytes, 80);

    let exact = vec![0x5A; report.usable_bytes];
    let stego = encode(&cover, CarrierKind::Pixel, &exact, None).unwrap();
    assert_eq!(message_of(decode(&stego, CarrierKind::Pixel, None).unwrap()), exact);

    let too_big = vec![0x5A; report.usable_bytes + 1];
    assert!(matches!(
        encode(&cover, CarrierKind::Pixel, &too_big, None),
        Err(StegoError::InsufficientCapacity { needed, available })
            if needed == report.usable_bytes + 1 && available == report.usable_bytes
    ));
}

#[test]
fn capacity_query_is_idempotent_and_readonly() {
    let cover = png_cover(40, 30);
    let first = capacity(&cover, CarrierKind::Pixel).unwrap();
    let second = capacity(&cover, CarrierKind::Pixel).unwrap();
    assert_eq!(first, second);
}

#[test]
fn stego_output_is_png_with_same_dimensions() {
    let cover = png_cover(33, 21);
    let stego = encode(&cover, CarrierKind::Pixel, b"x", None).unwrap();
    let img = image::load_from_memory(&stego).unwrap();
    assert_eq!(img.width(), 33);
    assert_eq!(img.height(), 21);
    // Every sample moved by at most 1.
    let before = image::load_from_memory(&cover).unwrap().to_rgb8();
    let after = img.to_rgb8();
    for (a, b) in before.as_raw().iter().zip(after.as_raw()) {
        assert!((*a as i16 - *b as i16).abs() <= 1);
    }
}

#[test]
fn file_roundtrip_plain_and_encrypted() {
    let cover = png_cover(80, 80);
    let content: Vec<u8> = (0u16..300).map(|i| (i % 256) as u8).collect();

    for password in [None, Some("vault")] {
        let stego =
            encode_file(&cover, CarrierKind::Pixel, "report.pdf", &content, password).unwrap();
        match decode(&stego, CarrierKind::Pixel, password).unwrap() {
            Payload::File(f) => {
                assert_eq!(f.filename, "report.pdf");
                assert_eq!(f.content, content);
            }
            other => panic!("expected file payload, got {other:?}"),
        }
    }
}

#[test]
fn file_with_bad_name_rejected() {
    let cover = png_cover(32, 32);
    assert!(matches!(
        encode_file(&cover, CarrierKind::Pixel, "a|b", b"data", None),
        Err(StegoError::InvalidFilename)
    ));
}

#[test]
fn bmp_cover_is_accepted() {
    let img = RgbImage::from_fn(24, 24, |x, y| Rgb([x as u8, y as u8, (x ^ y) as u8]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Bmp).unwrap();
    let cover = out.into_inner();

    let stego = encode(&cover, CarrierKind::Pixel, b"from bmp", None).unwrap();
    // Output is PNG regardless of the input format.
    assert_eq!(message_of(decode(&stego, CarrierKind::Pixel, None).unwrap()), b"from bmp");
}
