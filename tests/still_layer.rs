use std::io::Cursor;

use wavyte_layers::{Layer, LayerError, PixelSize, RawPixels, RawSamples, StillImageLayer};

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "wavyte_layers_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn write_png(path: &std::path::Path, img: image::DynamicImage) {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(path, &buf).unwrap();
}

fn rgb_image(width: u32, height: u32) -> image::DynamicImage {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([x as u8 * 10, y as u8 * 10, 128])
    });
    image::DynamicImage::ImageRgb8(img)
}

fn assert_window(layer: &StillImageLayer, d: f64) {
    assert!(!layer.get_key(-1e-9));
    assert!(layer.get_key(0.0));
    assert!(layer.get_key(d * 0.5));
    assert!(layer.get_key(d - 1e-9));
    assert!(!layer.get_key(d));
    assert!(!layer.get_key(d + 1.0));
}

#[test]
fn key_window_holds_for_every_input_kind() {
    let tmp = temp_dir("still_key_window");
    std::fs::create_dir_all(&tmp).unwrap();
    let png = tmp.join("img.png");
    write_png(&png, rgb_image(4, 3));

    let d = 2.5;
    assert_window(&StillImageLayer::with_duration(png.as_path(), d).unwrap(), d);
    assert_window(&StillImageLayer::with_duration(rgb_image(4, 3), d).unwrap(), d);
    assert_window(
        &StillImageLayer::with_duration(RawPixels::gray8(2, 2, vec![0; 4]), d).unwrap(),
        d,
    );
    assert_window(
        &StillImageLayer::with_duration(RawPixels::rgba8(1, 1, vec![1, 2, 3, 4]), d).unwrap(),
        d,
    );

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn path_source_decodes_lazily_and_once() {
    let tmp = temp_dir("still_lazy");
    std::fs::create_dir_all(&tmp).unwrap();
    let png = tmp.join("img.png");
    write_png(&png, rgb_image(4, 3));

    let mut layer = StillImageLayer::new(&png).unwrap();
    assert!(!layer.is_decoded());

    let first = layer.evaluate(0.0).unwrap().unwrap();
    assert!(layer.is_decoded());
    assert_eq!(first.shape(), [3, 4, 4]);
    assert_eq!(first.pixel(2, 1), Some([20, 10, 128, 255]));

    // The cache survives the file going away.
    std::fs::remove_dir_all(&tmp).ok();
    let again = layer.evaluate(123.0).unwrap().unwrap();
    assert!(first.ptr_eq(&again));
}

#[test]
fn size_forces_decode() {
    let tmp = temp_dir("still_size");
    std::fs::create_dir_all(&tmp).unwrap();
    let png = tmp.join("img.png");
    write_png(&png, rgb_image(7, 5));

    let mut layer = StillImageLayer::new(&png).unwrap();
    assert_eq!(layer.size().unwrap(), PixelSize::new(7, 5));
    assert!(layer.is_decoded());

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn image_object_keeps_its_dimensions() {
    let mut layer = StillImageLayer::new(rgb_image(9, 4)).unwrap();
    assert!(layer.is_decoded());
    assert_eq!(layer.size().unwrap(), PixelSize::new(9, 4));
    assert_eq!(<(u32, u32)>::from(layer.size().unwrap()), (9, 4));
}

#[test]
fn grayscale_array_becomes_opaque_rgba() {
    let g: Vec<u8> = (0..6).map(|v| v * 40).collect();
    let mut layer = StillImageLayer::new(RawPixels::gray8(3, 2, g.clone())).unwrap();
    let buf = layer.evaluate(0.0).unwrap().unwrap();
    assert_eq!(buf.shape(), [2, 3, 4]);
    for (i, px) in buf.as_raw().chunks_exact(4).enumerate() {
        assert_eq!(&px[..3], &[g[i], g[i], g[i]]);
        assert_eq!(px[3], 255);
    }
}

#[test]
fn oversized_array_shape_fails_at_construction() {
    let raw = RawPixels {
        shape: vec![usize::MAX, 3],
        samples: RawSamples::U8(vec![0; 3]),
    };
    assert!(matches!(
        StillImageLayer::new(raw),
        Err(LayerError::InvalidShape(_))
    ));
}

#[test]
fn file_removed_before_first_use_surfaces_on_evaluate() {
    let tmp = temp_dir("still_removed");
    std::fs::create_dir_all(&tmp).unwrap();
    let png = tmp.join("img.png");
    write_png(&png, rgb_image(2, 2));

    let mut layer = StillImageLayer::new(&png).unwrap();
    std::fs::remove_dir_all(&tmp).ok();

    assert!(matches!(
        layer.evaluate(0.0),
        Err(LayerError::AssetNotFound(_))
    ));
    assert!(!layer.is_decoded());
}

#[test]
fn corrupt_file_is_a_decode_time_error() {
    let tmp = temp_dir("still_corrupt");
    std::fs::create_dir_all(&tmp).unwrap();
    let png = tmp.join("img.png");
    std::fs::write(&png, b"definitely not a png").unwrap();

    let mut layer = StillImageLayer::new(&png).unwrap();
    assert!(layer.evaluate(0.0).is_err());

    std::fs::remove_dir_all(&tmp).ok();
}
