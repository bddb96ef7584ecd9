use super::*;

#[test]
fn gpu_preferred_until_disabled() {
    let cfg = RenderConfig::new(RenderMethod::Gpu);
    assert_eq!(cfg.method_to_use(), RenderMethod::Gpu);
    assert_eq!(
        cfg.candidates().as_slice(),
        &[RenderMethod::Gpu, RenderMethod::Raster]
    );

    cfg.disable(RenderMethod::Gpu);
    assert!(cfg.is_disabled(RenderMethod::Gpu));
    assert_eq!(cfg.method_to_use(), RenderMethod::Raster);
    assert_eq!(cfg.candidates().as_slice(), &[RenderMethod::Raster]);
}

#[test]
fn raster_cannot_be_disabled() {
    let cfg = RenderConfig::new(RenderMethod::Raster);
    cfg.disable(RenderMethod::Raster);
    assert!(!cfg.is_disabled(RenderMethod::Raster));
    assert_eq!(cfg.method_to_use(), RenderMethod::Raster);
}

#[test]
fn lookup_parses_method_and_disable_flag() {
    let cfg = RenderConfig::from_lookup(|k| match k {
        "RASTERBRIDGE_RENDER_METHOD" => Some("Raster".to_string()),
        _ => None,
    });
    assert_eq!(cfg.method_to_use(), RenderMethod::Raster);

    let cfg = RenderConfig::from_lookup(|k| match k {
        "RASTERBRIDGE_DISABLE_GPU" => Some("1".to_string()),
        _ => None,
    });
    assert!(cfg.is_disabled(RenderMethod::Gpu));

    let cfg = RenderConfig::from_lookup(|_| Some("nonsense".to_string()));
    assert_eq!(cfg.method_to_use(), RenderMethod::Gpu);
}

#[test]
fn json_config_round_trip_and_rejects_unknown_fields() {
    let cfg = RenderConfig::from_json(r#"{"render_method":"raster"}"#).unwrap();
    assert_eq!(cfg.method_to_use(), RenderMethod::Raster);

    let cfg = RenderConfig::from_json(r#"{"disable_gpu":true}"#).unwrap();
    assert!(cfg.is_disabled(RenderMethod::Gpu));

    let err = RenderConfig::from_json(r#"{"bogus":1}"#).unwrap_err();
    assert!(err.to_string().contains("config error:"));
}

#[test]
fn graphics_opts_defaults() {
    let opts = GraphicsOpts::default();
    assert!(opts.antialias);
    assert!(!opts.avoid_resize_recreation);
    assert_eq!(opts.flush_pixel_threshold, 10 * 1024 * 1024);

    let parsed: GraphicsOpts = serde_json::from_str(r#"{"antialias":false}"#).unwrap();
    assert!(!parsed.antialias);
    assert_eq!(parsed.flush_pixel_threshold, 10 * 1024 * 1024);
}
